//! Hashing strategies
//!
//! A hasher reduces the combination string to the final identifier. It must be
//! pure: the same input always yields the same output, with no I/O.
//!
//! Any `Fn(&str) -> String + Send + Sync` closure is a hasher. Two built-ins
//! are provided:
//!
//! - **sha256** (default): lowercase hex SHA-256, always 64 characters
//! - **murmur3**: 32-bit MurmurHash3 (seed 31) rendered as a decimal string

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ep_error::EnvprintError;
use sha2::{Digest, Sha256};

use crate::constants::hashing;

/// Reduces a combination string to an identifier
pub trait Hasher: Send + Sync {
    /// Hash the combination string
    fn hash(&self, input: &str) -> String;

    /// Short name used in logs and diagnostics
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Hasher for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn hash(&self, input: &str) -> String {
        self(input)
    }
}

/// Shared, immutable hasher handle held by a configuration
pub type SharedHasher = Arc<dyn Hasher>;

/// Hash functions shipped with Envprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinHasher {
    Sha256,
    Murmur3,
}

impl Default for BuiltinHasher {
    fn default() -> Self {
        Self::Sha256
    }
}

impl BuiltinHasher {
    pub const ALL: [BuiltinHasher; 2] = [BuiltinHasher::Sha256, BuiltinHasher::Murmur3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Murmur3 => "murmur3",
        }
    }

    /// Wrap the built-in in a shared handle
    pub fn shared(self) -> SharedHasher {
        Arc::new(self)
    }
}

impl Hasher for BuiltinHasher {
    fn hash(&self, input: &str) -> String {
        match self {
            Self::Sha256 => sha256_hex(input),
            Self::Murmur3 => murmur3_32(input.as_bytes(), hashing::MURMUR3_SEED).to_string(),
        }
    }

    fn name(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BuiltinHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuiltinHasher {
    type Err = EnvprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "murmur3" | "murmurhash3" => Ok(Self::Murmur3),
            other => Err(EnvprintError::UnknownHasher(other.to_string())),
        }
    }
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 32-bit MurmurHash3 (x86 variant) over raw bytes
pub fn murmur3_32(mut data: &[u8], seed: u32) -> u32 {
    // Reading from an in-memory slice cannot fail
    murmur3::murmur3_32(&mut data, seed).unwrap_or_default()
}
