//! Envprint Core Library
//!
//! Derives a stable identifier for a runtime environment from the signals it
//! exposes, without storing anything on the client.
//!
//! # Features
//!
//! - **Configurable signals**: baseline signals are always sampled; canvas,
//!   WebGL, ActiveX and screen signals are opt-in
//! - **Best effort**: an unavailable capability becomes the `Not supported`
//!   sentinel instead of an error
//! - **Pluggable hashing**: SHA-256 by default, MurmurHash3 or any closure
//! - **Breakdown**: optionally returns every sampled value next to the hash
//!
//! # Module Structure
//!
//! - `config` - Resolution of constructor input into a `Configuration`
//! - `engine` - The `Fingerprint` generator
//! - `env/` - Capability trait and the host/snapshot environments
//! - `signals/` - Ordered signal table and probes
//! - `hasher` - Hasher contract and built-ins
//!
//! # Example
//!
//! ```no_run
//! use ep_core::{Fingerprint, Options, SnapshotEnvironment};
//!
//! let env = SnapshotEnvironment::from_json(r#"{"user_agent": "Mozilla/5.0"}"#).unwrap();
//! let fp = Fingerprint::with_environment(env, Options { canvas: true, ..Default::default() });
//! println!("{}", fp.get());
//! ```

pub mod config;
pub mod constants;
pub mod engine;
pub mod env;
pub mod hasher;
pub mod signals;

pub use config::{resolve, resolve_value, Configuration, FingerprintInput, Options, SignalToggles, Toggle};
pub use engine::{DetailedFingerprint, Fingerprint, FingerprintOutput};
pub use env::{
    Canvas2d, CanvasProfile, Capability, Environment, GlParameter, HostEnvironment, MimeType,
    Plugin, ScreenSize, SnapshotEnvironment, TextBaseline, WebGlContext, WebGlProfile,
};
pub use hasher::{murmur3_32, BuiltinHasher, Hasher, SharedHasher};
pub use signals::{Breakdown, Gate, Sample, SignalDescriptor, SignalValue, WebGlFingerprint, SIGNALS};

// Re-export error types
pub use ep_error::{EnvprintError, Result};
