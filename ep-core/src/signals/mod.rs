//! Signal descriptors and samples
//!
//! Every signal is a row of [`SIGNALS`]: the names it produces, the gate that
//! decides whether it runs, and the probe that samples it. The engine walks the
//! table in order, so the row order is part of the public contract: it fixes
//! the shape of the combination string and therefore every identifier.
//! Adding a signal means adding a row.

mod canvas;
mod probes;
mod webgl;

pub use canvas::canvas_data_url;
pub use webgl::{webgl_fingerprint, WebGlFingerprint};

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, trace};

use crate::config::{SignalToggles, Toggle};
use crate::constants::combination::{NOT_SUPPORTED, SEPARATOR};
use crate::env::{Capability, Environment};

/// Signal names as they appear in the breakdown
pub mod names {
    pub const USER_AGENT: &str = "user_agent";
    pub const LANGUAGE: &str = "language";
    pub const COLOR_DEPTH: &str = "color_depth";
    pub const COOKIE_ENABLED: &str = "cookie_enabled";
    pub const SCREEN_RESOLUTION: &str = "screen_resolution";
    pub const TIMEZONE_OFFSET: &str = "timezone_offset";
    pub const SESSION_STORAGE: &str = "session_storage";
    pub const LOCAL_STORAGE: &str = "local_storage";
    pub const INDEXED_DB: &str = "indexed_db";
    pub const ADD_BEHAVIOR: &str = "add_behavior";
    pub const OPEN_DATABASE: &str = "open_database";
    pub const CPU_CLASS: &str = "cpu_class";
    pub const PLATFORM: &str = "platform";
    pub const DO_NOT_TRACK: &str = "do_not_track";
    pub const PLUGINS: &str = "plugins";
    pub const IE_PLUGINS: &str = "ie_plugins";
    pub const CANVAS: &str = "canvas";
    pub const GL_VENDOR: &str = "gl_vendor";
    pub const GL_RENDERER: &str = "gl_renderer";
    pub const GL_FINGERPRINT: &str = "gl_fingerprint";
}

// ============================================================================
// Samples
// ============================================================================

/// Raw value of one sampled signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalValue {
    Text(String),
    Integer(i64),
    Flag(bool),
    /// The capability behind this signal was unavailable
    NotSupported,
}

impl SignalValue {
    /// Convert a capability answer, substituting the sentinel when it is missing
    pub fn from_capability<T: Into<SignalValue>>(signal: &str, capability: Capability<T>) -> Self {
        match capability {
            Capability::Supported(v) => v.into(),
            Capability::Unsupported => {
                trace!(signal, "Capability unsupported, recording sentinel");
                Self::NotSupported
            }
            Capability::Failed(reason) => {
                debug!(signal, %reason, "Capability query failed, recording sentinel");
                Self::NotSupported
            }
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::NotSupported)
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Flag(b) => write!(f, "{}", b),
            Self::NotSupported => f.write_str(NOT_SUPPORTED),
        }
    }
}

impl Serialize for SignalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Flag(b) => serializer.serialize_bool(*b),
            Self::NotSupported => serializer.serialize_str(NOT_SUPPORTED),
        }
    }
}

impl From<String> for SignalValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for SignalValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for SignalValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<i32> for SignalValue {
    fn from(n: i32) -> Self {
        Self::Integer(n as i64)
    }
}

impl From<u32> for SignalValue {
    fn from(n: u32) -> Self {
        Self::Integer(n as i64)
    }
}

/// One named signal value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub value: SignalValue,
}

impl Sample {
    pub fn new(name: &'static str, value: impl Into<SignalValue>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Sample a capability, recording the sentinel when it is unavailable
    pub fn probe<T: Into<SignalValue>>(name: &'static str, capability: Capability<T>) -> Self {
        Self {
            name,
            value: SignalValue::from_capability(name, capability),
        }
    }
}

/// Ordered per-signal values collected by one `get()` call
///
/// Serializes as a JSON object whose keys keep collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breakdown {
    samples: Vec<Sample>,
}

impl Breakdown {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn get(&self, name: &str) -> Option<&SignalValue> {
        self.samples.iter().find(|s| s.name == name).map(|s| &s.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.samples.iter().map(|s| s.name).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Join every value, in collection order, into the string that gets hashed
    pub fn combination(&self) -> String {
        self.samples
            .iter()
            .map(|s| s.value.to_string())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.samples.len()))?;
        for sample in &self.samples {
            map.serialize_entry(sample.name, &sample.value)?;
        }
        map.end()
    }
}

// ============================================================================
// Descriptor Table
// ============================================================================

/// Samples one signal (or a group sharing one capability) from the environment
pub type ProbeFn = fn(&dyn Environment, &SignalToggles) -> Vec<Sample>;

/// When a descriptor runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Baseline signal, sampled regardless of configuration
    Always,
    /// Sampled only when the toggle is on
    When(Toggle),
}

impl Gate {
    pub fn is_open(&self, toggles: &SignalToggles) -> bool {
        match self {
            Self::Always => true,
            Self::When(toggle) => toggles.is_enabled(*toggle),
        }
    }
}

pub struct SignalDescriptor {
    /// Names of the samples this probe produces, in output order
    pub names: &'static [&'static str],
    pub gate: Gate,
    pub probe: ProbeFn,
}

impl fmt::Debug for SignalDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalDescriptor")
            .field("names", &self.names)
            .field("gate", &self.gate)
            .finish()
    }
}

/// Canonical signal order
pub static SIGNALS: &[SignalDescriptor] = &[
    SignalDescriptor {
        names: &[names::USER_AGENT],
        gate: Gate::Always,
        probe: probes::user_agent,
    },
    SignalDescriptor {
        names: &[names::LANGUAGE],
        gate: Gate::Always,
        probe: probes::language,
    },
    SignalDescriptor {
        names: &[names::COLOR_DEPTH],
        gate: Gate::Always,
        probe: probes::color_depth,
    },
    SignalDescriptor {
        names: &[names::COOKIE_ENABLED],
        gate: Gate::Always,
        probe: probes::cookie_enabled,
    },
    SignalDescriptor {
        names: &[names::SCREEN_RESOLUTION],
        gate: Gate::When(Toggle::ScreenResolution),
        probe: probes::screen_resolution,
    },
    SignalDescriptor {
        names: &[names::TIMEZONE_OFFSET],
        gate: Gate::Always,
        probe: probes::timezone_offset,
    },
    SignalDescriptor {
        names: &[names::SESSION_STORAGE],
        gate: Gate::Always,
        probe: probes::session_storage,
    },
    SignalDescriptor {
        names: &[names::LOCAL_STORAGE],
        gate: Gate::Always,
        probe: probes::local_storage,
    },
    SignalDescriptor {
        names: &[names::INDEXED_DB],
        gate: Gate::Always,
        probe: probes::indexed_db,
    },
    SignalDescriptor {
        names: &[names::ADD_BEHAVIOR],
        gate: Gate::Always,
        probe: probes::add_behavior,
    },
    SignalDescriptor {
        names: &[names::OPEN_DATABASE],
        gate: Gate::Always,
        probe: probes::open_database,
    },
    SignalDescriptor {
        names: &[names::CPU_CLASS],
        gate: Gate::Always,
        probe: probes::cpu_class,
    },
    SignalDescriptor {
        names: &[names::PLATFORM],
        gate: Gate::Always,
        probe: probes::platform,
    },
    SignalDescriptor {
        names: &[names::DO_NOT_TRACK],
        gate: Gate::Always,
        probe: probes::do_not_track,
    },
    SignalDescriptor {
        names: &[names::PLUGINS],
        gate: Gate::Always,
        probe: probes::plugins,
    },
    SignalDescriptor {
        names: &[names::IE_PLUGINS],
        gate: Gate::When(Toggle::IeActivex),
        probe: probes::ie_plugins,
    },
    SignalDescriptor {
        names: &[names::CANVAS],
        gate: Gate::When(Toggle::Canvas),
        probe: canvas::probe,
    },
    SignalDescriptor {
        names: &[names::GL_VENDOR, names::GL_RENDERER, names::GL_FINGERPRINT],
        gate: Gate::When(Toggle::Webgl),
        probe: webgl::probe,
    },
];

/// Run every descriptor whose gate is open, in table order
pub fn collect(env: &dyn Environment, toggles: &SignalToggles) -> Breakdown {
    let mut samples = Vec::with_capacity(SIGNALS.len() + 2);

    for descriptor in SIGNALS {
        if !descriptor.gate.is_open(toggles) {
            trace!(signals = ?descriptor.names, "Signal disabled, not probing");
            continue;
        }
        samples.extend((descriptor.probe)(env, toggles));
    }

    Breakdown::new(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_signal_names_unique() {
        let mut seen = HashSet::new();
        for descriptor in SIGNALS {
            for name in descriptor.names {
                assert!(seen.insert(*name), "duplicate signal name {}", name);
            }
        }
    }

    #[test]
    fn test_cookie_state_is_baseline() {
        let descriptor = SIGNALS
            .iter()
            .find(|d| d.names.contains(&names::COOKIE_ENABLED))
            .unwrap();
        assert_eq!(descriptor.gate, Gate::Always);
    }

    #[test]
    fn test_every_signal_toggle_gates_a_descriptor() {
        for toggle in [
            Toggle::Canvas,
            Toggle::Webgl,
            Toggle::IeActivex,
            Toggle::ScreenResolution,
        ] {
            assert!(
                SIGNALS.iter().any(|d| d.gate == Gate::When(toggle)),
                "{:?} gates nothing",
                toggle
            );
        }
    }

    #[test]
    fn test_value_rendering() {
        assert_eq!(SignalValue::from("abc").to_string(), "abc");
        assert_eq!(SignalValue::from(-120).to_string(), "-120");
        assert_eq!(SignalValue::from(true).to_string(), "true");
        assert_eq!(SignalValue::NotSupported.to_string(), "Not supported");
    }

    #[test]
    fn test_value_serialization() {
        let json = serde_json::to_string(&vec![
            SignalValue::from("abc"),
            SignalValue::from(24u32),
            SignalValue::from(false),
            SignalValue::NotSupported,
        ])
        .unwrap();
        assert_eq!(json, r#"["abc",24,false,"Not supported"]"#);
    }

    #[test]
    fn test_from_capability() {
        assert_eq!(
            SignalValue::from_capability("x", Capability::Supported(8u32)),
            SignalValue::Integer(8)
        );
        assert_eq!(
            SignalValue::from_capability::<bool>("x", Capability::failed("denied")),
            SignalValue::NotSupported
        );
    }

    #[test]
    fn test_breakdown_combination_and_order() {
        let breakdown = Breakdown::new(vec![
            Sample::new(names::USER_AGENT, "UA"),
            Sample::new(names::COOKIE_ENABLED, true),
            Sample::probe::<String>(names::CANVAS, Capability::Unsupported),
        ]);
        assert_eq!(breakdown.combination(), "UA###true###Not supported");
        assert_eq!(
            serde_json::to_string(&breakdown).unwrap(),
            r#"{"user_agent":"UA","cookie_enabled":true,"canvas":"Not supported"}"#
        );
        assert_eq!(breakdown.get(names::CANVAS), Some(&SignalValue::NotSupported));
        assert!(!breakdown.contains(names::GL_VENDOR));
    }

    #[test]
    fn test_gate() {
        let toggles = SignalToggles {
            canvas: true,
            ..Default::default()
        };
        assert!(Gate::Always.is_open(&toggles));
        assert!(Gate::When(Toggle::Canvas).is_open(&toggles));
        assert!(!Gate::When(Toggle::Webgl).is_open(&toggles));
    }
}
