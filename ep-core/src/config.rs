//! Configuration resolution
//!
//! A fingerprint is constructed from one of several input shapes: nothing, a
//! bare hasher, a typed [`Options`] value, or an untyped JSON value (options
//! file, CLI input). [`resolve`] turns any of them into a fully-defaulted
//! [`Configuration`] exactly once; nothing past this module ever sees the
//! original shape.
//!
//! Resolution never fails. Input that does not match an accepted shape is
//! treated as "no options".

use std::fmt;

use serde_json::Value;
use tracing::{debug, warn};

use crate::hasher::{BuiltinHasher, Hasher, SharedHasher};

// ============================================================================
// Toggles
// ============================================================================

/// Opt-in switches that select optional signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Canvas,
    Webgl,
    IeActivex,
    ScreenResolution,
    /// Report the resolution independently of device rotation
    ScreenOrientation,
}

impl Toggle {
    pub const ALL: [Toggle; 5] = [
        Toggle::Canvas,
        Toggle::Webgl,
        Toggle::IeActivex,
        Toggle::ScreenResolution,
        Toggle::ScreenOrientation,
    ];

    /// Option field name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Webgl => "webgl",
            Self::IeActivex => "ie_activex",
            Self::ScreenResolution => "screen_resolution",
            Self::ScreenOrientation => "screen_orientation",
        }
    }
}

/// Resolved state of every toggle; all default to off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalToggles {
    pub canvas: bool,
    pub webgl: bool,
    pub ie_activex: bool,
    pub screen_resolution: bool,
    pub screen_orientation: bool,
}

impl SignalToggles {
    pub fn is_enabled(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Canvas => self.canvas,
            Toggle::Webgl => self.webgl,
            Toggle::IeActivex => self.ie_activex,
            Toggle::ScreenResolution => self.screen_resolution,
            Toggle::ScreenOrientation => self.screen_orientation,
        }
    }

    pub fn set(&mut self, toggle: Toggle, enabled: bool) {
        match toggle {
            Toggle::Canvas => self.canvas = enabled,
            Toggle::Webgl => self.webgl = enabled,
            Toggle::IeActivex => self.ie_activex = enabled,
            Toggle::ScreenResolution => self.screen_resolution = enabled,
            Toggle::ScreenOrientation => self.screen_orientation = enabled,
        }
    }
}

// ============================================================================
// Input Shapes
// ============================================================================

/// Typed construction options; unset fields take their defaults
#[derive(Clone, Default)]
pub struct Options {
    /// Custom hasher; the built-in SHA-256 when `None`
    pub hasher: Option<SharedHasher>,
    pub canvas: bool,
    pub webgl: bool,
    pub ie_activex: bool,
    pub screen_resolution: bool,
    pub screen_orientation: bool,
    /// Return the per-signal breakdown next to the hash
    pub breakdown: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hasher(mut self, hasher: impl Hasher + 'static) -> Self {
        self.hasher = Some(std::sync::Arc::new(hasher));
        self
    }

    pub fn with_toggle(mut self, toggle: Toggle, enabled: bool) -> Self {
        let mut toggles = self.toggles();
        toggles.set(toggle, enabled);
        self.canvas = toggles.canvas;
        self.webgl = toggles.webgl;
        self.ie_activex = toggles.ie_activex;
        self.screen_resolution = toggles.screen_resolution;
        self.screen_orientation = toggles.screen_orientation;
        self
    }

    pub fn with_breakdown(mut self, breakdown: bool) -> Self {
        self.breakdown = breakdown;
        self
    }

    fn toggles(&self) -> SignalToggles {
        SignalToggles {
            canvas: self.canvas,
            webgl: self.webgl,
            ie_activex: self.ie_activex,
            screen_resolution: self.screen_resolution,
            screen_orientation: self.screen_orientation,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("hasher", &self.hasher.as_ref().map(|h| h.name().to_string()))
            .field("toggles", &self.toggles())
            .field("breakdown", &self.breakdown)
            .finish()
    }
}

/// Everything a fingerprint can be constructed from
#[derive(Default)]
pub enum FingerprintInput {
    /// No arguments: all defaults
    #[default]
    Default,
    /// A bare hasher, equivalent to `{ hasher }`
    Hasher(SharedHasher),
    Options(Options),
    /// Untyped options, see [`resolve_value`]
    Untyped(Value),
}

impl FingerprintInput {
    /// Wrap any hasher, including plain closures
    pub fn hasher(hasher: impl Hasher + 'static) -> Self {
        Self::Hasher(std::sync::Arc::new(hasher))
    }
}

impl From<()> for FingerprintInput {
    fn from(_: ()) -> Self {
        Self::Default
    }
}

impl From<Options> for FingerprintInput {
    fn from(options: Options) -> Self {
        Self::Options(options)
    }
}

impl From<SharedHasher> for FingerprintInput {
    fn from(hasher: SharedHasher) -> Self {
        Self::Hasher(hasher)
    }
}

impl From<BuiltinHasher> for FingerprintInput {
    fn from(hasher: BuiltinHasher) -> Self {
        Self::Hasher(hasher.shared())
    }
}

impl From<Value> for FingerprintInput {
    fn from(value: Value) -> Self {
        Self::Untyped(value)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Canonical configuration; immutable once resolved
#[derive(Clone)]
pub struct Configuration {
    hasher: SharedHasher,
    toggles: SignalToggles,
    breakdown: bool,
}

impl Configuration {
    pub fn hasher(&self) -> &dyn Hasher {
        self.hasher.as_ref()
    }

    pub fn toggles(&self) -> &SignalToggles {
        &self.toggles
    }

    pub fn is_enabled(&self, toggle: Toggle) -> bool {
        self.toggles.is_enabled(toggle)
    }

    pub fn breakdown(&self) -> bool {
        self.breakdown
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            hasher: BuiltinHasher::default().shared(),
            toggles: SignalToggles::default(),
            breakdown: false,
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("hasher", &self.hasher.name())
            .field("toggles", &self.toggles)
            .field("breakdown", &self.breakdown)
            .finish()
    }
}

/// Resolve any accepted input shape into a configuration
pub fn resolve(input: impl Into<FingerprintInput>) -> Configuration {
    let config = match input.into() {
        FingerprintInput::Default => Configuration::default(),
        FingerprintInput::Hasher(hasher) => Configuration {
            hasher,
            ..Configuration::default()
        },
        FingerprintInput::Options(options) => {
            let toggles = options.toggles();
            Configuration {
                hasher: options
                    .hasher
                    .unwrap_or_else(|| BuiltinHasher::default().shared()),
                toggles,
                breakdown: options.breakdown,
            }
        }
        FingerprintInput::Untyped(value) => resolve_value(&value),
    };

    debug!(
        hasher = config.hasher.name(),
        breakdown = config.breakdown,
        toggles = ?config.toggles,
        "Resolved fingerprint configuration"
    );
    config
}

/// Resolve an untyped options value
///
/// - object: read field by field; toggles are coerced by truthiness, unknown
///   fields are ignored, `hasher` may name a built-in hasher
/// - string: the name of a built-in hasher
/// - anything else: defaults
pub fn resolve_value(value: &Value) -> Configuration {
    match value {
        Value::Object(fields) => {
            let mut config = Configuration::default();

            for toggle in Toggle::ALL {
                if let Some(v) = fields.get(toggle.as_str()) {
                    config.toggles.set(toggle, is_truthy(v));
                }
            }
            if let Some(v) = fields.get("breakdown") {
                config.breakdown = is_truthy(v);
            }
            if let Some(hasher) = fields.get("hasher").and_then(builtin_hasher) {
                config.hasher = hasher.shared();
            }

            config
        }
        Value::String(_) => match builtin_hasher(value) {
            Some(hasher) => Configuration {
                hasher: hasher.shared(),
                ..Configuration::default()
            },
            None => Configuration::default(),
        },
        Value::Null => Configuration::default(),
        other => {
            warn!(kind = value_kind(other), "Ignoring options of unsupported shape");
            Configuration::default()
        }
    }
}

fn builtin_hasher(value: &Value) -> Option<BuiltinHasher> {
    let name = value.as_str()?;
    match name.parse::<BuiltinHasher>() {
        Ok(hasher) => Some(hasher),
        Err(e) => {
            warn!(error = %e, "Falling back to default hasher");
            None
        }
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0`, `NaN` and `""` are false
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
