//! Fingerprint engine
//!
//! Ties a resolved [`Configuration`] to an [`Environment`]. Each
//! [`Fingerprint::get`] call is a self-contained pass: walk the signal table,
//! join the samples into the combination string, hash it once.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::config::{resolve, Configuration, FingerprintInput};
use crate::env::{Environment, HostEnvironment};
use crate::signals::{self, Breakdown, WebGlFingerprint};

/// Hash plus the per-signal values it was computed from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailedFingerprint {
    pub value: String,
    pub breakdown: Breakdown,
}

/// Result of [`Fingerprint::get`]
///
/// Serializes as a bare JSON string or as `{ "value": ..., "breakdown": {...} }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FingerprintOutput {
    Value(String),
    Detailed(DetailedFingerprint),
}

impl FingerprintOutput {
    /// The identifier, whichever shape was requested
    pub fn value(&self) -> &str {
        match self {
            Self::Value(v) => v,
            Self::Detailed(d) => &d.value,
        }
    }

    pub fn breakdown(&self) -> Option<&Breakdown> {
        match self {
            Self::Value(_) => None,
            Self::Detailed(d) => Some(&d.breakdown),
        }
    }

    pub fn is_detailed(&self) -> bool {
        matches!(self, Self::Detailed(_))
    }

    pub fn into_value(self) -> String {
        match self {
            Self::Value(v) => v,
            Self::Detailed(d) => d.value,
        }
    }
}

impl fmt::Display for FingerprintOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Environment fingerprint generator
pub struct Fingerprint<E = HostEnvironment> {
    config: Configuration,
    env: E,
}

impl Fingerprint<HostEnvironment> {
    /// Fingerprint the running process
    pub fn new(input: impl Into<FingerprintInput>) -> Self {
        Self::with_environment(HostEnvironment::new(), input)
    }
}

impl Default for Fingerprint<HostEnvironment> {
    fn default() -> Self {
        Self::new(FingerprintInput::Default)
    }
}

impl<E: Environment> Fingerprint<E> {
    pub fn with_environment(env: E, input: impl Into<FingerprintInput>) -> Self {
        Self {
            config: resolve(input),
            env,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    /// Sample every enabled signal without hashing
    pub fn collect(&self) -> Breakdown {
        signals::collect(&self.env, self.config.toggles())
    }

    /// Compute the fingerprint
    pub fn get(&self) -> FingerprintOutput {
        let breakdown = self.collect();
        let combination = breakdown.combination();
        let value = self.config.hasher().hash(&combination);

        debug!(
            hasher = self.config.hasher().name(),
            signals = breakdown.len(),
            combination_len = combination.len(),
            "Computed fingerprint"
        );

        if self.config.breakdown() {
            FingerprintOutput::Detailed(DetailedFingerprint { value, breakdown })
        } else {
            FingerprintOutput::Value(value)
        }
    }

    /// Run the canvas probe on its own
    pub fn canvas_fingerprint(&self) -> String {
        signals::SignalValue::from_capability(
            signals::names::CANVAS,
            signals::canvas_data_url(&self.env),
        )
        .to_string()
    }

    /// Run the WebGL probe on its own
    pub fn webgl_fingerprint(&self) -> WebGlFingerprint {
        signals::webgl_fingerprint(&self.env)
    }
}

impl<E: fmt::Debug> fmt::Debug for Fingerprint<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fingerprint")
            .field("config", &self.config)
            .field("env", &self.env)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::config::Options;
    use crate::env::{
        Canvas2d, CanvasProfile, Capability, GlParameter, MockEnvironment, SnapshotEnvironment,
        TextBaseline, WebGlProfile,
    };
    use crate::hasher::{BuiltinHasher, Hasher};
    use crate::signals::names;

    /// Mock answering every baseline query, leaving optional probes unconfigured
    fn baseline_mock() -> MockEnvironment {
        let mut env = MockEnvironment::new();
        env.expect_user_agent()
            .returning(|| Capability::Supported("Mozilla/5.0 (Test)".to_string()));
        env.expect_language()
            .returning(|| Capability::Supported("en-US".to_string()));
        env.expect_color_depth().returning(|| Capability::Supported(24));
        env.expect_cookie_enabled().returning(|| Capability::Supported(true));
        env.expect_timezone_offset().returning(|| Capability::Supported(-60));
        env.expect_has_session_storage().returning(|| Capability::Supported(true));
        env.expect_has_local_storage().returning(|| Capability::Supported(true));
        env.expect_has_indexed_db().returning(|| Capability::Supported(true));
        env.expect_has_add_behavior().returning(|| Capability::Supported(false));
        env.expect_has_open_database().returning(|| Capability::Unsupported);
        env.expect_cpu_class().returning(|| Capability::Unsupported);
        env.expect_platform()
            .returning(|| Capability::Supported("Linux x86_64".to_string()));
        env.expect_do_not_track().returning(|| Capability::Unsupported);
        env.expect_plugins().returning(|| Capability::Supported(Vec::new()));
        env
    }

    fn forbid_optional_probes(env: &mut MockEnvironment) {
        env.expect_screen_size().times(0);
        env.expect_is_legacy_ie().times(0);
        env.expect_create_activex().times(0);
        env.expect_create_canvas().times(0);
        env.expect_create_webgl().times(0);
    }

    struct StubCanvas;

    impl Canvas2d for StubCanvas {
        fn set_font(&mut self, _font: &str) {}
        fn set_text_baseline(&mut self, _baseline: TextBaseline) {}
        fn set_fill_style(&mut self, _style: &str) {}
        fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) {}
        fn fill_text(&mut self, _text: &str, _x: f64, _y: f64) {}
        fn to_data_url(&self) -> Capability<String> {
            Capability::Supported("data:image/png;base64,AAAA".to_string())
        }
    }

    struct CountingHasher {
        calls: Arc<AtomicUsize>,
    }

    impl Hasher for CountingHasher {
        fn hash(&self, input: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            BuiltinHasher::Sha256.hash(input)
        }
    }

    fn full_snapshot() -> SnapshotEnvironment {
        let mut env = SnapshotEnvironment::default();
        env.user_agent = Some("Mozilla/5.0 (X11; Linux x86_64)".to_string());
        env.language = Some("en-GB".to_string());
        env.cookie_enabled = Some(true);
        env.canvas = Some(CanvasProfile {
            rasterizer: "skia/freetype".to_string(),
        });
        env.webgl = Some(WebGlProfile {
            parameters: [
                (GlParameter::Vendor, "WebKit".to_string()),
                (GlParameter::Renderer, "WebKit WebGL".to_string()),
                (GlParameter::MaxTextureSize, "16384".to_string()),
            ]
            .into_iter()
            .collect(),
            extensions: Some(vec!["OES_texture_float".to_string()]),
        });
        env
    }

    #[test]
    fn test_default_returns_scalar() {
        let mut env = baseline_mock();
        forbid_optional_probes(&mut env);

        let output = Fingerprint::with_environment(env, ()).get();
        assert!(!output.is_detailed());
        assert_eq!(output.value().len(), 64);
    }

    #[test]
    fn test_custom_hasher_output_is_returned_verbatim() {
        let env = baseline_mock();
        let fp = Fingerprint::with_environment(
            env,
            Options::new().with_hasher(|_: &str| "abcdef".to_string()),
        );
        assert_eq!(fp.get(), FingerprintOutput::Value("abcdef".to_string()));
    }

    #[test]
    fn test_bare_hasher_receives_combination() {
        let env = baseline_mock();
        let fp = Fingerprint::with_environment(env, FingerprintInput::hasher(|s: &str| s.to_string()));
        let expected = fp.collect().combination();
        assert_eq!(fp.get().value(), expected);
        assert!(expected.starts_with("Mozilla/5.0 (Test)###en-US###24###true###-60###"));
    }

    // `get` calls `Configuration::hasher()` exactly once. A default
    // configuration holds `BuiltinHasher::Sha256`, so this count applies to
    // the built-in as well (see `test_default_hasher_applied_once`).
    #[test]
    fn test_hasher_runs_once_per_get() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hasher = CountingHasher {
            calls: Arc::clone(&calls),
        };
        let fp = Fingerprint::with_environment(baseline_mock(), FingerprintInput::hasher(hasher));

        fp.get();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        fp.get();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_hasher_is_builtin_sha256() {
        let fp = Fingerprint::with_environment(baseline_mock(), ());
        assert_eq!(fp.config().hasher().name(), "sha256");
        let expected = BuiltinHasher::Sha256.hash(&fp.collect().combination());
        assert_eq!(fp.get().value(), expected);
    }

    #[test]
    fn test_default_hasher_applied_once() {
        let fp = Fingerprint::with_environment(baseline_mock(), ());
        assert_eq!(fp.config().hasher().name(), BuiltinHasher::Sha256.name());

        let combination = fp.collect().combination();
        let once = BuiltinHasher::Sha256.hash(&combination);
        let twice = BuiltinHasher::Sha256.hash(&once);
        let value = fp.get().into_value();
        assert_eq!(value, once);
        assert_ne!(value, twice);
    }

    #[test]
    fn test_canvas_probed_when_enabled() {
        let mut env = baseline_mock();
        env.expect_create_canvas()
            .times(1)
            .returning(|_, _| Capability::Supported(Box::new(StubCanvas) as Box<dyn Canvas2d>));

        let fp = Fingerprint::with_environment(
            env,
            Options {
                canvas: true,
                breakdown: true,
                ..Default::default()
            },
        );
        let output = fp.get();
        let breakdown = output.breakdown().unwrap();
        assert_eq!(
            breakdown.get(names::CANVAS).unwrap().to_string(),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_disabled_signals_never_probed() {
        let mut env = baseline_mock();
        forbid_optional_probes(&mut env);

        let fp = Fingerprint::with_environment(
            env,
            Options {
                canvas: false,
                webgl: false,
                ie_activex: false,
                screen_resolution: false,
                breakdown: true,
                ..Default::default()
            },
        );
        let output = fp.get();
        let breakdown = output.breakdown().unwrap();
        assert!(!breakdown.contains(names::CANVAS));
        assert!(!breakdown.contains(names::GL_VENDOR));
        assert!(!breakdown.contains(names::IE_PLUGINS));
        assert!(!breakdown.contains(names::SCREEN_RESOLUTION));
    }

    #[test]
    fn test_activex_enumerated_on_legacy_ie() {
        let mut env = baseline_mock();
        env.expect_is_legacy_ie()
            .times(1)
            .returning(|| Capability::Supported(true));
        env.expect_create_activex().returning(|prog_id| {
            if prog_id == "ShockwaveFlash.ShockwaveFlash" || prog_id == "AcroPDF.PDF" {
                Capability::Supported(())
            } else {
                Capability::failed("Automation server can't create object")
            }
        });

        let fp = Fingerprint::with_environment(
            env,
            Options {
                ie_activex: true,
                breakdown: true,
                ..Default::default()
            },
        );
        let output = fp.get();
        assert_eq!(
            output.breakdown().unwrap().get(names::IE_PLUGINS).unwrap().to_string(),
            "AcroPDF.PDF;ShockwaveFlash.ShockwaveFlash"
        );
    }

    #[test]
    fn test_activex_not_attempted_outside_ie() {
        let mut env = baseline_mock();
        env.expect_is_legacy_ie()
            .times(1)
            .returning(|| Capability::Supported(false));
        env.expect_create_activex().times(0);

        let fp = Fingerprint::with_environment(
            env,
            Options {
                ie_activex: true,
                breakdown: true,
                ..Default::default()
            },
        );
        let output = fp.get();
        assert_eq!(
            output.breakdown().unwrap().get(names::IE_PLUGINS),
            Some(&crate::signals::SignalValue::NotSupported)
        );
    }

    #[test]
    fn test_screen_resolution_probed_when_enabled() {
        let mut env = baseline_mock();
        env.expect_screen_size().times(1).returning(|| {
            Capability::Supported(crate::env::ScreenSize {
                width: 1920,
                height: 1080,
            })
        });

        let fp = Fingerprint::with_environment(
            env,
            Options {
                screen_resolution: true,
                breakdown: true,
                ..Default::default()
            },
        );
        let output = fp.get();
        assert_eq!(
            output.breakdown().unwrap().get(names::SCREEN_RESOLUTION).unwrap().to_string(),
            "1080x1920"
        );
    }

    #[test]
    fn test_unavailable_environment_still_fingerprints() {
        let mut env = MockEnvironment::new();
        env.expect_user_agent().returning(|| Capability::failed("navigator missing"));
        env.expect_language().returning(|| Capability::Unsupported);
        env.expect_color_depth().returning(|| Capability::Unsupported);
        env.expect_cookie_enabled().returning(|| Capability::failed("denied"));
        env.expect_screen_size().returning(|| Capability::Unsupported);
        env.expect_timezone_offset().returning(|| Capability::Unsupported);
        env.expect_has_session_storage().returning(|| Capability::failed("security error"));
        env.expect_has_local_storage().returning(|| Capability::failed("security error"));
        env.expect_has_indexed_db().returning(|| Capability::Unsupported);
        env.expect_has_add_behavior().returning(|| Capability::failed("document.body is null"));
        env.expect_has_open_database().returning(|| Capability::Unsupported);
        env.expect_cpu_class().returning(|| Capability::Unsupported);
        env.expect_platform().returning(|| Capability::Unsupported);
        env.expect_do_not_track().returning(|| Capability::Unsupported);
        env.expect_plugins().returning(|| Capability::Unsupported);
        env.expect_is_legacy_ie().returning(|| Capability::failed("no document"));
        env.expect_create_canvas().returning(|_, _| Capability::failed("no document body"));
        env.expect_create_webgl().returning(|| Capability::Unsupported);

        let fp = Fingerprint::with_environment(
            env,
            Options {
                canvas: true,
                webgl: true,
                ie_activex: true,
                screen_resolution: true,
                breakdown: true,
                ..Default::default()
            },
        );
        let output = fp.get();
        let breakdown = output.breakdown().unwrap();

        assert_eq!(output.value().len(), 64);
        assert_eq!(breakdown.len(), signals::SIGNALS.iter().map(|d| d.names.len()).sum::<usize>());
        assert!(breakdown.iter().all(|s| !s.value.is_supported()));
    }

    #[test]
    fn test_breakdown_with_canvas_and_webgl() {
        let fp = Fingerprint::with_environment(
            full_snapshot(),
            Options {
                breakdown: true,
                canvas: true,
                webgl: true,
                ..Default::default()
            },
        );
        let output = fp.get();
        let breakdown = output.breakdown().unwrap();

        assert!(!output.value().is_empty());
        assert_eq!(
            breakdown.get(names::COOKIE_ENABLED),
            Some(&crate::signals::SignalValue::Flag(true))
        );
        assert!(breakdown.get(names::CANVAS).unwrap().is_supported());
        assert_eq!(breakdown.get(names::GL_VENDOR).unwrap().to_string(), "WebKit");
        assert_eq!(breakdown.get(names::GL_RENDERER).unwrap().to_string(), "WebKit WebGL");
        assert!(breakdown.get(names::GL_FINGERPRINT).unwrap().is_supported());
        assert_eq!(fp.environment().live_surfaces(), 0);
    }

    #[test]
    fn test_breakdown_order_follows_signal_table() {
        let fp = Fingerprint::with_environment(
            full_snapshot(),
            Options {
                breakdown: true,
                canvas: true,
                webgl: true,
                screen_resolution: true,
                ..Default::default()
            },
        );
        let expected: Vec<&str> = signals::SIGNALS
            .iter()
            .filter(|d| !matches!(d.gate, signals::Gate::When(crate::config::Toggle::IeActivex)))
            .flat_map(|d| d.names.iter().copied())
            .collect();
        assert_eq!(fp.collect().names(), expected);
    }

    #[test]
    fn test_repeated_calls_are_stable() {
        let fp = Fingerprint::with_environment(
            full_snapshot(),
            Options {
                canvas: true,
                webgl: true,
                ..Default::default()
            },
        );
        assert_eq!(fp.get(), fp.get());
    }

    #[test]
    fn test_enabling_signal_changes_identifier() {
        let plain = Fingerprint::with_environment(full_snapshot(), ()).get();
        let with_canvas = Fingerprint::with_environment(
            full_snapshot(),
            Options {
                canvas: true,
                ..Default::default()
            },
        )
        .get();
        assert_ne!(plain, with_canvas);
    }

    #[test]
    fn test_direct_probe_accessors() {
        let fp = Fingerprint::with_environment(full_snapshot(), ());
        assert!(fp.canvas_fingerprint().starts_with("data:image/png"));

        let gl = fp.webgl_fingerprint();
        assert_eq!(gl.vendor, "WebKit");
        assert_eq!(gl.renderer, "WebKit WebGL");
        assert_ne!(gl.fingerprint, "Not supported");
    }

    #[test]
    fn test_output_serialization_shapes() {
        let scalar = FingerprintOutput::Value("abc".to_string());
        assert_eq!(serde_json::to_string(&scalar).unwrap(), "\"abc\"");

        let mut env = SnapshotEnvironment::default();
        env.cookie_enabled = Some(false);
        let detailed = Fingerprint::with_environment(
            env,
            Options {
                breakdown: true,
                hasher: Some(BuiltinHasher::Murmur3.shared()),
                ..Default::default()
            },
        )
        .get();
        let json: serde_json::Value = serde_json::to_value(&detailed).unwrap();
        assert!(json["value"].is_string());
        assert_eq!(json["breakdown"]["cookie_enabled"], serde_json::json!(false));
        assert_eq!(json["breakdown"]["user_agent"], serde_json::json!("Not supported"));
    }

    #[test]
    fn test_host_default_is_usable() {
        let output = Fingerprint::new(()).get();
        assert!(!output.value().is_empty());
        assert_eq!(output.to_string(), output.value());
    }
}
