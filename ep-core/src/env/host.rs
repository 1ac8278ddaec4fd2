//! Environment backed by the running process
//!
//! A native process has no browser surfaces, so most browser-only signals
//! answer `Unsupported`. What the process does know (locale, timezone,
//! platform) is reported so that a host fingerprint is still meaningful.

use chrono::Local;
use tracing::trace;

use super::{Canvas2d, Capability, Environment, Plugin, ScreenSize, WebGlContext};

/// Locale variables consulted in priority order
const LOCALE_VARS: &[&str] = &["LC_ALL", "LC_MESSAGES", "LANG"];

/// Set by users who opt out of tracking (consoledonottrack.com convention)
const DO_NOT_TRACK_VAR: &str = "DO_NOT_TRACK";

#[derive(Debug, Clone, Copy, Default)]
pub struct HostEnvironment;

impl HostEnvironment {
    pub fn new() -> Self {
        Self
    }
}

impl Environment for HostEnvironment {
    fn user_agent(&self) -> Capability<String> {
        Capability::Supported(format!(
            "Envprint/{} ({}; {})",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn language(&self) -> Capability<String> {
        LOCALE_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find_map(|raw| normalize_locale(&raw))
            .into()
    }

    fn color_depth(&self) -> Capability<u32> {
        Capability::Unsupported
    }

    fn cookie_enabled(&self) -> Capability<bool> {
        Capability::Unsupported
    }

    fn screen_size(&self) -> Capability<ScreenSize> {
        Capability::Unsupported
    }

    fn timezone_offset(&self) -> Capability<i32> {
        let east_seconds = Local::now().offset().local_minus_utc();
        Capability::Supported(-east_seconds / 60)
    }

    fn has_session_storage(&self) -> Capability<bool> {
        Capability::Supported(false)
    }

    fn has_local_storage(&self) -> Capability<bool> {
        Capability::Supported(false)
    }

    fn has_indexed_db(&self) -> Capability<bool> {
        Capability::Supported(false)
    }

    fn has_add_behavior(&self) -> Capability<bool> {
        Capability::Supported(false)
    }

    fn has_open_database(&self) -> Capability<bool> {
        Capability::Supported(false)
    }

    fn cpu_class(&self) -> Capability<String> {
        Capability::Unsupported
    }

    fn platform(&self) -> Capability<String> {
        Capability::Supported(format!(
            "{} {}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ))
    }

    fn do_not_track(&self) -> Capability<String> {
        match std::env::var(DO_NOT_TRACK_VAR) {
            Ok(v) if !v.trim().is_empty() => Capability::Supported(v.trim().to_string()),
            _ => Capability::Unsupported,
        }
    }

    fn plugins(&self) -> Capability<Vec<Plugin>> {
        Capability::Supported(Vec::new())
    }

    fn is_legacy_ie(&self) -> Capability<bool> {
        Capability::Supported(false)
    }

    fn create_activex(&self, prog_id: &str) -> Capability<()> {
        trace!(prog_id, "ActiveX requested on host environment");
        Capability::Unsupported
    }

    fn create_canvas(&self, _width: u32, _height: u32) -> Capability<Box<dyn Canvas2d>> {
        Capability::Unsupported
    }

    fn create_webgl(&self) -> Capability<Box<dyn WebGlContext>> {
        Capability::Unsupported
    }
}

/// Turn a POSIX locale such as `en_US.UTF-8@euro` into a language tag (`en-US`)
fn normalize_locale(raw: &str) -> Option<String> {
    let base = raw
        .split(|c| c == '.' || c == '@')
        .next()
        .unwrap_or("")
        .trim();

    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }

    Some(base.replace('_', "-"))
}
