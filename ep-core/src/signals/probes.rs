//! Baseline and lightweight optional probes

use tracing::{debug, trace};

use super::{names, Sample, SignalValue};
use crate::config::SignalToggles;
use crate::constants::combination::{LIST_SEPARATOR, MIME_SUFFIX_SEPARATOR, PLUGIN_FIELD_SEPARATOR};
use crate::constants::ACTIVEX_CONTROLS;
use crate::env::{Capability, Environment, Plugin, ScreenSize};

pub(super) fn user_agent(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::USER_AGENT, env.user_agent())]
}

pub(super) fn language(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::LANGUAGE, env.language())]
}

pub(super) fn color_depth(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::COLOR_DEPTH, env.color_depth())]
}

pub(super) fn cookie_enabled(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::COOKIE_ENABLED, env.cookie_enabled())]
}

pub(super) fn screen_resolution(env: &dyn Environment, toggles: &SignalToggles) -> Vec<Sample> {
    let resolution = env
        .screen_size()
        .map(|size| format_resolution(size, toggles.screen_orientation));
    vec![Sample::probe(names::SCREEN_RESOLUTION, resolution)]
}

pub(super) fn timezone_offset(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::TIMEZONE_OFFSET, env.timezone_offset())]
}

pub(super) fn session_storage(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::SESSION_STORAGE, env.has_session_storage())]
}

pub(super) fn local_storage(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::LOCAL_STORAGE, env.has_local_storage())]
}

pub(super) fn indexed_db(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::INDEXED_DB, env.has_indexed_db())]
}

pub(super) fn add_behavior(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::ADD_BEHAVIOR, env.has_add_behavior())]
}

pub(super) fn open_database(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::OPEN_DATABASE, env.has_open_database())]
}

pub(super) fn cpu_class(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::CPU_CLASS, env.cpu_class())]
}

pub(super) fn platform(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::PLATFORM, env.platform())]
}

pub(super) fn do_not_track(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::DO_NOT_TRACK, env.do_not_track())]
}

pub(super) fn plugins(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    let plugins = env.plugins().map(|list| plugins_string(&list));
    vec![Sample::probe(names::PLUGINS, plugins)]
}

/// ActiveX enumeration, only attempted on legacy IE-family environments
pub(super) fn ie_plugins(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    let value = match env.is_legacy_ie() {
        Capability::Supported(true) => activex_value(env),
        Capability::Supported(false) | Capability::Unsupported => {
            trace!("Not a legacy IE environment, skipping ActiveX enumeration");
            SignalValue::NotSupported
        }
        Capability::Failed(reason) => {
            debug!(%reason, "Legacy IE detection failed, skipping ActiveX enumeration");
            SignalValue::NotSupported
        }
    };
    vec![Sample::new(names::IE_PLUGINS, value)]
}

/// `height x width`, or `larger x smaller` when rotation should not matter
fn format_resolution(size: ScreenSize, orientation_independent: bool) -> String {
    let (first, second) = if orientation_independent {
        (size.width.max(size.height), size.width.min(size.height))
    } else {
        (size.height, size.width)
    };
    format!("{}x{}", first, second)
}

/// `name::description::type~suffixes,...` per plugin, sorted by name
fn plugins_string(plugins: &[Plugin]) -> String {
    let mut sorted: Vec<&Plugin> = plugins.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    sorted
        .iter()
        .map(|plugin| {
            let mime_types = plugin
                .mime_types
                .iter()
                .map(|m| format!("{}{}{}", m.mime_type, MIME_SUFFIX_SEPARATOR, m.suffixes))
                .collect::<Vec<_>>()
                .join(",");
            [plugin.name.as_str(), plugin.description.as_str(), mime_types.as_str()]
                .join(PLUGIN_FIELD_SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Installed controls joined by `;`
///
/// A control that fails to instantiate is simply not installed. When no
/// control answers at all, ActiveX itself is unavailable and the sentinel is
/// recorded instead of an empty list.
fn activex_value(env: &dyn Environment) -> SignalValue {
    let mut installed = Vec::new();
    let mut available = false;

    for prog_id in ACTIVEX_CONTROLS.iter().copied() {
        match env.create_activex(prog_id) {
            Capability::Supported(()) => {
                available = true;
                installed.push(prog_id);
            }
            Capability::Failed(reason) => {
                available = true;
                trace!(prog_id, %reason, "ActiveX control not available");
            }
            Capability::Unsupported => {}
        }
    }

    if !available {
        debug!("ActiveX cannot be instantiated, recording sentinel");
        return SignalValue::NotSupported;
    }
    SignalValue::Text(installed.join(LIST_SEPARATOR))
}
