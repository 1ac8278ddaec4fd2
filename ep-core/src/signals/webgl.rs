//! WebGL probe
//!
//! Produces three values from one context: vendor, renderer, and a derived
//! fingerprint listing the context's capability parameters and extensions.
//! Each value degrades to the sentinel on its own; only a missing context
//! turns all three into the sentinel.

use tracing::debug;

use super::{names, Sample, SignalValue};
use crate::config::SignalToggles;
use crate::constants::combination::NOT_SUPPORTED;
use crate::constants::webgl::{EXTENSION_SEPARATOR, FIELD_SEPARATOR};
use crate::env::{Capability, Environment, GlParameter, WebGlContext};

/// Vendor, renderer and derived fingerprint of a WebGL context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebGlFingerprint {
    pub vendor: String,
    pub renderer: String,
    pub fingerprint: String,
}

pub(super) fn probe(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    let [vendor, renderer, fingerprint] = sample_webgl(env);
    vec![
        Sample::new(names::GL_VENDOR, vendor),
        Sample::new(names::GL_RENDERER, renderer),
        Sample::new(names::GL_FINGERPRINT, fingerprint),
    ]
}

/// Query a fresh WebGL context; never fails
pub fn webgl_fingerprint(env: &dyn Environment) -> WebGlFingerprint {
    let [vendor, renderer, fingerprint] = sample_webgl(env);
    WebGlFingerprint {
        vendor: vendor.to_string(),
        renderer: renderer.to_string(),
        fingerprint: fingerprint.to_string(),
    }
}

fn sample_webgl(env: &dyn Environment) -> [SignalValue; 3] {
    match env.create_webgl() {
        Capability::Supported(ctx) => sample_context(ctx.as_ref()),
        Capability::Unsupported => {
            debug!("WebGL unsupported, recording sentinels");
            [SignalValue::NotSupported, SignalValue::NotSupported, SignalValue::NotSupported]
        }
        Capability::Failed(reason) => {
            debug!(%reason, "WebGL context creation failed, recording sentinels");
            [SignalValue::NotSupported, SignalValue::NotSupported, SignalValue::NotSupported]
        }
    }
}

fn sample_context(ctx: &dyn WebGlContext) -> [SignalValue; 3] {
    let vendor = ctx
        .parameter(GlParameter::UnmaskedVendor)
        .or_else(|| ctx.parameter(GlParameter::Vendor));
    let renderer = ctx
        .parameter(GlParameter::UnmaskedRenderer)
        .or_else(|| ctx.parameter(GlParameter::Renderer));

    [
        SignalValue::from_capability(names::GL_VENDOR, vendor),
        SignalValue::from_capability(names::GL_RENDERER, renderer),
        SignalValue::from_capability(names::GL_FINGERPRINT, derived_fingerprint(ctx)),
    ]
}

/// `name:value` for every derived parameter plus the sorted extension list
fn derived_fingerprint(ctx: &dyn WebGlContext) -> Capability<String> {
    let mut answered = 0usize;
    let mut fields = Vec::with_capacity(GlParameter::DERIVED.len() + 1);

    for parameter in GlParameter::DERIVED {
        let value = match ctx.parameter(*parameter) {
            Capability::Supported(v) => {
                answered += 1;
                v
            }
            Capability::Unsupported | Capability::Failed(_) => NOT_SUPPORTED.to_string(),
        };
        fields.push(format!("{}:{}", parameter.as_str(), value));
    }

    let extensions = match ctx.extensions() {
        Capability::Supported(mut list) => {
            answered += 1;
            list.sort();
            list.join(EXTENSION_SEPARATOR)
        }
        Capability::Unsupported | Capability::Failed(_) => NOT_SUPPORTED.to_string(),
    };
    fields.push(format!("extensions:{}", extensions));

    if answered == 0 {
        return Capability::failed("context answered no capability queries");
    }
    Capability::Supported(fields.join(FIELD_SEPARATOR))
}
