//! 2D canvas probe
//!
//! Draws a fixed pattern on a surface the probe creates itself and reads the
//! pixels back. Font rendering, anti-aliasing and color handling differ
//! between environments, so the data URL carries entropy. The surface is a
//! detached box owned by this function: it is released when the closure
//! returns, whether reading it back succeeded or not.

use super::{names, Sample};
use crate::config::SignalToggles;
use crate::constants::canvas as pattern;
use crate::env::{Canvas2d, Capability, Environment, TextBaseline};

pub(super) fn probe(env: &dyn Environment, _: &SignalToggles) -> Vec<Sample> {
    vec![Sample::probe(names::CANVAS, canvas_data_url(env))]
}

/// Render the probe pattern and return the surface's data URL
pub fn canvas_data_url(env: &dyn Environment) -> Capability<String> {
    env.create_canvas(pattern::WIDTH, pattern::HEIGHT)
        .and_then(|mut surface| {
            draw_pattern(surface.as_mut());
            surface.to_data_url()
        })
}

fn draw_pattern(ctx: &mut dyn Canvas2d) {
    // Top, then alphabetic after the font change; both switches are part of the pattern
    ctx.set_text_baseline(TextBaseline::Top);
    ctx.set_font(pattern::FONT);
    ctx.set_text_baseline(TextBaseline::Alphabetic);

    let (x, y, w, h) = pattern::BLOCK_RECT;
    ctx.set_fill_style(pattern::BLOCK_FILL);
    ctx.fill_rect(x, y, w, h);

    let (x, y) = pattern::TEXT_POSITION;
    ctx.set_fill_style(pattern::TEXT_FILL);
    ctx.fill_text(pattern::TEXT, x, y);

    let (x, y) = pattern::SHADOW_POSITION;
    ctx.set_fill_style(pattern::SHADOW_FILL);
    ctx.fill_text(pattern::TEXT, x, y);
}
