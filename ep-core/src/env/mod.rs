//! Environment capability layer
//!
//! Probes never reach into ambient global state. Every question a probe asks
//! goes through the [`Environment`] trait, and every answer is a
//! [`Capability`]: the value, "this environment does not have it", or "asking
//! failed". Tests swap in fake environments; the CLI uses either the running
//! process ([`HostEnvironment`]) or a captured JSON document
//! ([`SnapshotEnvironment`]).
//!
//! Rendering surfaces handed out by `create_canvas` and `create_webgl` are
//! owned boxes. Dropping the box releases the surface, so a probe that bails
//! out early still cleans up.

mod host;
mod snapshot;

pub use host::HostEnvironment;
pub use snapshot::{CanvasProfile, SnapshotEnvironment, WebGlProfile};

use serde::{Deserialize, Serialize};

// ============================================================================
// Capability
// ============================================================================

/// Tri-state answer to a capability query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability<T> {
    /// The capability exists and produced a value
    Supported(T),
    /// The environment does not offer this capability
    Unsupported,
    /// The capability exists but querying it failed
    Failed(String),
}

impl<T> Capability<T> {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }

    /// Discard the failure detail
    pub fn supported(self) -> Option<T> {
        match self {
            Self::Supported(v) => Some(v),
            Self::Unsupported | Self::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Capability<U> {
        match self {
            Self::Supported(v) => Capability::Supported(f(v)),
            Self::Unsupported => Capability::Unsupported,
            Self::Failed(reason) => Capability::Failed(reason),
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> Capability<U>) -> Capability<U> {
        match self {
            Self::Supported(v) => f(v),
            Self::Unsupported => Capability::Unsupported,
            Self::Failed(reason) => Capability::Failed(reason),
        }
    }

    /// Try a fallback query when this one did not produce a value
    pub fn or_else(self, f: impl FnOnce() -> Capability<T>) -> Capability<T> {
        match self {
            Self::Supported(v) => Self::Supported(v),
            Self::Unsupported | Self::Failed(_) => f(),
        }
    }
}

impl<T> From<Option<T>> for Capability<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Supported(v),
            None => Self::Unsupported,
        }
    }
}

// ============================================================================
// Environment Data Types
// ============================================================================

/// Screen geometry in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

/// One entry of the browser plugin list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mime_types: Vec<MimeType>,
}

/// Mime type handled by a plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MimeType {
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Comma separated file suffixes, as the plugin reports them
    #[serde(default)]
    pub suffixes: String,
}

/// Text baseline used when drawing on a 2D canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Hanging,
    Middle,
    Alphabetic,
    Ideographic,
    Bottom,
}

impl TextBaseline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Hanging => "hanging",
            Self::Middle => "middle",
            Self::Alphabetic => "alphabetic",
            Self::Ideographic => "ideographic",
            Self::Bottom => "bottom",
        }
    }
}

/// Parameters a WebGL context can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlParameter {
    Vendor,
    Renderer,
    /// Vendor from the debug renderer info extension
    UnmaskedVendor,
    /// Renderer from the debug renderer info extension
    UnmaskedRenderer,
    Version,
    ShadingLanguageVersion,
    AliasedLineWidthRange,
    AliasedPointSizeRange,
    AlphaBits,
    BlueBits,
    DepthBits,
    GreenBits,
    RedBits,
    StencilBits,
    MaxAnisotropy,
    MaxCombinedTextureImageUnits,
    MaxCubeMapTextureSize,
    MaxFragmentUniformVectors,
    MaxRenderbufferSize,
    MaxTextureImageUnits,
    MaxTextureSize,
    MaxVaryingVectors,
    MaxVertexAttribs,
    MaxVertexTextureImageUnits,
    MaxVertexUniformVectors,
    MaxViewportDims,
}

impl GlParameter {
    /// Parameters folded into the derived WebGL fingerprint, in output order
    pub const DERIVED: &'static [GlParameter] = &[
        GlParameter::Version,
        GlParameter::ShadingLanguageVersion,
        GlParameter::AliasedLineWidthRange,
        GlParameter::AliasedPointSizeRange,
        GlParameter::AlphaBits,
        GlParameter::BlueBits,
        GlParameter::DepthBits,
        GlParameter::GreenBits,
        GlParameter::RedBits,
        GlParameter::StencilBits,
        GlParameter::MaxAnisotropy,
        GlParameter::MaxCombinedTextureImageUnits,
        GlParameter::MaxCubeMapTextureSize,
        GlParameter::MaxFragmentUniformVectors,
        GlParameter::MaxRenderbufferSize,
        GlParameter::MaxTextureImageUnits,
        GlParameter::MaxTextureSize,
        GlParameter::MaxVaryingVectors,
        GlParameter::MaxVertexAttribs,
        GlParameter::MaxVertexTextureImageUnits,
        GlParameter::MaxVertexUniformVectors,
        GlParameter::MaxViewportDims,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vendor => "vendor",
            Self::Renderer => "renderer",
            Self::UnmaskedVendor => "unmasked_vendor",
            Self::UnmaskedRenderer => "unmasked_renderer",
            Self::Version => "version",
            Self::ShadingLanguageVersion => "shading_language_version",
            Self::AliasedLineWidthRange => "aliased_line_width_range",
            Self::AliasedPointSizeRange => "aliased_point_size_range",
            Self::AlphaBits => "alpha_bits",
            Self::BlueBits => "blue_bits",
            Self::DepthBits => "depth_bits",
            Self::GreenBits => "green_bits",
            Self::RedBits => "red_bits",
            Self::StencilBits => "stencil_bits",
            Self::MaxAnisotropy => "max_anisotropy",
            Self::MaxCombinedTextureImageUnits => "max_combined_texture_image_units",
            Self::MaxCubeMapTextureSize => "max_cube_map_texture_size",
            Self::MaxFragmentUniformVectors => "max_fragment_uniform_vectors",
            Self::MaxRenderbufferSize => "max_renderbuffer_size",
            Self::MaxTextureImageUnits => "max_texture_image_units",
            Self::MaxTextureSize => "max_texture_size",
            Self::MaxVaryingVectors => "max_varying_vectors",
            Self::MaxVertexAttribs => "max_vertex_attribs",
            Self::MaxVertexTextureImageUnits => "max_vertex_texture_image_units",
            Self::MaxVertexUniformVectors => "max_vertex_uniform_vectors",
            Self::MaxViewportDims => "max_viewport_dims",
        }
    }
}

// ============================================================================
// Transient Rendering Surfaces
// ============================================================================

/// Off-document 2D drawing surface, released when dropped
pub trait Canvas2d {
    fn set_font(&mut self, font: &str);
    fn set_text_baseline(&mut self, baseline: TextBaseline);
    fn set_fill_style(&mut self, style: &str);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64);
    /// Serialize the rendered pixels
    fn to_data_url(&self) -> Capability<String>;
}

/// Off-document WebGL context, released when dropped
pub trait WebGlContext {
    fn parameter(&self, parameter: GlParameter) -> Capability<String>;
    fn extensions(&self) -> Capability<Vec<String>>;
}

// ============================================================================
// Environment
// ============================================================================

/// Capability accessor handed to every probe
///
/// Implementations must not panic: anything that goes wrong is reported as
/// [`Capability::Failed`].
#[cfg_attr(test, mockall::automock)]
pub trait Environment {
    fn user_agent(&self) -> Capability<String>;
    fn language(&self) -> Capability<String>;
    fn color_depth(&self) -> Capability<u32>;
    fn cookie_enabled(&self) -> Capability<bool>;
    fn screen_size(&self) -> Capability<ScreenSize>;
    /// Minutes to add to local time to get UTC
    fn timezone_offset(&self) -> Capability<i32>;
    fn has_session_storage(&self) -> Capability<bool>;
    fn has_local_storage(&self) -> Capability<bool>;
    fn has_indexed_db(&self) -> Capability<bool>;
    /// IE `addBehavior` on the document body
    fn has_add_behavior(&self) -> Capability<bool>;
    /// WebSQL `openDatabase`
    fn has_open_database(&self) -> Capability<bool>;
    fn cpu_class(&self) -> Capability<String>;
    fn platform(&self) -> Capability<String>;
    fn do_not_track(&self) -> Capability<String>;
    fn plugins(&self) -> Capability<Vec<Plugin>>;

    /// Whether this is a legacy IE-family environment with ActiveX
    fn is_legacy_ie(&self) -> Capability<bool>;
    /// Instantiate and immediately dispose of an ActiveX control
    fn create_activex(&self, prog_id: &str) -> Capability<()>;

    /// Create a detached 2D canvas; never attaches to a document root
    fn create_canvas(&self, width: u32, height: u32) -> Capability<Box<dyn Canvas2d>>;
    /// Create a detached WebGL context
    fn create_webgl(&self) -> Capability<Box<dyn WebGlContext>>;
}
