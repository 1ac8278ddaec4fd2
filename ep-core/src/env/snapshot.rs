//! Environment captured as a JSON document
//!
//! A snapshot records what a browser reported for each capability. Any field
//! left out of the document answers `Unsupported`, so `{}` is a valid (if
//! featureless) environment.
//!
//! Rendering is simulated: the canvas records its draw calls and digests them
//! together with the snapshot's rasterizer profile, and the WebGL context
//! answers from a parameter table. Both count themselves in a live-surface
//! counter shared by all clones of the snapshot, which lets callers verify
//! that every surface was released.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ep_error::{EnvprintError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::{
    Canvas2d, Capability, Environment, GlParameter, Plugin, ScreenSize, TextBaseline,
    WebGlContext,
};
use crate::constants::limits::MAX_SNAPSHOT_SIZE;

/// Upper bound for a plausible color depth in bits
const MAX_COLOR_DEPTH: u32 = 64;

/// Rasterization characteristics of the captured canvas implementation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasProfile {
    /// Identifies font hinting, anti-aliasing and GPU quirks of the source
    pub rasterizer: String,
}

/// WebGL answers of the captured environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebGlProfile {
    #[serde(default)]
    pub parameters: BTreeMap<GlParameter, String>,
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotEnvironment {
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub color_depth: Option<u32>,
    pub cookie_enabled: Option<bool>,
    pub screen: Option<ScreenSize>,
    pub timezone_offset: Option<i32>,
    pub session_storage: Option<bool>,
    pub local_storage: Option<bool>,
    pub indexed_db: Option<bool>,
    pub add_behavior: Option<bool>,
    pub open_database: Option<bool>,
    pub cpu_class: Option<String>,
    pub platform: Option<String>,
    pub do_not_track: Option<String>,
    pub plugins: Option<Vec<Plugin>>,
    pub legacy_ie: Option<bool>,
    /// ActiveX ProgIDs that can be instantiated
    pub activex_controls: Option<Vec<String>>,
    pub canvas: Option<CanvasProfile>,
    pub webgl: Option<WebGlProfile>,

    #[serde(skip)]
    live_surfaces: Arc<AtomicUsize>,
}

impl SnapshotEnvironment {
    /// Parse and validate a snapshot document
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Load a snapshot file from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EnvprintError::FileNotFound(path.to_path_buf()));
        }

        let metadata = fs::metadata(path).map_err(|e| EnvprintError::file_read(path, e))?;
        if metadata.len() > MAX_SNAPSHOT_SIZE {
            return Err(EnvprintError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max_size: MAX_SNAPSHOT_SIZE,
            });
        }

        let content = fs::read_to_string(path).map_err(|e| EnvprintError::file_read(path, e))?;
        let snapshot = Self::from_json(&content)?;

        info!(
            path = %path.display(),
            canvas = snapshot.canvas.is_some(),
            webgl = snapshot.webgl.is_some(),
            "Loaded environment snapshot"
        );

        Ok(snapshot)
    }

    /// Reject snapshots no real environment could have produced
    pub fn validate(&self) -> Result<()> {
        if let Some(screen) = self.screen {
            if screen.width == 0 || screen.height == 0 {
                return Err(EnvprintError::invalid_snapshot(format!(
                    "screen size must be non-zero, got {}x{}",
                    screen.width, screen.height
                )));
            }
        }

        if let Some(depth) = self.color_depth {
            if depth == 0 || depth > MAX_COLOR_DEPTH {
                return Err(EnvprintError::invalid_snapshot(format!(
                    "color depth {} out of range (1-{})",
                    depth, MAX_COLOR_DEPTH
                )));
            }
        }

        if self.activex_controls.is_some() && self.legacy_ie != Some(true) {
            return Err(EnvprintError::invalid_snapshot(
                "activex_controls requires legacy_ie = true",
            ));
        }

        Ok(())
    }

    /// Number of canvas and WebGL surfaces currently alive
    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces.load(Ordering::SeqCst)
    }

    fn acquire_surface(&self) -> SurfaceGuard {
        self.live_surfaces.fetch_add(1, Ordering::SeqCst);
        SurfaceGuard {
            live: Arc::clone(&self.live_surfaces),
        }
    }
}

impl Environment for SnapshotEnvironment {
    fn user_agent(&self) -> Capability<String> {
        self.user_agent.clone().into()
    }

    fn language(&self) -> Capability<String> {
        self.language.clone().into()
    }

    fn color_depth(&self) -> Capability<u32> {
        self.color_depth.into()
    }

    fn cookie_enabled(&self) -> Capability<bool> {
        self.cookie_enabled.into()
    }

    fn screen_size(&self) -> Capability<ScreenSize> {
        self.screen.into()
    }

    fn timezone_offset(&self) -> Capability<i32> {
        self.timezone_offset.into()
    }

    fn has_session_storage(&self) -> Capability<bool> {
        self.session_storage.into()
    }

    fn has_local_storage(&self) -> Capability<bool> {
        self.local_storage.into()
    }

    fn has_indexed_db(&self) -> Capability<bool> {
        self.indexed_db.into()
    }

    fn has_add_behavior(&self) -> Capability<bool> {
        self.add_behavior.into()
    }

    fn has_open_database(&self) -> Capability<bool> {
        self.open_database.into()
    }

    fn cpu_class(&self) -> Capability<String> {
        self.cpu_class.clone().into()
    }

    fn platform(&self) -> Capability<String> {
        self.platform.clone().into()
    }

    fn do_not_track(&self) -> Capability<String> {
        self.do_not_track.clone().into()
    }

    fn plugins(&self) -> Capability<Vec<Plugin>> {
        self.plugins.clone().into()
    }

    fn is_legacy_ie(&self) -> Capability<bool> {
        self.legacy_ie.into()
    }

    fn create_activex(&self, prog_id: &str) -> Capability<()> {
        if self.legacy_ie != Some(true) {
            return Capability::Unsupported;
        }
        match &self.activex_controls {
            Some(controls) if controls.iter().any(|c| c == prog_id) => Capability::Supported(()),
            Some(_) => Capability::failed(format!("Automation server can't create object: {}", prog_id)),
            None => Capability::Unsupported,
        }
    }

    fn create_canvas(&self, width: u32, height: u32) -> Capability<Box<dyn Canvas2d>> {
        let Some(profile) = &self.canvas else {
            return Capability::Unsupported;
        };
        if width == 0 || height == 0 {
            return Capability::failed("canvas dimensions must be non-zero");
        }

        debug!(width, height, "Creating snapshot canvas");
        Capability::Supported(Box::new(RecordingCanvas {
            rasterizer: profile.rasterizer.clone(),
            width,
            height,
            font: "10px sans-serif".to_string(),
            baseline: TextBaseline::Alphabetic,
            fill_style: "#000000".to_string(),
            commands: Vec::new(),
            _guard: self.acquire_surface(),
        }))
    }

    fn create_webgl(&self) -> Capability<Box<dyn WebGlContext>> {
        let Some(profile) = &self.webgl else {
            return Capability::Unsupported;
        };

        debug!(parameters = profile.parameters.len(), "Creating snapshot WebGL context");
        Capability::Supported(Box::new(TableWebGl {
            profile: profile.clone(),
            _guard: self.acquire_surface(),
        }))
    }
}

// ============================================================================
// Simulated Surfaces
// ============================================================================

/// Decrements the live-surface counter when the owning surface is dropped
struct SurfaceGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

struct RecordingCanvas {
    rasterizer: String,
    width: u32,
    height: u32,
    font: String,
    baseline: TextBaseline,
    fill_style: String,
    commands: Vec<String>,
    _guard: SurfaceGuard,
}

impl Canvas2d for RecordingCanvas {
    fn set_font(&mut self, font: &str) {
        self.font = font.to_string();
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.baseline = baseline;
    }

    fn set_fill_style(&mut self, style: &str) {
        self.fill_style = style.to_string();
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(format!(
            "rect {} {} {} {} fill={}",
            x, y, width, height, self.fill_style
        ));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        self.commands.push(format!(
            "text {:?} {} {} font={} baseline={} fill={}",
            text,
            x,
            y,
            self.font,
            self.baseline.as_str(),
            self.fill_style
        ));
    }

    fn to_data_url(&self) -> Capability<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.rasterizer.as_bytes());
        hasher.update(format!("{}x{}", self.width, self.height).as_bytes());
        for command in &self.commands {
            hasher.update(b"\n");
            hasher.update(command.as_bytes());
        }
        Capability::Supported(format!("data:image/png;sha256,{:x}", hasher.finalize()))
    }
}

struct TableWebGl {
    profile: WebGlProfile,
    _guard: SurfaceGuard,
}

impl WebGlContext for TableWebGl {
    fn parameter(&self, parameter: GlParameter) -> Capability<String> {
        self.profile.parameters.get(&parameter).cloned().into()
    }

    fn extensions(&self) -> Capability<Vec<String>> {
        self.profile.extensions.clone().into()
    }
}
