//! Constants for Envprint
//!
//! Centralizes sentinels, separators, probe drawing parameters and limits.
//! Values in `combination` and `canvas` feed the combination string, so
//! changing any of them changes every identifier produced.

/// Values that shape the combination string
pub mod combination {
    /// Sentinel recorded for a signal whose capability is unavailable
    pub const NOT_SUPPORTED: &str = "Not supported";

    /// Separator placed between sample values
    pub const SEPARATOR: &str = "###";

    /// Separator between entries of a list-valued signal (plugins, controls)
    pub const LIST_SEPARATOR: &str = ";";

    /// Separator between the name, description and mime types of one plugin
    pub const PLUGIN_FIELD_SEPARATOR: &str = "::";

    /// Separator between a mime type and its suffixes
    pub const MIME_SUFFIX_SEPARATOR: &str = "~";
}

/// Fixed drawing performed by the canvas probe
pub mod canvas {
    pub const WIDTH: u32 = 220;
    pub const HEIGHT: u32 = 30;

    pub const FONT: &str = "14px 'Arial'";
    pub const TEXT: &str = "envprint <canvas> 1.0";

    pub const BLOCK_FILL: &str = "#f60";
    pub const BLOCK_RECT: (f64, f64, f64, f64) = (125.0, 1.0, 62.0, 20.0);

    pub const TEXT_FILL: &str = "#069";
    pub const TEXT_POSITION: (f64, f64) = (2.0, 15.0);

    pub const SHADOW_FILL: &str = "rgba(102, 204, 0, 0.7)";
    pub const SHADOW_POSITION: (f64, f64) = (4.0, 17.0);
}

/// WebGL probe parameters
pub mod webgl {
    /// Separator between entries of the derived WebGL fingerprint
    pub const FIELD_SEPARATOR: &str = "~";

    /// Separator between extension names
    pub const EXTENSION_SEPARATOR: &str = ";";
}

/// Legacy ActiveX controls probed on IE-family environments, in probe order
pub const ACTIVEX_CONTROLS: &[&str] = &[
    "AcroPDF.PDF",
    "Adodb.Stream",
    "AgControl.AgControl",
    "DevalVRXCtrl.DevalVRXCtrl.1",
    "MacromediaFlashPaper.MacromediaFlashPaper",
    "Msxml2.DOMDocument",
    "Msxml2.XMLHTTP",
    "PDF.PdfCtrl",
    "QuickTime.QuickTime",
    "QuickTimeCheckObject.QuickTimeCheck.1",
    "RealPlayer",
    "RealPlayer.RealPlayer(tm) ActiveX Control (32-bit)",
    "RealVideo.RealVideo(tm) ActiveX Control (32-bit)",
    "Scripting.Dictionary",
    "SWCtl.SWCtl",
    "Shell.UIHelper",
    "ShockwaveFlash.ShockwaveFlash",
    "Skype.Detection",
    "TDCCtl.TDCCtl",
    "WMPlayer.OCX",
    "rmocx.RealPlayer G2 Control",
    "rmocx.RealPlayer G2 Control.1",
];

/// Built-in hasher parameters
pub mod hashing {
    /// Seed used by the MurmurHash3 built-in
    pub const MURMUR3_SEED: u32 = 31;
}

/// Input limits
pub mod limits {
    /// Maximum size of an environment snapshot file (1 MB)
    pub const MAX_SNAPSHOT_SIZE: u64 = 1024 * 1024;
}
