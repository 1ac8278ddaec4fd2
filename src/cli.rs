/*
 * This file is part of Envprint.
 *
 * Copyright (C) 2025 Envprint contributors
 *
 * Envprint is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Envprint is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Envprint. If not, see <https://www.gnu.org/licenses/>.
 */

//! Command Line Interface
//!
//! `get` computes a fingerprint of the host or of a snapshot file, `signals`
//! prints the signal table. Command handlers return the text to print so the
//! binary stays a thin wrapper.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ep_core::{
    BuiltinHasher, Environment, Fingerprint, FingerprintOutput, Gate, HostEnvironment,
    SnapshotEnvironment, Toggle, SIGNALS,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(name = "envprint")]
#[command(version)]
#[command(about = "Envprint - derive a stable identifier from environment signals")]
#[command(long_about = "Envprint - derive a stable identifier from environment signals

Samples user agent, language, screen, storage, plugin and other signals,
joins them in a fixed order and hashes the result. Optional signals
(canvas, WebGL, ActiveX, screen resolution) are enabled with flags.

EXAMPLES:
    envprint                                   Fingerprint this host
    envprint get --snapshot chrome.json        Fingerprint a captured browser
    envprint get --snapshot chrome.json --canvas --webgl --breakdown
    envprint get --hasher murmur3              Use MurmurHash3 instead of SHA-256
    envprint signals                           List signals in combination order

ENVIRONMENT VARIABLES:
    RUST_LOG=debug         Enable debug logging")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute a fingerprint (default)
    Get(GetArgs),

    /// List the signals in combination order with the flag that enables each
    Signals,
}

#[derive(Args, Debug, Default, Clone)]
pub struct GetArgs {
    /// Read the environment from a JSON snapshot instead of the host
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// JSON options file; flags given here take precedence over its fields
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Include the canvas rendering signal
    #[arg(long)]
    pub canvas: bool,

    /// Include the WebGL vendor, renderer and parameter signals
    #[arg(long)]
    pub webgl: bool,

    /// Include the ActiveX control enumeration (legacy IE)
    #[arg(long)]
    pub ie_activex: bool,

    /// Include the screen resolution
    #[arg(long)]
    pub screen_resolution: bool,

    /// Report the resolution independently of device rotation
    #[arg(long)]
    pub screen_orientation: bool,

    /// Print every sampled value next to the identifier
    #[arg(long)]
    pub breakdown: bool,

    /// Built-in hasher: sha256 or murmur3
    #[arg(long, value_name = "NAME")]
    pub hasher: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl GetArgs {
    fn toggle_flags(&self) -> [(Toggle, bool); 5] {
        [
            (Toggle::Canvas, self.canvas),
            (Toggle::Webgl, self.webgl),
            (Toggle::IeActivex, self.ie_activex),
            (Toggle::ScreenResolution, self.screen_resolution),
            (Toggle::ScreenOrientation, self.screen_orientation),
        ]
    }
}

/// Execute the parsed command line, returning the text to print
pub fn run(cli: &Cli) -> Result<String> {
    match &cli.command {
        None => cmd_get(&GetArgs::default()),
        Some(Commands::Get(args)) => cmd_get(args),
        Some(Commands::Signals) => Ok(cmd_signals()),
    }
}

// ============================================================================
// Get Command
// ============================================================================

fn cmd_get(args: &GetArgs) -> Result<String> {
    let options = options_value(args)?;
    debug!(options = %options, "Effective fingerprint options");

    let output = match &args.snapshot {
        Some(path) => {
            let env = SnapshotEnvironment::load(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            fingerprint(env, options)
        }
        None => fingerprint(HostEnvironment::new(), options),
    };

    render(&output, args.json)
}

fn fingerprint<E: Environment>(env: E, options: Value) -> FingerprintOutput {
    Fingerprint::with_environment(env, options).get()
}

/// Merge the options file with command-line flags into one options object
fn options_value(args: &GetArgs) -> Result<Value> {
    let mut fields = match &args.options {
        Some(path) => match read_options(path)? {
            Value::Object(fields) => fields,
            Value::String(name) => {
                let mut fields = Map::new();
                fields.insert("hasher".to_string(), Value::String(name));
                fields
            }
            Value::Null => Map::new(),
            other => {
                warn!(path = %path.display(), value = %other, "Ignoring options file that is not an object");
                Map::new()
            }
        },
        None => Map::new(),
    };

    for (toggle, enabled) in args.toggle_flags() {
        if enabled {
            fields.insert(toggle.as_str().to_string(), Value::Bool(true));
        }
    }
    if args.breakdown {
        fields.insert("breakdown".to_string(), Value::Bool(true));
    }
    if let Some(name) = &args.hasher {
        let hasher: BuiltinHasher = name.parse()?;
        fields.insert("hasher".to_string(), Value::String(hasher.as_str().to_string()));
    }

    Ok(Value::Object(fields))
}

fn read_options(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse options file {}", path.display()))
}

fn render(output: &FingerprintOutput, json: bool) -> Result<String> {
    if json || output.is_detailed() {
        Ok(serde_json::to_string_pretty(output)?)
    } else {
        Ok(output.value().to_string())
    }
}

// ============================================================================
// Signals Command
// ============================================================================

fn cmd_signals() -> String {
    let mut lines = vec!["Signals (combination order):".to_string()];
    let mut position = 1;

    for descriptor in SIGNALS {
        let gate = match &descriptor.gate {
            Gate::Always => "always".to_string(),
            Gate::When(toggle) => format!("--{}", toggle.as_str().replace('_', "-")),
        };
        for name in descriptor.names {
            lines.push(format!("  {:>2}. {:<18} {}", position, name, gate));
            position += 1;
        }
    }

    lines.join("\n")
}
