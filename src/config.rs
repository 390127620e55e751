// src/config.rs

//! Optional `Dlpilot.toml` defaults.
//!
//! Everything here is a default for a CLI flag; flags always win.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::Result;

/// Defaults as read from a TOML file:
///
/// ```toml
/// tool = "/usr/local/bin/yt-dlp"
/// dest = "~/Downloads"
/// audio = false
/// quality = "1080p"
/// format = "mp4"
/// ```
///
/// All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Path to the download tool binary.
    pub tool: Option<PathBuf>,

    /// Directory downloads land in.
    pub dest: Option<PathBuf>,

    /// Default to audio extraction.
    #[serde(default)]
    pub audio: bool,

    /// Default quality choice, parsed the same way as `--quality`.
    pub quality: Option<String>,

    /// Default container or codec choice, parsed the same way as `--format`.
    pub format: Option<String>,
}

/// Load defaults from a given path.
///
/// This only performs TOML deserialization; quality and format strings are
/// validated later, together with their CLI counterparts.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<FileConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: FileConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load defaults, tolerating absence.
///
/// An explicit `--config` path must load; the implicit `Dlpilot.toml` in the
/// working directory is used only when present.
pub fn load_optional(explicit: Option<&Path>) -> Result<FileConfig> {
    match explicit {
        Some(path) => load_from_path(path),
        None => {
            let default = default_config_path();
            if default.exists() {
                load_from_path(default)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

/// Helper to resolve the default config path.
///
/// Currently this just returns `Dlpilot.toml` in the current working
/// directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Dlpilot.toml")
}
