// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DlpilotError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to spawn '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create target directory '{dir}': {source}")]
    TargetDirError {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    #[error("A download session is already active")]
    SessionActive,

    #[error("Could not locate the download tool; pass --tool or install yt-dlp")]
    ToolNotFound,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DlpilotError>;
