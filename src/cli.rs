// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! NOTE: this expects `clap` to be built with the `derive` feature, e.g.:
//! `clap = { version = "4.5.53", features = ["derive"] }` in `Cargo.toml`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `dlpilot`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dlpilot",
    version,
    about = "Drive a media download tool with live progress and clean cancellation.",
    long_about = None
)]
pub struct CliArgs {
    /// URL to download.
    pub url: String,

    /// Path to the download tool binary.
    ///
    /// If omitted, the config file and a list of well-known locations are
    /// probed.
    #[arg(long, value_name = "PATH")]
    pub tool: Option<String>,

    /// Directory downloads land in.
    ///
    /// Default: config `dest`, else the current working directory.
    #[arg(long, value_name = "DIR")]
    pub dest: Option<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Dlpilot.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Extract audio instead of downloading video.
    #[arg(long)]
    pub audio: bool,

    /// Quality choice.
    ///
    /// Video: auto, best, 1080p, 720p, 480p, 360p, video-only, audio-only.
    /// Audio: best, 320k, 256k, 192k, 128k, 96k.
    #[arg(long, value_name = "QUALITY")]
    pub quality: Option<String>,

    /// Container (video) or codec (audio) choice.
    ///
    /// Video: mp4, webm, mkv, mov, avi. Audio: mp3, m4a, wav, flac, opus.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DLPILOT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve tool and options and print the command line, but don't run it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
