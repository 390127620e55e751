// src/locate.rs

//! Finding the download tool on this machine.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::{DlpilotError, Result};

/// Candidate locations probed in order, bare names first so `PATH`
/// lookups win over fixed install paths.
fn candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("yt-dlp.exe"), PathBuf::from("yt-dlp")];
    if let Some(home) = home_dir() {
        paths.push(home.join("yt-dlp.exe"));
        paths.push(home.join("yt-dlp"));
    }
    paths.push(PathBuf::from("/usr/local/bin/yt-dlp"));
    paths.push(PathBuf::from("/usr/bin/yt-dlp"));
    paths.push(PathBuf::from("C:/yt-dlp/yt-dlp.exe"));
    paths
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Probe the candidate list and return the first entry that exists on
/// disk or answers a `--version` check.
pub async fn locate_tool() -> Result<PathBuf> {
    for candidate in candidates() {
        if candidate.exists() || answers_version(&candidate).await {
            debug!(tool = %candidate.display(), "located download tool");
            return Ok(candidate);
        }
    }
    Err(DlpilotError::ToolNotFound)
}

/// Whether invoking `<path> --version` succeeds; catches bare names that
/// resolve through `PATH` without being files in the working directory.
async fn answers_version(path: &Path) -> bool {
    Command::new(path)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
