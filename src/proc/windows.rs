// src/proc/windows.rs

//! Windows tree signaling via `taskkill`.
//!
//! There is no POSIX-style group signal here; `taskkill /T` walks the
//! process tree of the given pid instead, and `/F` upgrades the request to
//! a hard kill. A nonzero taskkill exit means the tree is already gone and
//! counts as success, mirroring the unix module's contract.
//!
//! The soft form posts WM_CLOSE, which console-only tools usually ignore,
//! so on this platform phase one is often a no-op and cancellation rides
//! out the full grace period before the hard kill lands. A console
//! ctrl-event would reach such tools but needs win32 bindings this crate
//! does not carry.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::errors::Result;

/// Ask the process tree to close (taskkill without /F).
pub async fn signal_group_interrupt(pid: u32) -> Result<()> {
    taskkill(pid, false).await
}

/// Kill the process tree unconditionally (taskkill /F).
pub async fn signal_group_kill(pid: u32) -> Result<()> {
    taskkill(pid, true).await
}

async fn taskkill(pid: u32, force: bool) -> Result<()> {
    let mut command = Command::new("taskkill");
    command.args(["/PID", &pid.to_string(), "/T"]);
    if force {
        command.arg("/F");
    }

    let status = command
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;

    debug!(pid, force, code = ?status.code(), "taskkill finished");
    Ok(())
}
