// src/proc/unix.rs

//! POSIX group signaling via `killpg`.
//!
//! The child is a session leader (see spawn), so its pid doubles as the
//! process-group id. `ESRCH` and `EPERM` mean the group is already gone
//! and count as success; the caller's liveness check decides what happens
//! next either way.

use nix::errno::Errno;
use nix::sys::signal::{Signal, killpg};
use nix::unistd::Pid;
use tracing::debug;

use crate::errors::Result;

/// Ask the whole process group to terminate (SIGTERM).
pub async fn signal_group_interrupt(pid: u32) -> Result<()> {
    signal_group(pid, Signal::SIGTERM)
}

/// Kill the whole process group unconditionally (SIGKILL).
pub async fn signal_group_kill(pid: u32) -> Result<()> {
    signal_group(pid, Signal::SIGKILL)
}

fn signal_group(pid: u32, signal: Signal) -> Result<()> {
    let pgid = Pid::from_raw(pid as i32);
    match killpg(pgid, signal) {
        Ok(()) => {
            debug!(%pgid, %signal, "signaled process group");
            Ok(())
        }
        Err(Errno::ESRCH) | Err(Errno::EPERM) => {
            // Group already exited (or was reaped and the pid reused by
            // another owner).
            debug!(%pgid, %signal, "process group already gone");
            Ok(())
        }
        Err(errno) => Err(std::io::Error::from_raw_os_error(errno as i32).into()),
    }
}
