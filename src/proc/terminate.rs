// src/proc/terminate.rs

//! Two-phase group termination.
//!
//! Phase one sends the platform interrupt and gives the group a grace
//! period to exit voluntarily. Phase two kills the group and blocks until
//! the OS confirms death. Signal delivery errors are swallowed; only the
//! liveness check decides whether escalation continues.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use super::ChildProcess;
use super::{signal_group_interrupt, signal_group_kill};

/// How long a group gets to exit voluntarily before the hard kill.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Escalating termination of the child's process group.
///
/// Returns the observed exit status, or `None` when the status could not
/// be collected (the child is still guaranteed dead or dying by then; the
/// kill signal is unconditional).
pub async fn terminate_group(
    child: &mut ChildProcess,
    grace: Duration,
) -> Option<std::process::ExitStatus> {
    if let Err(e) = signal_group_interrupt(child.pid()).await {
        warn!(pid = child.pid(), error = %e, "group interrupt failed, escalating");
    }

    match timeout(grace, child.wait()).await {
        Ok(Ok(status)) => {
            debug!(pid = child.pid(), %status, "group exited within grace period");
            return Some(status);
        }
        Ok(Err(e)) => {
            warn!(pid = child.pid(), error = %e, "wait failed during grace period");
        }
        Err(_) => {
            debug!(pid = child.pid(), ?grace, "grace period elapsed, killing group");
        }
    }

    if let Err(e) = signal_group_kill(child.pid()).await {
        warn!(pid = child.pid(), error = %e, "group kill failed");
    }

    match child.wait().await {
        Ok(status) => {
            debug!(pid = child.pid(), %status, "group exited after kill");
            Some(status)
        }
        Err(e) => {
            warn!(pid = child.pid(), error = %e, "wait after kill failed");
            None
        }
    }
}
