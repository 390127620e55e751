// src/proc/spawn.rs

//! Spawning the supervised tool into its own process group.

use std::process::Stdio;

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tracing::debug;

use crate::command::CommandSpec;
use crate::errors::{DlpilotError, Result};

/// One spawned child, leader of its own process group.
///
/// Exactly one of these exists per session; it is dropped once the exit
/// status has been observed or a forced kill has completed.
#[derive(Debug)]
pub struct ChildProcess {
    pid: u32,
    child: Child,
}

impl ChildProcess {
    /// Process id; doubles as the process-group id (the child is the
    /// group leader).
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Wait for the process to exit. Safe to call again after a timeout
    /// cancelled an earlier wait.
    pub async fn wait(&mut self) -> std::io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }

    /// Take the stdout pipe for async reading, if still attached.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take the stderr pipe for async reading, if still attached.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }
}

/// Spawn the tool described by `spec` with both output pipes captured.
///
/// The child runs in the target directory and, on unix, calls `setsid()`
/// before exec so one signal can reach it and every descendant. Failures
/// surface before any session state exists.
pub fn spawn_group(spec: &CommandSpec) -> Result<ChildProcess> {
    debug!(program = %spec.program.display(), args = ?spec.args, "spawning download tool");

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .current_dir(&spec.target_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    configure_process_group(&mut command);

    let mut child = command.spawn().map_err(|source| DlpilotError::SpawnError {
        program: spec.program.display().to_string(),
        source,
    })?;

    let pid = match child.id() {
        Some(pid) => pid,
        None => {
            // Exited between spawn and here; extremely unlikely but the id
            // is load-bearing for group signaling.
            return Err(DlpilotError::SpawnError {
                program: spec.program.display().to_string(),
                source: std::io::Error::other("spawned child has no pid"),
            });
        }
    };

    debug!(pid, "download tool spawned in its own process group");
    Ok(ChildProcess { pid, child })
}

#[cfg(unix)]
fn configure_process_group(command: &mut Command) {
    // Safety: setsid() is async-signal-safe, so it may run between fork and
    // exec. It makes the child a session and process-group leader.
    unsafe {
        command.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(windows)]
fn configure_process_group(_command: &mut Command) {
    // Tree-wide termination goes through `taskkill /T`; no spawn flags
    // are needed for that.
}
