// src/session.rs

//! The download session: spawn, stream, parse, cancel, complete.
//!
//! [`Downloader`] is the supervisor facade. `start` spawns the tool and a
//! background task that owns the child end to end: it pulls merged output
//! lines, turns them into events, and runs the termination escalation when
//! a stop is requested. The caller's context never blocks on the child;
//! `request_stop` only flips a watch flag the background task acts on.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::command::CommandSpec;
use crate::errors::{DlpilotError, Result};
use crate::events::{Completion, DownloadEvent};
use crate::parse;
use crate::proc::{
    ChildProcess, DEFAULT_GRACE_PERIOD, merged_lines, spawn_group, terminate_group,
};

/// Lifecycle phase of the in-flight session.
///
/// Phases only move forward; `Finished` releases the slot for the next
/// `start`. All transitions happen on the background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    StopRequested,
    Terminating,
    Finished,
}

/// Handle to the one in-flight session.
struct Session {
    stop_tx: watch::Sender<bool>,
    phase_rx: watch::Receiver<Phase>,
}

/// Supervisor for one download subprocess at a time.
///
/// Events are posted to the channel given at construction, in read order,
/// ending with exactly one [`DownloadEvent::Completed`] per session. The
/// sends never block, so a slow consumer cannot stall the reader.
pub struct Downloader {
    events_tx: mpsc::UnboundedSender<DownloadEvent>,
    grace_period: Duration,
    session: Option<Session>,
}

impl Downloader {
    pub fn new(events_tx: mpsc::UnboundedSender<DownloadEvent>) -> Self {
        Self {
            events_tx,
            grace_period: DEFAULT_GRACE_PERIOD,
            session: None,
        }
    }

    /// Override the graceful-termination grace period.
    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Begin a session for the given invocation.
    ///
    /// Fails fast, before spawning, when a session is already active.
    /// Creates the target directory if absent. Spawn and directory failures
    /// are returned and also posted as [`DownloadEvent::Error`], and leave
    /// no session behind.
    pub fn start(&mut self, spec: CommandSpec) -> Result<()> {
        if self.is_active() {
            return Err(DlpilotError::SessionActive);
        }

        if let Err(source) = std::fs::create_dir_all(&spec.target_dir) {
            let err = DlpilotError::TargetDirError {
                dir: spec.target_dir.display().to_string(),
                source,
            };
            let _ = self.events_tx.send(DownloadEvent::Error(err.to_string()));
            return Err(err);
        }

        let mut child = match spawn_group(&spec) {
            Ok(child) => child,
            Err(err) => {
                let _ = self.events_tx.send(DownloadEvent::Error(err.to_string()));
                return Err(err);
            }
        };

        info!(pid = child.pid(), command = %spec.display_line(), "download session started");

        let (stop_tx, stop_rx) = watch::channel(false);
        let (phase_tx, phase_rx) = watch::channel(Phase::Running);

        let lines = merged_lines(child.take_stdout(), child.take_stderr());
        let events = self.events_tx.clone();
        let grace = self.grace_period;
        let target_dir = spec.target_dir.clone();
        tokio::spawn(run_session(
            child, lines, target_dir, events, stop_rx, phase_tx, grace,
        ));

        self.session = Some(Session { stop_tx, phase_rx });
        Ok(())
    }

    /// Ask the active session to stop; a no-op when none is active.
    ///
    /// Returns immediately. The background task notices the flag, runs the
    /// termination escalation, and posts a cancelled completion. Duplicate
    /// calls coalesce into one termination sequence.
    pub fn request_stop(&self) {
        match &self.session {
            Some(session) if *session.phase_rx.borrow() != Phase::Finished => {
                debug!("stop requested");
                let _ = session.stop_tx.send(true);
            }
            _ => debug!("stop requested with no active session, ignoring"),
        }
    }

    /// Whether a session is currently active. Non-blocking.
    pub fn is_active(&self) -> bool {
        match &self.session {
            Some(session) => *session.phase_rx.borrow() != Phase::Finished,
            None => false,
        }
    }
}

/// How the read loop ended.
enum ReadOutcome {
    /// Both pipes closed; the tool is exiting on its own.
    Drained,
    /// A stop request interrupted reading.
    Stopped,
}

async fn run_session(
    mut child: ChildProcess,
    mut lines: mpsc::UnboundedReceiver<String>,
    target_dir: PathBuf,
    events: mpsc::UnboundedSender<DownloadEvent>,
    mut stop_rx: watch::Receiver<bool>,
    phase_tx: watch::Sender<Phase>,
    grace: Duration,
) {
    let mut last_destination: Option<String> = None;

    let outcome = loop {
        let next = tokio::select! {
            maybe_line = lines.recv() => maybe_line,
            _ = wait_for_stop(&mut stop_rx) => break ReadOutcome::Stopped,
        };
        // Checked before handling so a line racing the stop request is
        // dropped rather than reported after the fact.
        if *stop_rx.borrow() {
            break ReadOutcome::Stopped;
        }
        match next {
            Some(raw) => {
                let line = raw.trim();
                if !line.is_empty() {
                    handle_line(line, &events, &mut last_destination);
                }
            }
            None => break ReadOutcome::Drained,
        }
    };

    match outcome {
        ReadOutcome::Stopped => finish_cancelled(child, &events, &phase_tx, grace).await,
        ReadOutcome::Drained => {
            // Pipes are closed, so exit is normally imminent; a stop
            // request must still win over a child that lingers anyway.
            let waited = tokio::select! {
                status = child.wait() => Some(status),
                _ = wait_for_stop(&mut stop_rx) => None,
            };
            match waited {
                Some(Ok(status)) => {
                    finish_exited(
                        status,
                        last_destination.take(),
                        &target_dir,
                        &events,
                        &phase_tx,
                    );
                }
                Some(Err(e)) => {
                    warn!(error = %e, "could not collect tool exit status");
                    let _ = events.send(DownloadEvent::Error(format!(
                        "could not collect tool exit status: {e}"
                    )));
                    let path = resolve_output_path(last_destination.take(), &target_dir, false);
                    set_phase(&phase_tx, Phase::Finished);
                    let _ = events.send(DownloadEvent::Completed(Completion::failed(None, path)));
                }
                None => finish_cancelled(child, &events, &phase_tx, grace).await,
            }
        }
    }
}

/// Log the line, then feed it to both parsers.
///
/// A destination fact only updates session state; it surfaces later in the
/// completion event. A progress fact is forwarded immediately, including
/// repeats.
fn handle_line(
    line: &str,
    events: &mpsc::UnboundedSender<DownloadEvent>,
    last_destination: &mut Option<String>,
) {
    let _ = events.send(DownloadEvent::Log(line.to_string()));

    if let Some(dest) = parse::parse_destination(line) {
        debug!(destination = %dest, "tool announced output file");
        *last_destination = Some(dest);
    }

    if let Some(percent) = parse::parse_progress(line) {
        let status = format!("Download progress: {percent:.1}%");
        let _ = events.send(DownloadEvent::Progress { percent, status });
    }
}

fn finish_exited(
    status: ExitStatus,
    last_destination: Option<String>,
    target_dir: &Path,
    events: &mpsc::UnboundedSender<DownloadEvent>,
    phase_tx: &watch::Sender<Phase>,
) {
    let path = resolve_output_path(last_destination, target_dir, status.success());
    let completion = if status.success() {
        info!(path = ?path, "download finished");
        Completion::succeeded(status.code().unwrap_or(0), path)
    } else {
        warn!(%status, "download tool exited with failure");
        Completion::failed(status.code(), path)
    };
    set_phase(phase_tx, Phase::Finished);
    let _ = events.send(DownloadEvent::Completed(completion));
}

async fn finish_cancelled(
    mut child: ChildProcess,
    events: &mpsc::UnboundedSender<DownloadEvent>,
    phase_tx: &watch::Sender<Phase>,
    grace: Duration,
) {
    set_phase(phase_tx, Phase::StopRequested);
    set_phase(phase_tx, Phase::Terminating);
    info!(pid = child.pid(), "stopping download tool");
    let status = terminate_group(&mut child, grace).await;
    let exit_code = status.and_then(|s| s.code());
    info!(?exit_code, "download stopped");
    set_phase(phase_tx, Phase::Finished);
    let _ = events.send(DownloadEvent::Completed(Completion::cancelled(exit_code)));
}

/// Wait until a stop has been requested.
///
/// An error means the session handle was dropped; with nobody left to
/// request a stop, park forever and let the other select arms decide.
async fn wait_for_stop(stop_rx: &mut watch::Receiver<bool>) {
    if stop_rx.wait_for(|stopped| *stopped).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn set_phase(phase_tx: &watch::Sender<Phase>, phase: Phase) {
    debug!(?phase, "session phase change");
    let _ = phase_tx.send(phase);
}

/// The path reported in the completion event.
///
/// Preferred: the last destination the tool announced, taken verbatim (the
/// tool prints these joined onto the target directory already). Fallback,
/// on success only: the newest file in the target directory.
fn resolve_output_path(
    last_destination: Option<String>,
    target_dir: &Path,
    success: bool,
) -> Option<PathBuf> {
    if let Some(dest) = last_destination {
        return Some(PathBuf::from(dest));
    }
    if !success {
        return None;
    }
    newest_file(target_dir)
}

/// Most recently modified plain file in `dir`.
///
/// Racy when other writers share the directory; acceptable as a fallback
/// only because sessions are serialized to one at a time.
fn newest_file(dir: &Path) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "could not scan target directory");
            return None;
        }
    };

    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        let newer = match &newest {
            Some((best, _)) => modified > *best,
            None => true,
        };
        if newer {
            newest = Some((modified, path));
        }
    }
    newest.map(|(_, path)| path)
}
