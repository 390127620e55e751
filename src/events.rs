// src/events.rs

//! Events delivered from a download session to its observer.
//!
//! A session posts these over an unbounded channel in strict read order;
//! redundant progress updates are forwarded as-is, and exactly one
//! `Completed` event ends every session. The consumer drains the receiver
//! on whatever task or thread it likes.

use std::path::PathBuf;

/// Events flowing from the background session to the registered observer.
#[derive(Debug, Clone)]
pub enum DownloadEvent {
    /// One raw output line from the supervised tool.
    Log(String),
    /// A parsed progress fact, with a human-readable status text.
    Progress { percent: f64, status: String },
    /// The session finished; always the last event for a session.
    Completed(Completion),
    /// A session-level error (e.g. the tool could not be spawned).
    Error(String),
}

/// Final outcome of a download session.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The tool exited with status 0 and the session was not cancelled.
    pub success: bool,
    /// The session ended because the user requested a stop.
    pub cancelled: bool,
    /// Exit code if the process exited normally (absent when killed by a
    /// signal).
    pub exit_code: Option<i32>,
    /// Resolved output path: the last destination the tool announced, else
    /// the newest file in the target directory when the session succeeded.
    pub path: Option<PathBuf>,
}

impl Completion {
    pub fn succeeded(exit_code: i32, path: Option<PathBuf>) -> Self {
        Self {
            success: true,
            cancelled: false,
            exit_code: Some(exit_code),
            path,
        }
    }

    pub fn failed(exit_code: Option<i32>, path: Option<PathBuf>) -> Self {
        Self {
            success: false,
            cancelled: false,
            exit_code,
            path,
        }
    }

    pub fn cancelled(exit_code: Option<i32>) -> Self {
        Self {
            success: false,
            cancelled: true,
            exit_code,
            path: None,
        }
    }
}

impl DownloadEvent {
    /// True for the event that terminates a session's stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadEvent::Completed(_))
    }
}
