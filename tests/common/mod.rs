//! Helpers shared by the session-level integration tests.

use dlpilot::events::{Completion, DownloadEvent};

pub use dlpilot_test_utils::init_tracing;

/// Pull the completion out of a session's last event.
pub fn expect_completion(event: Option<&DownloadEvent>) -> &Completion {
    match event {
        Some(DownloadEvent::Completed(completion)) => completion,
        other => panic!("expected a completion event, got {other:?}"),
    }
}
