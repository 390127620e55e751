#![cfg(unix)]

mod common;

use std::error::Error;
use std::path::Path;
use std::time::Duration;

use dlpilot::errors::DlpilotError;
use dlpilot::events::DownloadEvent;
use dlpilot::session::Downloader;
use dlpilot_test_utils::builders::SpecBuilder;
use dlpilot_test_utils::fake_tool::FakeToolScript;
use dlpilot_test_utils::{drain_until_completed, with_timeout};
use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::common::{expect_completion, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

/// The full happy path: progress lines, a destination announcement, the
/// completion marker, then exit 0. Events arrive in read order and the
/// completion is last.
#[tokio::test]
async fn test_happy_path_event_sequence() -> TestResult {
    init_tracing();
    let tool_dir = tempdir()?;
    let target = tempdir()?;
    let script = FakeToolScript::new()
        .line("[download] 10.0% of 5.00MiB")
        .line("[download] Destination: out.mp4")
        .line("[download] 100% of 5.00MiB in 00:03")
        .write_to(tool_dir.path())?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx);
    downloader.start(SpecBuilder::new(&script).target_dir(target.path()).build())?;
    assert!(downloader.is_active());

    let events = with_timeout(drain_until_completed(&mut rx)).await;
    assert_eq!(events.len(), 6, "unexpected events: {events:?}");

    assert!(matches!(&events[0], DownloadEvent::Log(l) if l == "[download] 10.0% of 5.00MiB"));
    assert!(matches!(&events[1], DownloadEvent::Progress { percent, .. } if *percent == 10.0));
    assert!(matches!(&events[2], DownloadEvent::Log(l) if l == "[download] Destination: out.mp4"));
    assert!(matches!(&events[3], DownloadEvent::Log(l) if l.starts_with("[download] 100%")));
    assert!(matches!(&events[4], DownloadEvent::Progress { percent, .. } if *percent == 100.0));

    let completion = expect_completion(events.last());
    assert!(completion.success);
    assert!(!completion.cancelled);
    assert_eq!(completion.exit_code, Some(0));
    assert_eq!(completion.path.as_deref(), Some(Path::new("out.mp4")));

    assert!(!downloader.is_active());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    Ok(())
}

/// A nonzero exit is a failure completion, not an error; nothing follows it.
#[tokio::test]
async fn test_failure_exit_code() -> TestResult {
    init_tracing();
    let tool_dir = tempdir()?;
    let target = tempdir()?;
    let script = FakeToolScript::new()
        .line("ERROR: unable to download video data")
        .exit_code(1)
        .write_to(tool_dir.path())?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx);
    downloader.start(SpecBuilder::new(&script).target_dir(target.path()).build())?;

    let events = with_timeout(drain_until_completed(&mut rx)).await;
    assert_eq!(events.len(), 2, "unexpected events: {events:?}");

    let completion = expect_completion(events.last());
    assert!(!completion.success);
    assert!(!completion.cancelled);
    assert_eq!(completion.exit_code, Some(1));
    assert!(completion.path.is_none());

    assert!(!downloader.is_active());
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    Ok(())
}

/// `start` rejects a second session while one is active, without touching
/// the running one.
#[tokio::test]
async fn test_second_start_rejected_while_active() -> TestResult {
    init_tracing();
    let tool_dir = tempdir()?;
    let target = tempdir()?;
    let script = FakeToolScript::new().sleep_secs(30).write_to(tool_dir.path())?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx).grace_period(Duration::from_millis(200));
    downloader.start(SpecBuilder::new(&script).target_dir(target.path()).build())?;

    let second = downloader.start(SpecBuilder::new(&script).target_dir(target.path()).build());
    assert!(matches!(second, Err(DlpilotError::SessionActive)));
    assert!(downloader.is_active());

    downloader.request_stop();
    let events = with_timeout(drain_until_completed(&mut rx)).await;
    let completion = expect_completion(events.last());
    assert!(completion.cancelled);
    assert!(!downloader.is_active());
    Ok(())
}

/// Invalid bytes in tool output are substituted and logged; the stream
/// keeps going afterwards.
#[tokio::test]
async fn test_invalid_utf8_output_survives() -> TestResult {
    init_tracing();
    let tool_dir = tempdir()?;
    let target = tempdir()?;
    let script = FakeToolScript::new()
        .raw_line(b"\xff\xfe mangled")
        .line("[download] 50.0% of 1.00MiB")
        .write_to(tool_dir.path())?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx);
    downloader.start(SpecBuilder::new(&script).target_dir(target.path()).build())?;

    let events = with_timeout(drain_until_completed(&mut rx)).await;
    assert_eq!(events.len(), 4, "unexpected events: {events:?}");

    assert!(
        matches!(&events[0], DownloadEvent::Log(l) if l.contains('\u{FFFD}') && l.contains("mangled"))
    );
    assert!(matches!(&events[2], DownloadEvent::Progress { percent, .. } if *percent == 50.0));
    assert!(expect_completion(events.last()).success);
    Ok(())
}

/// A spawn failure is returned, posted once as an error event, and leaves
/// no session behind.
#[tokio::test]
async fn test_spawn_failure_posts_error() -> TestResult {
    init_tracing();
    let target = tempdir()?;
    let missing = target.path().join("no-such-tool");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx);
    let result = downloader.start(SpecBuilder::new(&missing).target_dir(target.path()).build());

    assert!(matches!(result, Err(DlpilotError::SpawnError { .. })));
    assert!(!downloader.is_active());

    match rx.try_recv() {
        Ok(DownloadEvent::Error(message)) => assert!(message.contains("Failed to spawn")),
        other => panic!("expected an error event, got {other:?}"),
    }
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    Ok(())
}

/// A target directory that cannot be created fails before any process
/// exists: the error is returned, posted once, and no session is left.
#[tokio::test]
async fn test_target_dir_failure_posts_error() -> TestResult {
    init_tracing();
    let target = tempdir()?;
    let blocker = target.path().join("occupied");
    std::fs::write(&blocker, "not a directory")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx);
    let result = downloader.start(
        SpecBuilder::new("/bin/true")
            .target_dir(blocker.join("downloads"))
            .build(),
    );

    assert!(matches!(result, Err(DlpilotError::TargetDirError { .. })));
    assert!(!downloader.is_active());

    match rx.try_recv() {
        Ok(DownloadEvent::Error(message)) => {
            assert!(message.contains("Cannot create target directory"))
        }
        other => panic!("expected an error event, got {other:?}"),
    }
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    Ok(())
}

/// An "already downloaded" notice still resolves the output path.
#[tokio::test]
async fn test_already_downloaded_resolves_path() -> TestResult {
    init_tracing();
    let tool_dir = tempdir()?;
    let target = tempdir()?;
    let script = FakeToolScript::new()
        .line("Already downloaded: video.mp4")
        .write_to(tool_dir.path())?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx);
    downloader.start(SpecBuilder::new(&script).target_dir(target.path()).build())?;

    let events = with_timeout(drain_until_completed(&mut rx)).await;
    let completion = expect_completion(events.last());
    assert!(completion.success);
    assert_eq!(completion.path.as_deref(), Some(Path::new("video.mp4")));
    Ok(())
}

/// With no destination announced, a successful session falls back to the
/// newest file in the target directory.
#[tokio::test]
async fn test_newest_file_fallback() -> TestResult {
    init_tracing();
    let tool_dir = tempdir()?;
    let target = tempdir()?;
    let script = FakeToolScript::new()
        .touch("older.webm")
        .sleep_millis(100)
        .touch("newer.webm")
        .line("post-processing complete")
        .write_to(tool_dir.path())?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut downloader = Downloader::new(tx);
    downloader.start(SpecBuilder::new(&script).target_dir(target.path()).build())?;

    let events = with_timeout(drain_until_completed(&mut rx)).await;
    let completion = expect_completion(events.last());
    assert!(completion.success);
    assert_eq!(completion.path, Some(target.path().join("newer.webm")));
    Ok(())
}
