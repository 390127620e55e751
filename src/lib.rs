// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod events;
pub mod locate;
pub mod logging;
pub mod parse;
pub mod proc;
pub mod session;

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::CliArgs;
use crate::command::{DownloadOptions, DownloadRequest};
use crate::config::FileConfig;
use crate::errors::DlpilotError;
use crate::events::{Completion, DownloadEvent};
use crate::session::Downloader;

/// Process exit code reported for a user-cancelled download.
pub const EXIT_CANCELLED: i32 = 130;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - tool discovery and command construction
/// - the download session and its event stream
/// - Ctrl-C handling
///
/// Returns the process exit code.
pub async fn run(args: CliArgs) -> Result<i32> {
    let defaults = config::load_optional(args.config.as_deref().map(Path::new))?;
    let request = build_request(&args, &defaults).await?;
    let spec = request.build();

    if args.dry_run {
        print_dry_run(&spec);
        return Ok(0);
    }

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<DownloadEvent>();
    let mut downloader = Downloader::new(events_tx);
    downloader.start(spec)?;

    // Ctrl-C → stop request. The listener loops, so a second Ctrl-C while
    // terminating is a harmless duplicate rather than a hard abort.
    let (interrupt_tx, mut interrupt_rx) = mpsc::channel::<()>(1);
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            if interrupt_tx.send(()).await.is_err() {
                return;
            }
        }
    });

    loop {
        tokio::select! {
            maybe_hint = interrupt_rx.recv() => match maybe_hint {
                Some(()) => {
                    info!("interrupt received, stopping download");
                    downloader.request_stop();
                }
                None => break,
            },
            maybe_event = events_rx.recv() => match maybe_event {
                Some(event) => {
                    if let Some(code) = handle_event(event) {
                        return Ok(code);
                    }
                }
                None => return Ok(missing_completion()),
            },
        }
    }

    // Interrupt listener died; keep draining events to completion.
    while let Some(event) = events_rx.recv().await {
        if let Some(code) = handle_event(event) {
            return Ok(code);
        }
    }
    Ok(missing_completion())
}

/// Resolve CLI flags against config defaults into one download request.
async fn build_request(args: &CliArgs, defaults: &FileConfig) -> Result<DownloadRequest> {
    if !args.url.starts_with("http") {
        return Err(DlpilotError::ConfigError(format!(
            "'{}' does not look like a URL (expected http:// or https://)",
            args.url
        ))
        .into());
    }

    let tool = match args
        .tool
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| defaults.tool.clone())
    {
        Some(tool) => tool,
        None => locate::locate_tool().await?,
    };

    let dest = args
        .dest
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| defaults.dest.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let audio = args.audio || defaults.audio;
    let quality = args.quality.as_deref().or(defaults.quality.as_deref());
    let format = args.format.as_deref().or(defaults.format.as_deref());
    let options = DownloadOptions::from_choices(audio, quality, format)?;

    Ok(DownloadRequest {
        tool,
        url: args.url.clone(),
        dest,
        options,
    })
}

/// Render one event; returns the exit code once the completion arrives.
fn handle_event(event: DownloadEvent) -> Option<i32> {
    match event {
        DownloadEvent::Log(line) => {
            println!("{line}");
            None
        }
        DownloadEvent::Progress { percent, status } => {
            // Raw tool lines already show progress; the parsed fact is only
            // interesting when debugging the parser.
            debug!(percent, "{status}");
            None
        }
        DownloadEvent::Error(message) => {
            error!("{message}");
            None
        }
        DownloadEvent::Completed(completion) => Some(print_completion(&completion)),
    }
}

fn print_completion(completion: &Completion) -> i32 {
    if completion.cancelled {
        println!("Stopped.");
        EXIT_CANCELLED
    } else if completion.success {
        match &completion.path {
            Some(path) => println!("Done: {}", path.display()),
            None => println!("Done."),
        }
        0
    } else {
        match completion.exit_code {
            Some(code) => eprintln!("Failed: tool exited with status {code}"),
            None => eprintln!("Failed: tool was killed before finishing"),
        }
        1
    }
}

fn missing_completion() -> i32 {
    error!("event stream closed without a completion");
    1
}

/// Simple dry-run output: print the resolved invocation.
fn print_dry_run(spec: &command::CommandSpec) {
    println!("dlpilot dry-run");
    println!("  command: {}", spec.display_line());
    println!("  target directory: {}", spec.target_dir.display());
    debug!("dry-run complete (no execution)");
}
