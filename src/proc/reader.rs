// src/proc/reader.rs

//! Merged, permissively-decoded line stream over the child's output pipes.
//!
//! One reader task per pipe feeds a single unbounded channel, so the
//! receiver sees stdout and stderr lines interleaved in arrival order. The
//! channel is the lazy, single-pass line sequence the session loop pulls
//! from; it closes when both pipes do.

use std::borrow::Cow;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Merge both pipes into one line channel.
///
/// Pipes the caller already took (or that were never captured) are simply
/// absent from the merge; with neither pipe the stream is closed from the
/// start.
pub fn merged_lines(
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    if let Some(pipe) = stdout {
        spawn_line_reader(pipe, tx.clone(), "stdout");
    }
    if let Some(pipe) = stderr {
        spawn_line_reader(pipe, tx, "stderr");
    }
    rx
}

fn spawn_line_reader<R>(pipe: R, tx: mpsc::UnboundedSender<String>, stream: &'static str)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    for line in decode_lines(&buf) {
                        if tx.send(line).is_err() {
                            // Receiver gone; no point draining further.
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(stream, error = %e, "output pipe read failed, ending stream");
                    break;
                }
            }
        }
        debug!(stream, "output stream closed");
    });
}

/// Decode one newline-terminated chunk permissively.
///
/// Invalid byte sequences are substituted, never fatal. Embedded carriage
/// returns split into their own lines: progress rewrites arrive as
/// `\r`-separated fragments when the tool is not in newline mode, and each
/// fragment carries its own facts.
fn decode_lines(buf: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(buf);
    if matches!(text, Cow::Owned(_)) {
        debug!("substituted invalid utf-8 bytes in tool output");
    }
    text.split('\r')
        .map(|piece| piece.trim_end_matches('\n').to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}
