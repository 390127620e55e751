// src/parse.rs

//! Pure line classification for downloader output.
//!
//! The supervised tool prints unstructured text; these functions pull
//! structured facts out of single lines. Both are stateless and tolerant:
//! a line matching nothing yields `None`, and one line may yield both a
//! progress fact and a destination fact.
//!
//! Patterns are ordered by priority; the first matching pattern wins.

use std::sync::LazyLock;

use regex::Regex;

/// A line containing this literal reports 100, whatever else it says.
const COMPLETION_MARKER: &str = "[download] 100%";

static PROGRESS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // The tool's own progress lines: "[download]  42.7% of ...".
        r"\[download\]\s+(\d+\.?\d*)%",
        // A bare percentage anywhere on the line.
        r"(\d+\.?\d*)%",
        // Loose fallback: a [download] line with an integer percent later on.
        r"\[download\].*?(\d+)%",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("progress pattern must compile"))
    .collect()
});

static DESTINATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "[download] Destination: path/to/file.mp4"
        r"\[download\]\s+Destination:\s+(.+)",
        // "[ExtractAudio] Destination: path/to/file.mp3"
        r"\[ExtractAudio\]\s+Destination:\s+(.+)",
        // "[FixupM4a] path/to/file.m4a" and friends
        r"\[Fixup\w*\]\s+(.+)",
        // "... has already been downloaded" variants print this form
        r"Already downloaded:\s+(.+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("destination pattern must compile"))
    .collect()
});

/// Extract a progress percentage from one output line.
///
/// The completion marker dominates: a line containing `[download] 100%`
/// yields 100 even when an earlier fragment of the line carries a different
/// percentage. Otherwise the ordered patterns are tried and the first
/// numeric capture is returned.
pub fn parse_progress(line: &str) -> Option<f64> {
    if line.contains(COMPLETION_MARKER) {
        return Some(100.0);
    }
    for pattern in PROGRESS_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(line) {
            if let Ok(percent) = caps[1].parse::<f64>() {
                return Some(percent);
            }
        }
    }
    None
}

/// Extract an output-file path announcement from one line.
///
/// Recognizes download and audio-extraction destinations, post-processing
/// fixup notices, and "already downloaded" notices, in that order. The
/// captured path is whitespace-trimmed; an empty capture counts as no match.
pub fn parse_destination(line: &str) -> Option<String> {
    for pattern in DESTINATION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(line) {
            let path = caps[1].trim();
            if !path.is_empty() {
                return Some(path.to_string());
            }
        }
    }
    None
}
