// src/command.rs

//! Building the tool invocation from user-chosen options.
//!
//! The supervisor core only sees the finished [`CommandSpec`]; everything
//! option-shaped lives here: the quality and format maps, playlist
//! detection, and the output template.

use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::{DlpilotError, Result};

/// A fully-built tool invocation: program, ordered args, target directory.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub target_dir: PathBuf,
}

impl CommandSpec {
    /// One-line rendering for logs and `--dry-run`.
    pub fn display_line(&self) -> String {
        format!("{} {}", self.program.display(), self.args.join(" "))
    }
}

/// One user download request, before argv assembly.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub tool: PathBuf,
    pub url: String,
    pub dest: PathBuf,
    pub options: DownloadOptions,
}

/// Mode-specific choices; each mode carries its own quality and format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOptions {
    Video {
        quality: VideoQuality,
        format: Option<VideoFormat>,
    },
    Audio {
        quality: AudioQuality,
        format: Option<AudioFormat>,
    },
}

impl DownloadOptions {
    /// Parse user-facing choice strings for the selected mode.
    pub fn from_choices(audio: bool, quality: Option<&str>, format: Option<&str>) -> Result<Self> {
        if audio {
            Ok(DownloadOptions::Audio {
                quality: match quality {
                    Some(q) => q.parse()?,
                    None => AudioQuality::default(),
                },
                format: format.map(|f| f.parse::<AudioFormat>()).transpose()?,
            })
        } else {
            Ok(DownloadOptions::Video {
                quality: match quality {
                    Some(q) => q.parse()?,
                    None => VideoQuality::default(),
                },
                format: format.map(|f| f.parse::<VideoFormat>()).transpose()?,
            })
        }
    }
}

impl DownloadRequest {
    /// Assemble the final argv in the tool's expected order: selector
    /// flags, playlist handling, output template, progress flags, URL last.
    pub fn build(&self) -> CommandSpec {
        let mut args: Vec<String> = Vec::new();

        match &self.options {
            DownloadOptions::Video { quality, format } => {
                if let Some(selector) = quality.selector() {
                    args.push("-f".to_string());
                    args.push(selector);
                }
                if let Some(format) = format {
                    args.push("--merge-output-format".to_string());
                    args.push(format.as_str().to_string());
                }
            }
            DownloadOptions::Audio { quality, format } => {
                args.push("--audio-quality".to_string());
                args.push(quality.level().to_string());
                args.push("--extract-audio".to_string());
                if let Some(format) = format {
                    args.push("--audio-format".to_string());
                    args.push(format.as_str().to_string());
                }
            }
        }

        if is_playlist_url(&self.url) {
            args.push("--no-playlist".to_string());
        }

        // Title plus video id keeps filenames unique and filesystem-safe.
        args.push("-o".to_string());
        args.push(
            self.dest
                .join("%(title)s [%(id)s].%(ext)s")
                .to_string_lossy()
                .into_owned(),
        );

        args.push("--newline".to_string());
        args.push("--progress".to_string());
        args.push(self.url.clone());

        CommandSpec {
            program: self.tool.clone(),
            args,
            target_dir: self.dest.clone(),
        }
    }
}

/// Heuristic: does this URL point at a playlist rather than a single item?
///
/// Single-item downloads pass `--no-playlist` so a video link that happens
/// to carry a playlist parameter still fetches one item.
pub fn is_playlist_url(url: &str) -> bool {
    if url.contains("youtube.com") && url.contains("list=") {
        return true;
    }
    if url.contains("bilibili.com") && url.contains("plist=") {
        return true;
    }
    let lower = url.to_lowercase();
    ["playlist", "list=", "album=", "page="]
        .iter()
        .any(|indicator| lower.contains(indicator))
}

/// Video quality choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoQuality {
    /// Let the tool pick; no `-f` selector is emitted.
    #[default]
    Auto,
    Best,
    H1080,
    H720,
    H480,
    H360,
    VideoOnly,
    AudioOnly,
}

impl VideoQuality {
    fn selector(self) -> Option<String> {
        match self {
            VideoQuality::Auto => None,
            VideoQuality::Best => Some("best".to_string()),
            VideoQuality::H1080 => Some(height_capped(1080)),
            VideoQuality::H720 => Some(height_capped(720)),
            VideoQuality::H480 => Some(height_capped(480)),
            VideoQuality::H360 => Some(height_capped(360)),
            VideoQuality::VideoOnly => Some("bestvideo".to_string()),
            VideoQuality::AudioOnly => Some("bestaudio".to_string()),
        }
    }
}

fn height_capped(height: u32) -> String {
    format!("bestvideo[height<={height}]+bestaudio/best[height<={height}]")
}

impl FromStr for VideoQuality {
    type Err = DlpilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(VideoQuality::Auto),
            "best" => Ok(VideoQuality::Best),
            "1080p" | "1080" => Ok(VideoQuality::H1080),
            "720p" | "720" => Ok(VideoQuality::H720),
            "480p" | "480" => Ok(VideoQuality::H480),
            "360p" | "360" => Ok(VideoQuality::H360),
            "video-only" => Ok(VideoQuality::VideoOnly),
            "audio-only" => Ok(VideoQuality::AudioOnly),
            other => Err(DlpilotError::ConfigError(format!(
                "unknown video quality '{other}' (expected auto, best, 1080p, 720p, \
                 480p, 360p, video-only, audio-only)"
            ))),
        }
    }
}

/// Audio bitrate choices, mapped onto the tool's 0..10 VBR quality scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioQuality {
    /// Best available; what `320k` maps to as well.
    #[default]
    Best,
    K320,
    K256,
    K192,
    K128,
    K96,
}

impl AudioQuality {
    fn level(self) -> &'static str {
        match self {
            AudioQuality::Best | AudioQuality::K320 => "0",
            AudioQuality::K256 => "2",
            AudioQuality::K192 => "3",
            AudioQuality::K128 => "5",
            AudioQuality::K96 => "7",
        }
    }
}

impl FromStr for AudioQuality {
    type Err = DlpilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "best" | "auto" => Ok(AudioQuality::Best),
            "320k" | "320" => Ok(AudioQuality::K320),
            "256k" | "256" => Ok(AudioQuality::K256),
            "192k" | "192" => Ok(AudioQuality::K192),
            "128k" | "128" => Ok(AudioQuality::K128),
            "96k" | "96" => Ok(AudioQuality::K96),
            other => Err(DlpilotError::ConfigError(format!(
                "unknown audio quality '{other}' (expected best, 320k, 256k, 192k, \
                 128k, 96k)"
            ))),
        }
    }
}

/// Container formats for video downloads (`--merge-output-format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Webm,
    Mkv,
    Mov,
    Avi,
}

impl VideoFormat {
    fn as_str(self) -> &'static str {
        match self {
            VideoFormat::Mp4 => "mp4",
            VideoFormat::Webm => "webm",
            VideoFormat::Mkv => "mkv",
            VideoFormat::Mov => "mov",
            VideoFormat::Avi => "avi",
        }
    }
}

impl FromStr for VideoFormat {
    type Err = DlpilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mp4" => Ok(VideoFormat::Mp4),
            "webm" => Ok(VideoFormat::Webm),
            "mkv" => Ok(VideoFormat::Mkv),
            "mov" => Ok(VideoFormat::Mov),
            "avi" => Ok(VideoFormat::Avi),
            other => Err(DlpilotError::ConfigError(format!(
                "unknown video format '{other}' (expected mp4, webm, mkv, mov, avi)"
            ))),
        }
    }
}

/// Codec targets for audio extraction (`--audio-format`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    M4a,
    Wav,
    Flac,
    Opus,
}

impl AudioFormat {
    fn as_str(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Wav => "wav",
            AudioFormat::Flac => "flac",
            AudioFormat::Opus => "opus",
        }
    }
}

impl FromStr for AudioFormat {
    type Err = DlpilotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mp3" => Ok(AudioFormat::Mp3),
            "m4a" => Ok(AudioFormat::M4a),
            "wav" => Ok(AudioFormat::Wav),
            "flac" => Ok(AudioFormat::Flac),
            "opus" => Ok(AudioFormat::Opus),
            other => Err(DlpilotError::ConfigError(format!(
                "unknown audio format '{other}' (expected mp3, m4a, wav, flac, opus)"
            ))),
        }
    }
}
