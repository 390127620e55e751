use std::path::PathBuf;

use dlpilot::command::{DownloadOptions, DownloadRequest, is_playlist_url};
use dlpilot::errors::DlpilotError;

fn request(url: &str, audio: bool, quality: Option<&str>, format: Option<&str>) -> DownloadRequest {
    DownloadRequest {
        tool: PathBuf::from("yt-dlp"),
        url: url.to_string(),
        dest: PathBuf::from("/tmp/media"),
        options: DownloadOptions::from_choices(audio, quality, format).unwrap(),
    }
}

const VIDEO_URL: &str = "https://example.com/watch?v=abc123";

/// Auto quality emits no selector; the argv is template, progress flags,
/// then the URL last.
#[test]
fn test_video_auto_minimal_args() {
    let spec = request(VIDEO_URL, false, None, None).build();
    assert_eq!(
        spec.args,
        vec![
            "-o",
            "/tmp/media/%(title)s [%(id)s].%(ext)s",
            "--newline",
            "--progress",
            VIDEO_URL,
        ]
    );
    assert_eq!(spec.target_dir, PathBuf::from("/tmp/media"));
}

/// Height-capped qualities produce the combined video+audio selector.
#[test]
fn test_video_quality_selectors() {
    let spec = request(VIDEO_URL, false, Some("1080p"), None).build();
    assert_eq!(spec.args[0], "-f");
    assert_eq!(
        spec.args[1],
        "bestvideo[height<=1080]+bestaudio/best[height<=1080]"
    );

    let spec = request(VIDEO_URL, false, Some("360"), None).build();
    assert_eq!(
        spec.args[1],
        "bestvideo[height<=360]+bestaudio/best[height<=360]"
    );

    let spec = request(VIDEO_URL, false, Some("video-only"), None).build();
    assert_eq!(spec.args[1], "bestvideo");
}

#[test]
fn test_video_format_flag() {
    let spec = request(VIDEO_URL, false, Some("best"), Some("mkv")).build();
    assert_eq!(spec.args[0..4], ["-f", "best", "--merge-output-format", "mkv"]);
}

/// Audio mode always carries a quality level and the extract flag; the
/// codec flag only appears when a format was chosen.
#[test]
fn test_audio_args() {
    let spec = request(VIDEO_URL, true, Some("192k"), Some("mp3")).build();
    assert_eq!(
        spec.args[0..5],
        ["--audio-quality", "3", "--extract-audio", "--audio-format", "mp3"]
    );

    let spec = request(VIDEO_URL, true, None, None).build();
    assert_eq!(spec.args[0..3], ["--audio-quality", "0", "--extract-audio"]);
}

#[test]
fn test_url_is_last() {
    let spec = request(VIDEO_URL, true, Some("320k"), Some("opus")).build();
    assert_eq!(spec.args.last().map(String::as_str), Some(VIDEO_URL));
}

/// Single-item downloads get --no-playlist when the URL smells like a
/// playlist.
#[test]
fn test_playlist_urls_get_no_playlist_flag() {
    let spec = request(
        "https://youtube.com/watch?v=abc&list=PL123",
        false,
        None,
        None,
    )
    .build();
    assert!(spec.args.iter().any(|a| a == "--no-playlist"));

    let spec = request(VIDEO_URL, false, None, None).build();
    assert!(!spec.args.iter().any(|a| a == "--no-playlist"));
}

#[test]
fn test_is_playlist_url() {
    assert!(is_playlist_url("https://youtube.com/watch?v=a&list=PL1"));
    assert!(is_playlist_url("https://music.youtube.com/browse?list=OL2"));
    assert!(is_playlist_url("https://bilibili.com/video/a?plist=3"));
    assert!(is_playlist_url("https://example.com/My-Playlist/42"));
    assert!(is_playlist_url("https://example.com/band/album=9"));
    assert!(!is_playlist_url("https://youtube.com/watch?v=abc123"));
    assert!(!is_playlist_url("https://example.com/clip.mp4"));
}

/// Unknown choice strings are rejected with a configuration error that
/// names the valid values.
#[test]
fn test_from_choices_rejects_unknown() {
    let err = DownloadOptions::from_choices(false, Some("4k"), None).unwrap_err();
    assert!(matches!(err, DlpilotError::ConfigError(ref msg) if msg.contains("video quality")));

    let err = DownloadOptions::from_choices(true, None, Some("ogg")).unwrap_err();
    assert!(matches!(err, DlpilotError::ConfigError(ref msg) if msg.contains("audio format")));
}

/// Choice strings are case-insensitive and tolerate stray whitespace.
#[test]
fn test_choice_parsing_is_lenient() {
    let options = DownloadOptions::from_choices(false, Some(" 720P "), Some("MP4")).unwrap();
    assert_eq!(
        options,
        DownloadOptions::from_choices(false, Some("720p"), Some("mp4")).unwrap()
    );
}

#[test]
fn test_display_line() {
    let spec = request(VIDEO_URL, false, Some("best"), None).build();
    let line = spec.display_line();
    assert!(line.starts_with("yt-dlp "));
    assert!(line.ends_with(VIDEO_URL));
}
