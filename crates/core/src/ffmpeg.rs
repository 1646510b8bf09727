//! FFprobe-based media inspection.
//!
//! The scheduler needs the duration of a finished synthesis result; the
//! desktop app reads it back from the job record. Everything here shells
//! out to `ffprobe` and parses its JSON output.

use std::path::Path;

use serde::Deserialize;

/// Error type for ffprobe operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("media file not found: {0}")]
    MediaNotFound(String),
}

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

/// A single stream from ffprobe output.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub duration: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

/// Run `ffprobe` on a media file and return the parsed JSON output.
pub async fn probe_media(path: &Path) -> Result<FfprobeOutput, FfmpegError> {
    if !path.exists() {
        return Err(FfmpegError::MediaNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| FfmpegError::ParseError(format!("{e}: {stdout}")))
}

/// Probe a media file and return its duration in seconds.
pub async fn media_duration_secs(path: &Path) -> Result<f64, FfmpegError> {
    let probe = probe_media(path).await?;
    Ok(parse_duration(&probe))
}

/// Parse the media duration in seconds from ffprobe output.
///
/// Format-level duration wins; the first video (then audio) stream's
/// duration is the fallback. Unparseable output yields `0.0`.
pub fn parse_duration(probe: &FfprobeOutput) -> f64 {
    if let Some(d) = &probe.format.duration {
        if let Ok(secs) = d.parse::<f64>() {
            return secs;
        }
    }
    for codec_type in ["video", "audio"] {
        let stream = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type));
        if let Some(d) = stream.and_then(|s| s.duration.as_ref()) {
            if let Ok(secs) = d.parse::<f64>() {
                return secs;
            }
        }
    }
    0.0
}
