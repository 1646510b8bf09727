//! Media duration probing seam.
//!
//! The scheduler records the length of a finished result video. Tests
//! substitute a stub so they never shell out to `ffprobe`.

use std::path::Path;

use async_trait::async_trait;
use mirage_core::ffmpeg::{self, FfmpegError};

/// Measures the duration of a local media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn duration_secs(&self, path: &Path) -> Result<f64, FfmpegError>;
}

/// Production probe backed by the `ffprobe` binary.
pub struct FfprobeDurationProbe;

#[async_trait]
impl MediaProbe for FfprobeDurationProbe {
    async fn duration_secs(&self, path: &Path) -> Result<f64, FfmpegError> {
        ffmpeg::media_duration_secs(path).await
    }
}
