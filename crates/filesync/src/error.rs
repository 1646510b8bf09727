use std::path::PathBuf;

/// Failures surfaced by the file-sync layer.
///
/// These are structured results, not panics: callers degrade gracefully
/// (skip a redundant re-download) or escalate (fail an export) per call
/// site.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The upload source is absent locally; no network contact was made.
    #[error("local file missing: {0}")]
    LocalFileMissing(PathBuf),

    /// The local filesystem failed while preparing or writing a download
    /// destination. Distinct from a remote miss so callers who tolerate
    /// an absent remote file still see a disk problem.
    #[error("local io error at {path}: {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Network or HTTP failure during upload or download. Never retried
    /// automatically.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The file server answered with `success: false`.
    #[error("file server rejected the request: {0}")]
    Rejected(String),

    /// Every download path variant was tried and none resolved.
    #[error("remote file not found: {path} (last error: {last_error})")]
    RemoteFileNotFound { path: String, last_error: String },
}
