//! Job pipeline: the synthesis controller and its polling scheduler.
//!
//! [`controller::SynthesisController`] drives a single job through the
//! remote speech and video services; [`poller::PollingScheduler`] is the
//! perpetual single-slot loop that promotes queued jobs and tracks the
//! one in-flight job until it reaches a terminal status.

pub mod controller;
pub mod poller;
pub mod probe;

use mirage_core::ffmpeg::FfmpegError;
use mirage_db::models::JobStatus;
use mirage_db::store::StoreError;
use mirage_filesync::SyncError;
use mirage_synth::SynthApiError;

/// Errors from the controller and scheduler layer.
///
/// Inside [`controller::SynthesisController::synthesize`] these are
/// converted into a `failed` job status; inside a polling cycle they are
/// logged and the next cycle runs regardless.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error(transparent)]
    Api(#[from] SynthApiError),

    #[error(transparent)]
    Probe(#[from] FfmpegError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A job was asked to queue from a status other than draft.
    #[error("job cannot be queued from status {from:?}")]
    InvalidTransition { from: JobStatus },

    /// Neither the job nor its model names a voice to synthesize with.
    #[error("no voice configured for job or model")]
    MissingVoice,
}
