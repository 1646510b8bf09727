//! The perpetual single-slot polling loop.
//!
//! One cycle runs at a time, on a fixed cadence. Each cycle does exactly
//! one of: track the current `pending` job's remote status, promote the
//! oldest `waiting` job into synthesis, or nothing. A cycle that errors
//! is logged and the next cycle still runs; a job whose result download
//! fails stays `pending` and is retried when the remote reports complete
//! again.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mirage_core::path::StoragePath;
use mirage_db::models::{Job, JobPatch, JobStatus};
use mirage_db::store::RecordStore;
use mirage_filesync::FileTransfer;
use mirage_synth::video::{StatusOutcome, VideoSynthesis};
use tokio_util::sync::CancellationToken;

use crate::controller::SynthesisController;
use crate::probe::MediaProbe;
use crate::SchedulerError;

// ---------------------------------------------------------------------------
// PollingScheduler
// ---------------------------------------------------------------------------

/// Background service advancing the job queue on a fixed cadence.
pub struct PollingScheduler {
    store: Arc<dyn RecordStore>,
    controller: Arc<SynthesisController>,
    video_api: Arc<dyn VideoSynthesis>,
    video_files: Arc<dyn FileTransfer>,
    probe: Arc<dyn MediaProbe>,
    work_dir: PathBuf,
    poll_interval: Duration,
}

impl PollingScheduler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        controller: Arc<SynthesisController>,
        video_api: Arc<dyn VideoSynthesis>,
        video_files: Arc<dyn FileTransfer>,
        probe: Arc<dyn MediaProbe>,
        work_dir: PathBuf,
        poll_interval: Duration,
    ) -> Self {
        Self {
            store,
            controller,
            video_api,
            video_files,
            probe,
            work_dir,
            poll_interval,
        }
    }

    /// Run the polling loop until the token is cancelled.
    ///
    /// Cycles never overlap: the next tick is consumed only after the
    /// previous cycle finishes, so at most one remote status query is in
    /// flight at any time.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("polling scheduler cancelled");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        tracing::warn!(error = %e, "polling cycle failed");
                    }
                }
            }
        }
    }

    /// One polling cycle.
    ///
    /// The `pending` check is the single-slot gate: a waiting job is only
    /// promoted when no job currently holds the slot.
    pub async fn run_cycle(&self) -> Result<(), SchedulerError> {
        if let Some(pending) = self.store.first_job_with_status(JobStatus::Pending).await? {
            return self.track_pending(&pending).await;
        }

        if let Some(waiting) = self.store.first_job_with_status(JobStatus::Waiting).await? {
            tracing::info!(job_id = waiting.id, "promoting waiting job");
            return self.controller.synthesize(waiting.id).await;
        }

        Ok(())
    }

    /// Query remote status for the in-flight job and apply the outcome.
    async fn track_pending(&self, job: &Job) -> Result<(), SchedulerError> {
        let Some(code) = job.remote_code.as_deref() else {
            // Unrecoverable bookkeeping hole: a pending job with no code
            // can never be correlated with the remote again.
            self.store
                .update_job_status(
                    job.id,
                    JobStatus::Failed,
                    "pending job has no remote code",
                    None,
                )
                .await?;
            return Ok(());
        };

        match self.video_api.query_status(code).await? {
            StatusOutcome::Processing { progress, message } => {
                self.store
                    .update_job_status(job.id, JobStatus::Pending, &message, progress.as_deref())
                    .await?;
            }
            StatusOutcome::Completed { result, message } => {
                self.finish_job(job, &result, &message).await?;
            }
            StatusOutcome::Failed { message } => {
                self.store
                    .update_job_status(job.id, JobStatus::Failed, &message, None)
                    .await?;
                tracing::warn!(job_id = job.id, "remote reported synthesis failure");
            }
            StatusOutcome::Rejected { code, message } => {
                let message = if message.is_empty() {
                    format!("remote terminated job (code {code})")
                } else {
                    message
                };
                self.store
                    .update_job_status(job.id, JobStatus::Failed, &message, None)
                    .await?;
                tracing::warn!(job_id = job.id, code, "remote terminated synthesis job");
            }
        }
        Ok(())
    }

    /// Download the finished result, measure it, and mark the job done.
    ///
    /// Errors here propagate: the job stays `pending` and the download is
    /// retried next cycle, since the remote keeps reporting complete.
    async fn finish_job(&self, job: &Job, result: &str, message: &str) -> Result<(), SchedulerError> {
        let result_path = StoragePath::parse(result);
        let local = self.work_dir.join(result_path.basename());
        self.video_files.download(&result_path, &local).await?;

        let duration = self.probe.duration_secs(&local).await?;

        let patch = JobPatch {
            status: Some(JobStatus::Success),
            message: Some(message.to_string()),
            result_path: Some(Some(result_path)),
            duration_secs: Some(duration),
            ..Default::default()
        };
        self.store.update_job(job.id, &patch).await?;
        tracing::info!(job_id = job.id, duration_secs = duration, "synthesis complete");
        Ok(())
    }
}
