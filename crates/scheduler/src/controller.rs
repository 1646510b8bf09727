//! Drives a single job through remote speech and video synthesis.

use std::sync::Arc;

use mirage_core::config::ServiceConfig;
use mirage_core::path::StoragePath;
use mirage_core::types::DbId;
use mirage_db::models::{Job, JobPatch, JobStatus, Model, Voice};
use mirage_db::store::{RecordStore, StoreError};
use mirage_filesync::FileTransfer;
use mirage_synth::speech::{SpeechRequest, SpeechSynthesis};
use mirage_synth::video::{SubmitOutcome, SubmitRequest, VideoSynthesis};

use crate::SchedulerError;

/// Fixed assets substituted for live paths in development mode, so the
/// pipeline can be exercised without a trained model or a GPU box.
const DEV_AUDIO_PATH: &str = "temp/example.wav";
const DEV_VIDEO_PATH: &str = "temp/example.mp4";

/// Category bucket generated speech lands in on the speech file server.
const AUDIO_CATEGORY: &str = "audio";

// ---------------------------------------------------------------------------
// SynthesisController
// ---------------------------------------------------------------------------

/// Submits jobs to the remote synthesis services.
///
/// [`synthesize`](Self::synthesize) never leaves a job without a
/// pending-or-terminal status: every error past the initial job lookup is
/// converted into a `failed` status update carrying the error's message.
pub struct SynthesisController {
    store: Arc<dyn RecordStore>,
    speech_api: Arc<dyn SpeechSynthesis>,
    video_api: Arc<dyn VideoSynthesis>,
    speech_files: Arc<dyn FileTransfer>,
    config: ServiceConfig,
}

impl SynthesisController {
    pub fn new(
        store: Arc<dyn RecordStore>,
        speech_api: Arc<dyn SpeechSynthesis>,
        video_api: Arc<dyn VideoSynthesis>,
        speech_files: Arc<dyn FileTransfer>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            speech_api,
            video_api,
            speech_files,
            config,
        }
    }

    /// Queue a draft job for the scheduler: `draft` -> `waiting`.
    pub async fn submit(&self, job_id: DbId) -> Result<(), SchedulerError> {
        let job = self.require_job(job_id).await?;
        if job.status != JobStatus::Draft {
            return Err(SchedulerError::InvalidTransition { from: job.status });
        }
        self.store
            .update_job_status(job_id, JobStatus::Waiting, "queued", None)
            .await?;
        tracing::info!(job_id, "job queued for synthesis");
        Ok(())
    }

    /// Run the full submission flow for one job.
    ///
    /// On return the job is `pending` (remote accepted, code recorded) or
    /// `failed` (anything else). Only a missing job record propagates as
    /// an error, since there is no row to carry a failed status.
    pub async fn synthesize(&self, job_id: DbId) -> Result<(), SchedulerError> {
        let job = self.require_job(job_id).await?;

        if let Err(e) = self.run_submission(&job).await {
            tracing::warn!(job_id, error = %e, "synthesis submission failed");
            self.store
                .update_job_status(job_id, JobStatus::Failed, &e.to_string(), None)
                .await?;
        }
        Ok(())
    }

    async fn run_submission(&self, job: &Job) -> Result<(), SchedulerError> {
        // Take the pending slot and drop any stale result before touching
        // the network.
        let claim = JobPatch {
            status: Some(JobStatus::Pending),
            message: Some("submitting".to_string()),
            result_path: Some(None),
            ..Default::default()
        };
        self.store.update_job(job.id, &claim).await?;

        let model = self.require_model(job.model_id).await?;

        let (audio, generated) = self.resolve_audio(job, &model).await?;
        let video = if self.config.dev_mode {
            StoragePath::parse(DEV_VIDEO_PATH)
        } else {
            model.video_path.clone()
        };

        let code = uuid::Uuid::new_v4().to_string();
        let request = SubmitRequest::new(
            code.clone(),
            download_url(&self.config.speech_file_server_url, &audio),
            download_url(&self.config.video_file_server_url, &video),
        );

        let outcome = self.video_api.submit(&request).await?;

        let mut patch = JobPatch {
            remote_code: Some(code),
            ..Default::default()
        };
        if generated {
            patch.audio_path = Some(audio);
        }
        match outcome {
            SubmitOutcome::Accepted => {
                patch.message = Some("submitted".to_string());
                self.store.update_job(job.id, &patch).await?;
                tracing::info!(job_id = job.id, "remote accepted synthesis job");
            }
            SubmitOutcome::Rejected { code, message } => {
                patch.status = Some(JobStatus::Failed);
                patch.message = Some(if message.is_empty() {
                    format!("remote rejected submission (code {code})")
                } else {
                    message
                });
                self.store.update_job(job.id, &patch).await?;
                tracing::warn!(job_id = job.id, code, "remote rejected synthesis job");
            }
        }
        Ok(())
    }

    /// Resolve the audio input for a submission.
    ///
    /// Returns the remote audio path and whether this call generated it.
    /// Priority: dev-mode fixture, then the job's explicit override, then
    /// speech synthesis with the job's (or model's default) voice.
    async fn resolve_audio(
        &self,
        job: &Job,
        model: &Model,
    ) -> Result<(StoragePath, bool), SchedulerError> {
        if self.config.dev_mode {
            return Ok((StoragePath::parse(DEV_AUDIO_PATH), false));
        }
        if let Some(audio) = &job.audio_path {
            return Ok((audio.clone(), false));
        }

        let voice_id = job
            .voice_id
            .or(model.voice_id)
            .ok_or(SchedulerError::MissingVoice)?;
        let voice = self.require_voice(voice_id).await?;

        let request = SpeechRequest::new(
            voice.id.to_string(),
            job.text_content.clone(),
            download_url(
                &self.config.speech_file_server_url,
                &voice.asr_format_audio_url,
            ),
            voice.reference_audio_text.clone().unwrap_or_default(),
        );
        let bytes = self.speech_api.synthesize(&request).await?;

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let local = self
            .config
            .work_dir
            .join(format!("{}.wav", uuid::Uuid::new_v4()));
        tokio::fs::write(&local, &bytes).await?;

        let remote = self.speech_files.upload(&local, AUDIO_CATEGORY).await?;
        tracing::debug!(job_id = job.id, remote = %remote, "generated audio uploaded");
        Ok((remote, true))
    }

    async fn require_job(&self, id: DbId) -> Result<Job, SchedulerError> {
        self.store
            .job_by_id(id)
            .await?
            .ok_or(SchedulerError::Store(StoreError::NotFound {
                entity: "job",
                id,
            }))
    }

    async fn require_model(&self, id: DbId) -> Result<Model, SchedulerError> {
        self.store
            .model_by_id(id)
            .await?
            .ok_or(SchedulerError::Store(StoreError::NotFound {
                entity: "model",
                id,
            }))
    }

    async fn require_voice(&self, id: DbId) -> Result<Voice, SchedulerError> {
        self.store
            .voice_by_id(id)
            .await?
            .ok_or(SchedulerError::Store(StoreError::NotFound {
                entity: "voice",
                id,
            }))
    }
}

/// Render a storage path as a download URL on a file server.
pub(crate) fn download_url(base: &str, path: &StoragePath) -> String {
    format!("{base}/file/download?path={path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_keeps_category_and_name() {
        let url = download_url(
            "http://127.0.0.1:18181",
            &StoragePath::remote("audio", "ref.wav"),
        );
        assert_eq!(url, "http://127.0.0.1:18181/file/download?path=audio/ref.wav");
    }
}
