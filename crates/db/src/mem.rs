//! In-memory [`RecordStore`].
//!
//! Backs unit tests and database-less development. Semantics mirror the
//! PostgreSQL store: listing is newest first, `first_job_with_status` is
//! oldest first, patches are last-writer-wins.

use std::collections::BTreeMap;

use async_trait::async_trait;
use mirage_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::{Job, JobFilter, JobPatch, JobStatus, Model, NewJob, NewModel, NewVoice, Voice};
use crate::store::{RecordStore, StoreError};

#[derive(Default)]
struct Inner {
    jobs: BTreeMap<DbId, Job>,
    models: BTreeMap<DbId, Model>,
    voices: BTreeMap<DbId, Voice>,
    next_id: DbId,
}

impl Inner {
    fn alloc_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// Record store held entirely in process memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(job: &Job, filter: &JobFilter) -> bool {
    if let Some(status) = filter.status {
        if job.status != status {
            return false;
        }
    }
    if let Some(keyword) = &filter.keyword {
        if !job.text_content.contains(keyword.as_str()) {
            return false;
        }
    }
    true
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_job(&self, new: NewJob) -> Result<Job, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.alloc_id();
        let now = chrono::Utc::now();
        let job = Job {
            id,
            model_id: new.model_id,
            voice_id: new.voice_id,
            text_content: new.text_content,
            audio_path: new.audio_path,
            result_path: None,
            status: JobStatus::Draft,
            message: None,
            progress: None,
            remote_code: None,
            duration_secs: None,
            created_at: now,
            updated_at: now,
        };
        inner.jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn job_by_id(&self, id: DbId) -> Result<Option<Job>, StoreError> {
        Ok(self.inner.read().await.jobs.get(&id).cloned())
    }

    async fn jobs_page(
        &self,
        filter: &JobFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Job>, StoreError> {
        let inner = self.inner.read().await;
        let offset = ((page.max(1) - 1) * page_size) as usize;
        Ok(inner
            .jobs
            .values()
            .rev() // newest first: ids are allocated in insertion order
            .filter(|j| matches_filter(j, filter))
            .skip(offset)
            .take(page_size.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_jobs(&self, filter: &JobFilter) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.jobs.values().filter(|j| matches_filter(j, filter)).count() as i64)
    }

    async fn update_job_status(
        &self,
        id: DbId,
        status: JobStatus,
        message: &str,
        progress: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(job) = inner.jobs.get_mut(&id) {
            job.status = status;
            job.message = Some(message.to_string());
            if let Some(progress) = progress {
                job.progress = Some(progress.to_string());
            }
            job.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn update_job(&self, id: DbId, patch: &JobPatch) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(job) = inner.jobs.get_mut(&id) {
            if let Some(status) = patch.status {
                job.status = status;
            }
            if let Some(message) = &patch.message {
                job.message = Some(message.clone());
            }
            if let Some(progress) = &patch.progress {
                job.progress = Some(progress.clone());
            }
            if let Some(code) = &patch.remote_code {
                job.remote_code = Some(code.clone());
            }
            if let Some(audio) = &patch.audio_path {
                job.audio_path = Some(audio.clone());
            }
            if let Some(result) = &patch.result_path {
                job.result_path = result.clone();
            }
            if let Some(duration) = patch.duration_secs {
                job.duration_secs = Some(duration);
            }
            job.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn remove_job(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.jobs.remove(&id).is_some())
    }

    async fn first_job_with_status(&self, status: JobStatus) -> Result<Option<Job>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .jobs
            .values()
            .find(|j| j.status == status)
            .cloned())
    }

    async fn insert_model(&self, new: NewModel) -> Result<Model, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.alloc_id();
        let model = Model {
            id,
            name: new.name,
            video_path: new.video_path,
            audio_path: new.audio_path,
            voice_id: new.voice_id,
            created_at: chrono::Utc::now(),
        };
        inner.models.insert(id, model.clone());
        Ok(model)
    }

    async fn model_by_id(&self, id: DbId) -> Result<Option<Model>, StoreError> {
        Ok(self.inner.read().await.models.get(&id).cloned())
    }

    async fn models_page(
        &self,
        keyword: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Model>, StoreError> {
        let inner = self.inner.read().await;
        let offset = ((page.max(1) - 1) * page_size) as usize;
        Ok(inner
            .models
            .values()
            .rev()
            .filter(|m| keyword.map_or(true, |k| m.name.contains(k)))
            .skip(offset)
            .take(page_size.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_models(&self, keyword: Option<&str>) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .models
            .values()
            .filter(|m| keyword.map_or(true, |k| m.name.contains(k)))
            .count() as i64)
    }

    async fn remove_model(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.models.remove(&id).is_some())
    }

    async fn insert_voice(&self, new: NewVoice) -> Result<Voice, StoreError> {
        let mut inner = self.inner.write().await;
        let id = inner.alloc_id();
        let voice = Voice {
            id,
            origin_audio_path: new.origin_audio_path,
            language: new.language,
            asr_format_audio_url: new.asr_format_audio_url,
            reference_audio_text: new.reference_audio_text,
            created_at: chrono::Utc::now(),
        };
        inner.voices.insert(id, voice.clone());
        Ok(voice)
    }

    async fn voice_by_id(&self, id: DbId) -> Result<Option<Voice>, StoreError> {
        Ok(self.inner.read().await.voices.get(&id).cloned())
    }
}
