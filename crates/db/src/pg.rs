//! PostgreSQL-backed [`RecordStore`].

use async_trait::async_trait;
use mirage_core::types::DbId;

use crate::models::{Job, JobFilter, JobPatch, JobStatus, Model, NewJob, NewModel, NewVoice, Voice};
use crate::repositories::{JobRepo, ModelRepo, VoiceRepo};
use crate::store::{RecordStore, StoreError};
use crate::DbPool;

/// Production record store delegating to the sqlx repositories.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: DbPool,
}

impl PgRecordStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_job(&self, new: NewJob) -> Result<Job, StoreError> {
        JobRepo::insert(&self.pool, &new).await
    }

    async fn job_by_id(&self, id: DbId) -> Result<Option<Job>, StoreError> {
        JobRepo::find_by_id(&self.pool, id).await
    }

    async fn jobs_page(
        &self,
        filter: &JobFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Job>, StoreError> {
        JobRepo::list(&self.pool, filter, page, page_size).await
    }

    async fn count_jobs(&self, filter: &JobFilter) -> Result<i64, StoreError> {
        JobRepo::count(&self.pool, filter).await
    }

    async fn update_job_status(
        &self,
        id: DbId,
        status: JobStatus,
        message: &str,
        progress: Option<&str>,
    ) -> Result<(), StoreError> {
        JobRepo::update_status(&self.pool, id, status, message, progress).await
    }

    async fn update_job(&self, id: DbId, patch: &JobPatch) -> Result<(), StoreError> {
        JobRepo::patch(&self.pool, id, patch).await
    }

    async fn remove_job(&self, id: DbId) -> Result<bool, StoreError> {
        JobRepo::remove(&self.pool, id).await
    }

    async fn first_job_with_status(&self, status: JobStatus) -> Result<Option<Job>, StoreError> {
        JobRepo::first_with_status(&self.pool, status).await
    }

    async fn insert_model(&self, new: NewModel) -> Result<Model, StoreError> {
        ModelRepo::insert(&self.pool, &new).await
    }

    async fn model_by_id(&self, id: DbId) -> Result<Option<Model>, StoreError> {
        ModelRepo::find_by_id(&self.pool, id).await
    }

    async fn models_page(
        &self,
        keyword: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Model>, StoreError> {
        ModelRepo::list(&self.pool, keyword, page, page_size).await
    }

    async fn count_models(&self, keyword: Option<&str>) -> Result<i64, StoreError> {
        ModelRepo::count(&self.pool, keyword).await
    }

    async fn remove_model(&self, id: DbId) -> Result<bool, StoreError> {
        ModelRepo::remove(&self.pool, id).await
    }

    async fn insert_voice(&self, new: NewVoice) -> Result<Voice, StoreError> {
        VoiceRepo::insert(&self.pool, &new).await
    }

    async fn voice_by_id(&self, id: DbId) -> Result<Option<Voice>, StoreError> {
        VoiceRepo::find_by_id(&self.pool, id).await
    }
}
