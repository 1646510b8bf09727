//! The narrow interface the rest of the system consumes storage through.

use async_trait::async_trait;
use mirage_core::types::DbId;

use crate::models::{Job, JobFilter, JobPatch, JobStatus, Model, NewJob, NewModel, NewVoice, Voice};

/// Errors surfaced by a record store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A referenced record is absent. Callers decide whether this is
    /// fatal or becomes a failed-job status.
    #[error("record not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// A stored row could not be mapped back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The underlying database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD access to job, model, and voice records.
///
/// The scheduler and interactive handlers share one store without
/// locking; correctness relies on at most one job being `Pending` at a
/// time and last-writer-wins field updates.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ---- jobs ----

    async fn insert_job(&self, new: NewJob) -> Result<Job, StoreError>;

    async fn job_by_id(&self, id: DbId) -> Result<Option<Job>, StoreError>;

    /// Page through jobs, newest first. `page` is 1-based.
    async fn jobs_page(
        &self,
        filter: &JobFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Job>, StoreError>;

    async fn count_jobs(&self, filter: &JobFilter) -> Result<i64, StoreError>;

    /// Set status, message, and optionally progress in one write.
    async fn update_job_status(
        &self,
        id: DbId,
        status: JobStatus,
        message: &str,
        progress: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Apply a partial update; untouched fields keep their values.
    async fn update_job(&self, id: DbId, patch: &JobPatch) -> Result<(), StoreError>;

    /// Delete a job. Returns `false` when no such job existed.
    async fn remove_job(&self, id: DbId) -> Result<bool, StoreError>;

    /// The oldest job currently in `status`, if any.
    async fn first_job_with_status(&self, status: JobStatus) -> Result<Option<Job>, StoreError>;

    // ---- models ----

    async fn insert_model(&self, new: NewModel) -> Result<Model, StoreError>;

    async fn model_by_id(&self, id: DbId) -> Result<Option<Model>, StoreError>;

    /// Page through models, newest first, optionally filtered by a name
    /// substring. `page` is 1-based.
    async fn models_page(
        &self,
        keyword: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Model>, StoreError>;

    async fn count_models(&self, keyword: Option<&str>) -> Result<i64, StoreError>;

    async fn remove_model(&self, id: DbId) -> Result<bool, StoreError>;

    // ---- voices ----

    async fn insert_voice(&self, new: NewVoice) -> Result<Voice, StoreError>;

    async fn voice_by_id(&self, id: DbId) -> Result<Option<Voice>, StoreError>;
}
