//! Repository for the `jobs` table.
//!
//! Rows store paths as TEXT and status as SMALLINT; mapping into the
//! domain [`Job`] (tagged [`StoragePath`], [`JobStatus`]) happens here so
//! nothing downstream re-derives either.

use mirage_core::path::StoragePath;
use mirage_core::types::{DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::status::StatusId;
use crate::models::{Job, JobFilter, JobPatch, JobStatus, NewJob};
use crate::store::StoreError;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, model_id, voice_id, text_content, audio_path, result_path, \
    status_id, message, progress, remote_code, duration_secs, \
    created_at, updated_at";

/// Maximum page size for job listing.
const MAX_PAGE_SIZE: i64 = 100;

/// A raw row from the `jobs` table.
#[derive(Debug, FromRow)]
struct JobRow {
    id: DbId,
    model_id: DbId,
    voice_id: Option<DbId>,
    text_content: String,
    audio_path: Option<String>,
    result_path: Option<String>,
    status_id: StatusId,
    message: Option<String>,
    progress: Option<String>,
    remote_code: Option<String>,
    duration_secs: Option<f64>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TryFrom<JobRow> for Job {
    type Error = StoreError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::from_id(row.status_id).ok_or_else(|| {
            StoreError::Corrupt(format!("job {} has unknown status_id {}", row.id, row.status_id))
        })?;
        Ok(Job {
            id: row.id,
            model_id: row.model_id,
            voice_id: row.voice_id,
            text_content: row.text_content,
            audio_path: row.audio_path.as_deref().map(StoragePath::parse),
            result_path: row.result_path.as_deref().map(StoragePath::parse),
            status,
            message: row.message,
            progress: row.progress,
            remote_code: row.remote_code,
            duration_secs: row.duration_secs,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Provides CRUD operations for synthesis jobs.
pub struct JobRepo;

impl JobRepo {
    /// Insert a new draft job.
    pub async fn insert(pool: &PgPool, new: &NewJob) -> Result<Job, StoreError> {
        let query = format!(
            "INSERT INTO jobs (model_id, voice_id, text_content, audio_path, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(new.model_id)
            .bind(new.voice_id)
            .bind(&new.text_content)
            .bind(new.audio_path.as_ref().map(StoragePath::to_string))
            .bind(JobStatus::Draft.id())
            .fetch_one(pool)
            .await?;
        row.try_into()
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, JobRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Job::try_from)
            .transpose()
    }

    /// List jobs newest first with optional status/keyword filter.
    /// `page` is 1-based.
    pub async fn list(
        pool: &PgPool,
        filter: &JobFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Job>, StoreError> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page.max(1) - 1) * page_size;

        let (where_clause, has_status, has_keyword) = Self::filter_clause(filter, 1);

        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             {where_clause} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${} OFFSET ${}",
            1 + has_status as u32 + has_keyword as u32,
            2 + has_status as u32 + has_keyword as u32,
        );

        let mut q = sqlx::query_as::<_, JobRow>(&query);
        if let Some(status) = filter.status {
            q = q.bind(status.id());
        }
        if let Some(keyword) = &filter.keyword {
            q = q.bind(format!("%{keyword}%"));
        }

        let rows = q.bind(page_size).bind(offset).fetch_all(pool).await?;
        rows.into_iter().map(Job::try_from).collect()
    }

    /// Count jobs matching the filter.
    pub async fn count(pool: &PgPool, filter: &JobFilter) -> Result<i64, StoreError> {
        let (where_clause, ..) = Self::filter_clause(filter, 1);
        let query = format!("SELECT COUNT(*) FROM jobs {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        if let Some(status) = filter.status {
            q = q.bind(status.id());
        }
        if let Some(keyword) = &filter.keyword {
            q = q.bind(format!("%{keyword}%"));
        }
        Ok(q.fetch_one(pool).await?)
    }

    /// Set status, message, and optionally progress in one write.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: JobStatus,
        message: &str,
        progress: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, message = $3, progress = COALESCE($4, progress), \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.id())
        .bind(message)
        .bind(progress)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Apply a partial update. `None` fields keep their stored values.
    pub async fn patch(pool: &PgPool, id: DbId, patch: &JobPatch) -> Result<(), StoreError> {
        let mut sets: Vec<String> = vec!["updated_at = NOW()".to_string()];
        let mut bind_idx: u32 = 1; // $1 is the job id

        if patch.status.is_some() {
            bind_idx += 1;
            sets.push(format!("status_id = ${bind_idx}"));
        }
        if patch.message.is_some() {
            bind_idx += 1;
            sets.push(format!("message = ${bind_idx}"));
        }
        if patch.progress.is_some() {
            bind_idx += 1;
            sets.push(format!("progress = ${bind_idx}"));
        }
        if patch.remote_code.is_some() {
            bind_idx += 1;
            sets.push(format!("remote_code = ${bind_idx}"));
        }
        if patch.audio_path.is_some() {
            bind_idx += 1;
            sets.push(format!("audio_path = ${bind_idx}"));
        }
        match &patch.result_path {
            Some(Some(_)) => {
                bind_idx += 1;
                sets.push(format!("result_path = ${bind_idx}"));
            }
            Some(None) => sets.push("result_path = NULL".to_string()),
            None => {}
        }
        if patch.duration_secs.is_some() {
            bind_idx += 1;
            sets.push(format!("duration_secs = ${bind_idx}"));
        }

        let query = format!("UPDATE jobs SET {} WHERE id = $1", sets.join(", "));
        let mut q = sqlx::query(&query).bind(id);

        if let Some(status) = patch.status {
            q = q.bind(status.id());
        }
        if let Some(message) = &patch.message {
            q = q.bind(message);
        }
        if let Some(progress) = &patch.progress {
            q = q.bind(progress);
        }
        if let Some(code) = &patch.remote_code {
            q = q.bind(code);
        }
        if let Some(audio) = &patch.audio_path {
            q = q.bind(audio.to_string());
        }
        if let Some(Some(result)) = &patch.result_path {
            q = q.bind(result.to_string());
        }
        if let Some(duration) = patch.duration_secs {
            q = q.bind(duration);
        }

        q.execute(pool).await?;
        Ok(())
    }

    /// Delete a job. Returns `false` when no such job existed.
    pub async fn remove(pool: &PgPool, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The oldest job currently in `status`, if any.
    pub async fn first_with_status(
        pool: &PgPool,
        status: JobStatus,
    ) -> Result<Option<Job>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs \
             WHERE status_id = $1 \
             ORDER BY created_at ASC, id ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, JobRow>(&query)
            .bind(status.id())
            .fetch_optional(pool)
            .await?
            .map(Job::try_from)
            .transpose()
    }

    /// Build the WHERE clause for a filter, starting binds at `first_idx`.
    /// Returns the clause plus which optional binds are present.
    fn filter_clause(filter: &JobFilter, first_idx: u32) -> (String, bool, bool) {
        let mut conditions: Vec<String> = Vec::new();
        let mut idx = first_idx;

        let has_status = filter.status.is_some();
        if has_status {
            conditions.push(format!("status_id = ${idx}"));
            idx += 1;
        }

        let has_keyword = filter.keyword.is_some();
        if has_keyword {
            conditions.push(format!("text_content ILIKE ${idx}"));
        }

        let clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (clause, has_status, has_keyword)
    }
}
