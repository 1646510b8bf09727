//! Job entity and the DTOs used to create, filter, and patch it.

use mirage_core::path::StoragePath;
use mirage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

use super::status::JobStatus;

/// One requested video synthesis, tracked through its lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: DbId,
    /// Model providing the template video (and a default voice).
    pub model_id: DbId,
    /// Voice override; the model's default voice applies when absent.
    pub voice_id: Option<DbId>,
    /// Text the avatar speaks.
    pub text_content: String,
    /// Explicit audio override. When set, speech synthesis is skipped and
    /// this path is used as-is (assumed already remote).
    pub audio_path: Option<StoragePath>,
    /// Remote path of the finished video. Set only on success.
    pub result_path: Option<StoragePath>,
    pub status: JobStatus,
    /// Human-readable status text.
    pub message: Option<String>,
    /// Opaque progress indication relayed from the remote service.
    pub progress: Option<String>,
    /// UUID minted at submission; correlation key for status polling.
    pub remote_code: Option<String>,
    /// Result media length in seconds, populated on success.
    pub duration_secs: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a job. New jobs always start as [`JobStatus::Draft`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub model_id: DbId,
    pub voice_id: Option<DbId>,
    pub text_content: String,
    pub audio_path: Option<StoragePath>,
}

/// Filter for job listing and counting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    /// Substring match against the job's text content.
    pub keyword: Option<String>,
}

/// Partial update applied with last-writer-wins semantics.
///
/// `None` fields are left untouched. `result_path` is doubly optional so
/// a patch can clear a stale result (`Some(None)`) without clobbering it
/// on unrelated updates.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub message: Option<String>,
    pub progress: Option<String>,
    pub remote_code: Option<String>,
    pub audio_path: Option<StoragePath>,
    pub result_path: Option<Option<StoragePath>>,
    pub duration_secs: Option<f64>,
}
