//! Avatar model entity: a trained template video plus its default voice.

use mirage_core::path::StoragePath;
use mirage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// A trained avatar model.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub id: DbId,
    pub name: String,
    /// Template video on the video file server.
    pub video_path: StoragePath,
    /// Silent-face audio extracted at training time, if any.
    pub audio_path: Option<StoragePath>,
    /// Default voice used when a job does not specify one.
    pub voice_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for registering a model.
#[derive(Debug, Clone, Deserialize)]
pub struct NewModel {
    pub name: String,
    pub video_path: StoragePath,
    pub audio_path: Option<StoragePath>,
    pub voice_id: Option<DbId>,
}
