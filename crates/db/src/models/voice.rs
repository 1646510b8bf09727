//! Voice entity: reference audio produced by a training step.

use mirage_core::path::StoragePath;
use mirage_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

/// A cloned voice. Created by training, never mutated here.
#[derive(Debug, Clone, Serialize)]
pub struct Voice {
    pub id: DbId,
    /// Raw reference audio as recorded.
    pub origin_audio_path: StoragePath,
    pub language: String,
    /// Pre-processed reference audio on the speech file server.
    pub asr_format_audio_url: StoragePath,
    /// Transcript used to condition synthesis.
    pub reference_audio_text: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for registering a voice after training.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVoice {
    pub origin_audio_path: StoragePath,
    pub language: String,
    pub asr_format_audio_url: StoragePath,
    pub reference_audio_text: Option<String>,
}
