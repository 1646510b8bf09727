//! Repository for the `voices` table.

use mirage_core::path::StoragePath;
use mirage_core::types::{DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::{NewVoice, Voice};
use crate::store::StoreError;

/// Column list for `voices` queries.
const COLUMNS: &str =
    "id, origin_audio_path, language, asr_format_audio_url, reference_audio_text, created_at";

/// A raw row from the `voices` table.
#[derive(Debug, FromRow)]
struct VoiceRow {
    id: DbId,
    origin_audio_path: String,
    language: String,
    asr_format_audio_url: String,
    reference_audio_text: Option<String>,
    created_at: Timestamp,
}

impl From<VoiceRow> for Voice {
    fn from(row: VoiceRow) -> Self {
        Voice {
            id: row.id,
            origin_audio_path: StoragePath::parse(&row.origin_audio_path),
            language: row.language,
            asr_format_audio_url: StoragePath::parse(&row.asr_format_audio_url),
            reference_audio_text: row.reference_audio_text,
            created_at: row.created_at,
        }
    }
}

/// Provides CRUD operations for cloned voices.
pub struct VoiceRepo;

impl VoiceRepo {
    pub async fn insert(pool: &PgPool, new: &NewVoice) -> Result<Voice, StoreError> {
        let query = format!(
            "INSERT INTO voices \
                 (origin_audio_path, language, asr_format_audio_url, reference_audio_text) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, VoiceRow>(&query)
            .bind(new.origin_audio_path.to_string())
            .bind(&new.language)
            .bind(new.asr_format_audio_url.to_string())
            .bind(&new.reference_audio_text)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Voice>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM voices WHERE id = $1");
        Ok(sqlx::query_as::<_, VoiceRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Voice::from))
    }
}
