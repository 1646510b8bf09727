//! Repository for the `models` table.

use mirage_core::path::StoragePath;
use mirage_core::types::{DbId, Timestamp};
use sqlx::{FromRow, PgPool};

use crate::models::{Model, NewModel};
use crate::store::StoreError;

/// Column list for `models` queries.
const COLUMNS: &str = "id, name, video_path, audio_path, voice_id, created_at";

/// Maximum page size for model listing.
const MAX_PAGE_SIZE: i64 = 100;

/// A raw row from the `models` table.
#[derive(Debug, FromRow)]
struct ModelRow {
    id: DbId,
    name: String,
    video_path: String,
    audio_path: Option<String>,
    voice_id: Option<DbId>,
    created_at: Timestamp,
}

impl From<ModelRow> for Model {
    fn from(row: ModelRow) -> Self {
        Model {
            id: row.id,
            name: row.name,
            video_path: StoragePath::parse(&row.video_path),
            audio_path: row.audio_path.as_deref().map(StoragePath::parse),
            voice_id: row.voice_id,
            created_at: row.created_at,
        }
    }
}

/// Provides CRUD operations for avatar models.
pub struct ModelRepo;

impl ModelRepo {
    pub async fn insert(pool: &PgPool, new: &NewModel) -> Result<Model, StoreError> {
        let query = format!(
            "INSERT INTO models (name, video_path, audio_path, voice_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ModelRow>(&query)
            .bind(&new.name)
            .bind(new.video_path.to_string())
            .bind(new.audio_path.as_ref().map(StoragePath::to_string))
            .bind(new.voice_id)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Model>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM models WHERE id = $1");
        Ok(sqlx::query_as::<_, ModelRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(Model::from))
    }

    /// List models newest first, optionally filtered by a name substring.
    /// `page` is 1-based.
    pub async fn list(
        pool: &PgPool,
        keyword: Option<&str>,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Model>, StoreError> {
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let offset = (page.max(1) - 1) * page_size;

        let rows = if let Some(keyword) = keyword {
            let query = format!(
                "SELECT {COLUMNS} FROM models \
                 WHERE name ILIKE $1 \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $2 OFFSET $3"
            );
            sqlx::query_as::<_, ModelRow>(&query)
                .bind(format!("%{keyword}%"))
                .bind(page_size)
                .bind(offset)
                .fetch_all(pool)
                .await?
        } else {
            let query = format!(
                "SELECT {COLUMNS} FROM models \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $1 OFFSET $2"
            );
            sqlx::query_as::<_, ModelRow>(&query)
                .bind(page_size)
                .bind(offset)
                .fetch_all(pool)
                .await?
        };

        Ok(rows.into_iter().map(Model::from).collect())
    }

    pub async fn count(pool: &PgPool, keyword: Option<&str>) -> Result<i64, StoreError> {
        let count = if let Some(keyword) = keyword {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM models WHERE name ILIKE $1")
                .bind(format!("%{keyword}%"))
                .fetch_one(pool)
                .await?
        } else {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM models")
                .fetch_one(pool)
                .await?
        };
        Ok(count)
    }

    pub async fn remove(pool: &PgPool, id: DbId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM models WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
