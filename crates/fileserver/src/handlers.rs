//! Handlers for `/file/upload` and `/file/download`.

use std::path::Path;

use axum::body::Body;
use axum::extract::{Multipart, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::resolve;
use crate::state::AppState;

/// Category used when the upload form does not carry one.
const DEFAULT_CATEGORY: &str = "default";

/// Query parameters for `GET /file/download`.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub path: String,
}

/// POST /file/upload
///
/// Multipart form with a `file` part and an optional `category` text
/// part. The file is stored under `{root}/{category}/{uuid}{ext}` and the
/// assigned path is returned as `filePath`.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut file_data: Option<(String, Vec<u8>)> = None;
    let mut category: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file_data = Some((filename, data.to_vec()));
            }
            "category" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                category = Some(text);
            }
            _ => {}
        }
    }

    let (original_name, data) =
        file_data.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let category = category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    // Category names are storage directories; traversal segments in a
    // form field must not climb out of the root.
    let category = resolve::normalize(&category);

    let extension = Path::new(&original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let assigned = format!("{}{extension}", uuid::Uuid::new_v4());

    let dir = state.root.join(&category);
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&assigned), &data).await?;

    let file_path = format!("{category}/{assigned}");
    tracing::info!(
        original = %original_name,
        stored = %file_path,
        size = data.len(),
        "File uploaded",
    );

    Ok(Json(json!({
        "success": true,
        "filePath": file_path,
        "originalName": original_name,
    })))
}

/// GET /file/download?path=...
///
/// Resolves the requested path (direct, category probe, recursive
/// search) and streams the file bytes with a content type guessed from
/// the extension.
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<Response> {
    let root = state.root.clone();
    let requested = query.path.clone();

    // Resolution walks the directory tree; keep it off the async runtime.
    let resolved = tokio::task::spawn_blocking(move || resolve::resolve(&root, &requested))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let Some(path) = resolved else {
        tracing::debug!(path = %query.path, "Download not resolved");
        return Err(AppError::FileNotFound);
    };

    let file = tokio::fs::File::open(&path).await?;
    let size = file.metadata().await?.len();
    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    tracing::debug!(
        requested = %query.path,
        resolved = %path.display(),
        size,
        "File downloaded",
    );

    // Stream straight from disk; results can be whole videos.
    let body = Body::from_stream(ReaderStream::new(file));
    Ok(([(CONTENT_TYPE, content_type)], body).into_response())
}
