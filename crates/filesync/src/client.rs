//! HTTP client for one remote file server.

use std::path::Path;

use async_trait::async_trait;
use mirage_core::path::StoragePath;
use serde::Deserialize;

use crate::error::SyncError;
use crate::FileTransfer;

/// Client for a single file server. Instantiate one per service (video
/// file server, speech file server) from that service's base URL.
pub struct FileSyncClient {
    client: reqwest::Client,
    base_url: String,
}

/// Response from `POST /file/upload`.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    #[serde(rename = "filePath")]
    file_path: Option<String>,
    error: Option<String>,
}

impl FileSyncClient {
    /// Create a new client.
    ///
    /// * `base_url` - e.g. `http://host:8385`, no trailing slash.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`] for
    /// connection pooling across services.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base URL of the file server this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn do_upload(&self, local: &Path, category: &str) -> Result<StoragePath, SyncError> {
        if !local.exists() {
            return Err(SyncError::LocalFileMissing(local.to_path_buf()));
        }

        let filename = local
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.bin".to_string());
        let data = tokio::fs::read(local)
            .await
            .map_err(|_| SyncError::LocalFileMissing(local.to_path_buf()))?;

        let form = reqwest::multipart::Form::new()
            .text("category", category.to_string())
            .part(
                "file",
                reqwest::multipart::Part::bytes(data).file_name(filename),
            );

        let response = self
            .client
            .post(format!("{}/file/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        let body: UploadResponse = response.json().await?;
        if !body.success {
            return Err(SyncError::Rejected(
                body.error.unwrap_or_else(|| "upload rejected".to_string()),
            ));
        }
        let file_path = body
            .file_path
            .ok_or_else(|| SyncError::Rejected("upload response missing filePath".to_string()))?;

        let remote = StoragePath::parse(&file_path);
        tracing::debug!(local = %local.display(), remote = %remote, "Uploaded file");
        Ok(remote)
    }

    async fn do_download(&self, remote: &StoragePath, local: &Path) -> Result<(), SyncError> {
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SyncError::LocalIo {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let mut last_error = String::from("no path variants to try");

        for candidate in candidate_paths(remote) {
            let result = self
                .client
                .get(format!("{}/file/download", self.base_url))
                .query(&[("path", candidate.as_str())])
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    // Full body first; the destination is written only
                    // once the transfer is complete.
                    let bytes = response.bytes().await?;
                    tokio::fs::write(local, &bytes).await.map_err(|e| {
                        SyncError::LocalIo {
                            path: local.to_path_buf(),
                            source: e,
                        }
                    })?;
                    tracing::debug!(
                        remote = %remote,
                        resolved = %candidate,
                        local = %local.display(),
                        "Downloaded file",
                    );
                    return Ok(());
                }
                Ok(response) => {
                    last_error = format!("HTTP {} for '{candidate}'", response.status());
                }
                Err(e) => {
                    last_error = format!("request for '{candidate}' failed: {e}");
                }
            }
        }

        Err(SyncError::RemoteFileNotFound {
            path: remote.to_string(),
            last_error,
        })
    }
}

#[async_trait]
impl FileTransfer for FileSyncClient {
    async fn upload(&self, local: &Path, category: &str) -> Result<StoragePath, SyncError> {
        self.do_upload(local, category).await
    }

    async fn download(&self, remote: &StoragePath, local: &Path) -> Result<(), SyncError> {
        self.do_download(remote, local).await
    }
}

/// The download variants tried, in order: the canonical stored form
/// (separators already normalized by [`StoragePath::parse`]), then the
/// bare basename with no category. Duplicates are dropped, so a local
/// path yields a single attempt.
pub fn candidate_paths(remote: &StoragePath) -> Vec<String> {
    let full = remote.to_string();
    let basename = remote.basename().to_string();
    let mut candidates = vec![full];
    if !candidates.contains(&basename) {
        candidates.push(basename);
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_path_yields_full_then_basename() {
        let remote = StoragePath::remote("audio", "ref.wav");
        assert_eq!(candidate_paths(&remote), vec!["audio/ref.wav", "ref.wav"]);
    }

    #[test]
    fn local_path_yields_single_candidate() {
        let local = StoragePath::local("ref.wav");
        assert_eq!(candidate_paths(&local), vec!["ref.wav"]);
    }

    #[test]
    fn nested_remote_path_uses_final_component_as_basename() {
        let remote = StoragePath::parse("out/2024/abc.mp4");
        assert_eq!(
            candidate_paths(&remote),
            vec!["out/2024/abc.mp4", "abc.mp4"],
        );
    }
}
