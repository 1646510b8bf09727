//! HTTP-level behaviour of [`FileSyncClient`] against a mock file server.

use assert_matches::assert_matches;
use mirage_core::path::StoragePath;
use mirage_filesync::{FileSyncClient, FileTransfer, SyncError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn upload_of_missing_local_file_never_touches_the_network() {
    let server = MockServer::start().await;

    // Any request reaching the server would violate the contract.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = FileSyncClient::new(server.uri());
    let result = client
        .upload(std::path::Path::new("/definitely/not/here.wav"), "audio")
        .await;

    assert_matches!(result, Err(SyncError::LocalFileMissing(_)));
}

#[tokio::test]
async fn upload_returns_the_server_assigned_remote_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/file/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "filePath": "audio/0b6c-d1.wav",
            "originalName": "ref.wav",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("ref.wav");
    std::fs::write(&local, b"RIFFdata").unwrap();

    let client = FileSyncClient::new(server.uri());
    let remote = client.upload(&local, "audio").await.unwrap();

    assert_eq!(remote, StoragePath::remote("audio", "0b6c-d1.wav"));
}

#[tokio::test]
async fn upload_rejection_carries_the_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/file/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "success": false,
            "error": "No file uploaded",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("ref.wav");
    std::fs::write(&local, b"RIFFdata").unwrap();

    let client = FileSyncClient::new(server.uri());
    let result = client.upload(&local, "audio").await;

    assert_matches!(result, Err(SyncError::Rejected(msg)) if msg == "No file uploaded");
}

#[tokio::test]
async fn download_falls_back_to_the_bare_basename() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/file/download"))
        .and(query_param("path", "out/abc.mp4"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "success": false,
            "error": "File not found",
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/file/download"))
        .and(query_param("path", "abc.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("nested").join("abc.mp4");

    let client = FileSyncClient::new(server.uri());
    client
        .download(&StoragePath::remote("out", "abc.mp4"), &local)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&local).unwrap(), b"video-bytes");
}

#[tokio::test]
async fn download_exhaustion_reports_the_last_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/file/download"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "success": false,
            "error": "File not found",
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("abc.mp4");

    let client = FileSyncClient::new(server.uri());
    let result = client
        .download(&StoragePath::remote("out", "abc.mp4"), &local)
        .await;

    assert_matches!(
        result,
        Err(SyncError::RemoteFileNotFound { path, last_error })
            if path == "out/abc.mp4" && last_error.contains("404")
    );
    assert!(!local.exists(), "no partial file may be written");
}

#[tokio::test]
async fn unwritable_download_destination_is_a_local_io_error() {
    let server = MockServer::start().await;

    // The destination is rejected before any path variant is requested.
    Mock::given(method("GET"))
        .and(path("/file/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-bytes".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();

    let client = FileSyncClient::new(server.uri());
    let result = client
        .download(
            &StoragePath::remote("out", "abc.mp4"),
            &blocker.join("nested/abc.mp4"),
        )
        .await;

    assert_matches!(result, Err(SyncError::LocalIo { .. }));
}
