//! Integration tests for the file server's upload/download contract.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use mirage_fileserver::state::AppState;

const BOUNDARY: &str = "test-boundary-7a91";

fn build_app(root: &std::path::Path) -> Router {
    mirage_fileserver::app(AppState::new(root.to_path_buf()))
}

/// Build a multipart upload request with an optional category part.
fn upload_request(filename: &str, data: &[u8], category: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(category) = category {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"category\"\r\n\r\n\
                 {category}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/file/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

#[tokio::test]
async fn upload_stores_under_category_with_assigned_name() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(upload_request("ref.wav", b"RIFFdata", Some("audio")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["originalName"], "ref.wav");

    let file_path = json["filePath"].as_str().unwrap();
    assert!(file_path.starts_with("audio/"));
    assert!(file_path.ends_with(".wav"));
    // The server assigns a fresh name; the original must not be reused.
    assert_ne!(file_path, "audio/ref.wav");

    let stored = dir.path().join(file_path);
    assert_eq!(std::fs::read(stored).unwrap(), b"RIFFdata");
}

#[tokio::test]
async fn upload_without_category_uses_the_default_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(upload_request("clip.mp4", b"mp4data", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["filePath"].as_str().unwrap().starts_with("default/"));
}

#[tokio::test]
async fn upload_without_file_part_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"category\"\r\n\r\n\
         audio\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/file/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No file uploaded");
}

#[tokio::test]
async fn download_resolves_an_exact_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("audio")).unwrap();
    std::fs::write(dir.path().join("audio/ref.wav"), b"wav-bytes").unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/file/download?path=audio/ref.wav")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("audio/"), "{content_type}");
    assert_eq!(body_bytes(response).await, b"wav-bytes");
}

#[tokio::test]
async fn download_probes_known_categories_for_bare_filenames() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("model")).unwrap();
    std::fs::write(dir.path().join("model/face.mp4"), b"mp4-bytes").unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/file/download?path=face.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"mp4-bytes");
}

#[tokio::test]
async fn download_searches_the_whole_root_as_a_last_resort() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("results/2024")).unwrap();
    std::fs::write(dir.path().join("results/2024/out.mp4"), b"deep").unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/file/download?path=out.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"deep");
}

#[tokio::test]
async fn download_traversal_cannot_escape_the_root() {
    let outer = tempfile::tempdir().unwrap();
    std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
    let root = outer.path().join("storage");
    std::fs::create_dir_all(&root).unwrap();
    let app = build_app(&root);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/file/download?path=../secret.txt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_miss_answers_the_contract_error_shape() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/file/download?path=nope.bin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "File not found");
}

#[tokio::test]
async fn download_streams_large_files_intact() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("temp")).unwrap();
    // Larger than a single read chunk, so the body spans many frames.
    let payload: Vec<u8> = (0..256 * 1024).map(|i| (i % 251) as u8).collect();
    std::fs::write(dir.path().join("temp/big.mp4"), &payload).unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/file/download?path=temp/big.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, payload);
}
