//! HTTP-level tests for the synthesis clients against a mock server.

use assert_matches::assert_matches;
use mirage_synth::speech::{HttpSpeechApi, SpeechRequest, SpeechSynthesis};
use mirage_synth::video::{
    HttpVideoApi, StatusOutcome, SubmitOutcome, SubmitRequest, VideoSynthesis,
};
use mirage_synth::SynthApiError;
use wiremock::matchers::{body_json_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn submit_request() -> SubmitRequest {
    SubmitRequest::new(
        "code-123".into(),
        "http://files/audio/a.wav".into(),
        "http://files/model/m.mp4".into(),
    )
}

#[tokio::test]
async fn submit_sends_pinned_fields_and_maps_acceptance() {
    let server = MockServer::start().await;
    let expected = serde_json::json!({
        "audio_url": "http://files/audio/a.wav",
        "video_url": "http://files/model/m.mp4",
        "code": "code-123",
        "chaofen": 0,
        "watermark_switch": 0,
        "pn": 1,
    });
    Mock::given(method("POST"))
        .and(path("/easy/submit"))
        .and(body_json_string(expected.to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 10000, "msg": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpVideoApi::new(server.uri());
    let outcome = api.submit(&submit_request()).await.unwrap();
    assert_eq!(outcome, SubmitOutcome::Accepted);
}

#[tokio::test]
async fn submit_surfaces_rejection_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/easy/submit"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"code": 10002, "msg": "queue full"})),
        )
        .mount(&server)
        .await;

    let api = HttpVideoApi::new(server.uri());
    let outcome = api.submit(&submit_request()).await.unwrap();
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            code: 10002,
            message: "queue full".into()
        },
    );
}

#[tokio::test]
async fn query_passes_code_and_maps_completion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/easy/query"))
        .and(query_param("code", "code-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 10000,
            "msg": "ok",
            "data": {"status": 2, "result": "out/code-123.mp4", "msg": "done"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpVideoApi::new(server.uri());
    let outcome = api.query_status("code-123").await.unwrap();
    assert_eq!(
        outcome,
        StatusOutcome::Completed {
            result: "out/code-123.mp4".into(),
            message: "done".into()
        },
    );
}

#[tokio::test]
async fn query_maps_http_error_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/easy/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let api = HttpVideoApi::new(server.uri());
    let err = api.query_status("code-123").await.unwrap_err();
    assert_matches!(err, SynthApiError::Api { status: 500, ref body } if body == "boom");
}

#[tokio::test]
async fn speech_invoke_returns_audio_bytes() {
    let server = MockServer::start().await;
    let wav = b"RIFF....WAVEdata".to_vec();
    Mock::given(method("POST"))
        .and(path("/v1/invoke"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(wav.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpSpeechApi::new(server.uri());
    let request = SpeechRequest::new(
        "voice-7".into(),
        "hello world".into(),
        "http://files/origin_audio/ref.wav".into(),
        "reference transcript".into(),
    );
    let bytes = api.synthesize(&request).await.unwrap();
    assert_eq!(bytes, wav);
}

#[tokio::test]
async fn speech_invoke_empty_body_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/invoke"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = HttpSpeechApi::new(server.uri());
    let request = SpeechRequest::new("v".into(), "t".into(), "r".into(), "rt".into());
    let err = api.synthesize(&request).await.unwrap_err();
    assert_matches!(err, SynthApiError::UnexpectedResponse(_));
}
