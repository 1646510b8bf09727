//! REST client for the video-synthesis service.
//!
//! Submission and status responses share a `{code, msg, data}` envelope.
//! Business codes: `10000` accepted/ok, `9999`/`10002`/`10003` rejected
//! or terminal error. `data.status` while polling: `1` processing,
//! `2` complete, `3` failed.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::SynthApiError;

/// Business code for an accepted submission / healthy status reply.
const CODE_OK: i64 = 10000;

/// Business codes the service uses for rejected or dead jobs.
const CODE_REJECTED: &[i64] = &[9999, 10002, 10003];

/// A video-synthesis submission.
///
/// `chaofen` (face enhancement) and `watermark_switch` are pinned off,
/// `pn` pinned to 1 — the only mode the downstream service supports for
/// this pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest {
    pub audio_url: String,
    pub video_url: String,
    /// Caller-minted UUID; idempotency and tracking key.
    pub code: String,
    pub chaofen: i32,
    pub watermark_switch: i32,
    pub pn: i32,
}

impl SubmitRequest {
    pub fn new(code: String, audio_url: String, video_url: String) -> Self {
        Self {
            audio_url,
            video_url,
            code,
            chaofen: 0,
            watermark_switch: 0,
            pn: 1,
        }
    }
}

/// Outcome of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The service queued the job; it finishes asynchronously.
    Accepted,
    /// The service turned the job away.
    Rejected { code: i64, message: String },
}

/// Outcome of a status query, one variant per shape the service emits.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusOutcome {
    /// Rejected/terminal business code — the job is dead on the remote.
    Rejected { code: i64, message: String },
    /// Still processing; `progress` is an opaque remote value.
    Processing {
        progress: Option<String>,
        message: String,
    },
    /// Finished; `result` is the remote path of the produced video.
    Completed { result: String, message: String },
    /// The service itself reports the job failed.
    Failed { message: String },
}

/// Raw `{code, msg}` submission envelope.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    code: i64,
    msg: Option<String>,
}

/// Raw `{code, msg, data}` status envelope.
#[derive(Debug, Deserialize)]
struct StatusResponse {
    code: i64,
    msg: Option<String>,
    data: Option<StatusData>,
}

#[derive(Debug, Deserialize)]
struct StatusData {
    status: Option<i64>,
    progress: Option<serde_json::Value>,
    msg: Option<String>,
    result: Option<String>,
}

/// Seam for the video-synthesis service.
#[async_trait]
pub trait VideoSynthesis: Send + Sync {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, SynthApiError>;

    async fn query_status(&self, code: &str) -> Result<StatusOutcome, SynthApiError>;
}

/// HTTP client for the video-synthesis service.
pub struct HttpVideoApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVideoApi {
    /// Create a new client.
    ///
    /// * `base_url` - e.g. `http://host:8383`, no trailing slash.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Ensure the response has a success status code, returning the body
    /// text on success.
    async fn read_success_body(response: reqwest::Response) -> Result<String, SynthApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if !status.is_success() {
            return Err(SynthApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl VideoSynthesis for HttpVideoApi {
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitOutcome, SynthApiError> {
        tracing::debug!(code = %request.code, "submitting video synthesis job");
        let response = self
            .client
            .post(format!("{}/easy/submit", self.base_url))
            .json(request)
            .send()
            .await?;

        let body = Self::read_success_body(response).await?;
        let parsed: SubmitResponse = serde_json::from_str(&body)
            .map_err(|e| SynthApiError::UnexpectedResponse(format!("{e}: {body}")))?;

        Ok(map_submit(parsed))
    }

    async fn query_status(&self, code: &str) -> Result<StatusOutcome, SynthApiError> {
        let response = self
            .client
            .get(format!("{}/easy/query", self.base_url))
            .query(&[("code", code)])
            .send()
            .await?;

        let body = Self::read_success_body(response).await?;
        let parsed: StatusResponse = serde_json::from_str(&body)
            .map_err(|e| SynthApiError::UnexpectedResponse(format!("{e}: {body}")))?;

        map_status(parsed)
    }
}

fn map_submit(response: SubmitResponse) -> SubmitOutcome {
    if response.code == CODE_OK {
        SubmitOutcome::Accepted
    } else {
        SubmitOutcome::Rejected {
            code: response.code,
            message: response.msg.unwrap_or_default(),
        }
    }
}

fn map_status(response: StatusResponse) -> Result<StatusOutcome, SynthApiError> {
    if CODE_REJECTED.contains(&response.code) {
        return Ok(StatusOutcome::Rejected {
            code: response.code,
            message: best_message(&response),
        });
    }
    if response.code != CODE_OK {
        return Err(SynthApiError::UnexpectedResponse(format!(
            "unknown business code {}",
            response.code
        )));
    }

    let message = best_message(&response);
    let data = response.data.ok_or_else(|| {
        SynthApiError::UnexpectedResponse("code 10000 without data".to_string())
    })?;

    match data.status {
        Some(1) => Ok(StatusOutcome::Processing {
            progress: data.progress.as_ref().map(render_progress),
            message,
        }),
        Some(2) => {
            let result = data.result.ok_or_else(|| {
                SynthApiError::UnexpectedResponse("completed status without result".to_string())
            })?;
            Ok(StatusOutcome::Completed { result, message })
        }
        Some(3) => Ok(StatusOutcome::Failed { message }),
        other => Err(SynthApiError::UnexpectedResponse(format!(
            "unknown data.status {other:?}"
        ))),
    }
}

/// Prefer the inner data message over the envelope message.
fn best_message(response: &StatusResponse) -> String {
    response
        .data
        .as_ref()
        .and_then(|d| d.msg.clone())
        .or_else(|| response.msg.clone())
        .unwrap_or_default()
}

/// The service sends progress as either a number or a string.
fn render_progress(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected { code, .. } => write!(f, "rejected({code})"),
            Self::Processing { .. } => f.write_str("processing"),
            Self::Completed { .. } => f.write_str("completed"),
            Self::Failed { .. } => f.write_str("failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn status_from(json: serde_json::Value) -> Result<StatusOutcome, SynthApiError> {
        map_status(serde_json::from_value(json).unwrap())
    }

    #[test]
    fn accepted_submission_maps_to_accepted() {
        let parsed: SubmitResponse =
            serde_json::from_value(serde_json::json!({"code": 10000, "msg": "ok"})).unwrap();
        assert_eq!(map_submit(parsed), SubmitOutcome::Accepted);
    }

    #[test]
    fn rejected_submission_keeps_code_and_message() {
        let parsed: SubmitResponse =
            serde_json::from_value(serde_json::json!({"code": 10002, "msg": "busy"})).unwrap();
        assert_eq!(
            map_submit(parsed),
            SubmitOutcome::Rejected {
                code: 10002,
                message: "busy".into()
            },
        );
    }

    #[test]
    fn rejected_codes_map_to_rejected() {
        for code in [9999, 10002, 10003] {
            let outcome = status_from(serde_json::json!({"code": code, "msg": "dead"})).unwrap();
            assert_eq!(
                outcome,
                StatusOutcome::Rejected {
                    code,
                    message: "dead".into()
                },
            );
        }
    }

    #[test]
    fn processing_keeps_progress_and_inner_message() {
        let outcome = status_from(serde_json::json!({
            "code": 10000,
            "msg": "ok",
            "data": {"status": 1, "progress": 42, "msg": "rendering"},
        }))
        .unwrap();
        assert_eq!(
            outcome,
            StatusOutcome::Processing {
                progress: Some("42".into()),
                message: "rendering".into()
            },
        );
    }

    #[test]
    fn completed_requires_a_result_path() {
        let outcome = status_from(serde_json::json!({
            "code": 10000,
            "data": {"status": 2, "result": "out/abc.mp4", "msg": "done"},
        }))
        .unwrap();
        assert_eq!(
            outcome,
            StatusOutcome::Completed {
                result: "out/abc.mp4".into(),
                message: "done".into()
            },
        );

        let missing = status_from(serde_json::json!({
            "code": 10000,
            "data": {"status": 2},
        }));
        assert_matches!(missing, Err(SynthApiError::UnexpectedResponse(_)));
    }

    #[test]
    fn remote_reported_failure_maps_to_failed() {
        let outcome = status_from(serde_json::json!({
            "code": 10000,
            "data": {"status": 3, "msg": "face not detected"},
        }))
        .unwrap();
        assert_eq!(
            outcome,
            StatusOutcome::Failed {
                message: "face not detected".into()
            },
        );
    }

    #[test]
    fn unknown_shapes_are_errors_not_guesses() {
        assert_matches!(
            status_from(serde_json::json!({"code": 12345})),
            Err(SynthApiError::UnexpectedResponse(_))
        );
        assert_matches!(
            status_from(serde_json::json!({"code": 10000, "data": {"status": 7}})),
            Err(SynthApiError::UnexpectedResponse(_))
        );
        assert_matches!(
            status_from(serde_json::json!({"code": 10000})),
            Err(SynthApiError::UnexpectedResponse(_))
        );
    }
}
