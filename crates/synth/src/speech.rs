//! REST client for the text-to-speech service.
//!
//! A single blocking invoke endpoint: the request carries the speaker id,
//! the text and the cloning reference audio, the response body is the raw
//! WAV bytes.

use async_trait::async_trait;
use serde::Serialize;

use crate::SynthApiError;

/// A speech-synthesis invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest {
    /// Voice identifier on the remote service.
    pub speaker: String,
    pub text: String,
    /// Output container; the pipeline always asks for `wav`.
    pub format: String,
    /// Remote URL of the cloning reference audio.
    pub reference_audio: String,
    /// Transcript of the reference audio.
    pub reference_text: String,
    /// Streaming is pinned off; the whole clip comes back in one body.
    pub streaming: i32,
}

impl SpeechRequest {
    pub fn new(
        speaker: String,
        text: String,
        reference_audio: String,
        reference_text: String,
    ) -> Self {
        Self {
            speaker,
            text,
            format: "wav".to_string(),
            reference_audio,
            reference_text,
            streaming: 0,
        }
    }
}

/// Seam for the text-to-speech service.
#[async_trait]
pub trait SpeechSynthesis: Send + Sync {
    /// Synthesize `request.text`, returning the audio bytes.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SynthApiError>;
}

/// HTTP client for the text-to-speech service.
pub struct HttpSpeechApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpeechApi {
    /// Create a new client.
    ///
    /// * `base_url` - e.g. `http://host:18180`, no trailing slash.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SpeechSynthesis for HttpSpeechApi {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SynthApiError> {
        tracing::debug!(speaker = %request.speaker, chars = request.text.len(), "invoking speech synthesis");
        let response = self
            .client
            .post(format!("{}/v1/invoke", self.base_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SynthApiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(SynthApiError::UnexpectedResponse(
                "empty audio body".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_pins_wav_and_disables_streaming() {
        let request = SpeechRequest::new(
            "voice-7".into(),
            "hello".into(),
            "http://files/audio/ref.wav".into(),
            "reference transcript".into(),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["format"], "wav");
        assert_eq!(value["streaming"], 0);
        assert_eq!(value["speaker"], "voice-7");
    }
}
