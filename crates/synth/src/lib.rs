//! Clients for the two remote synthesis services.
//!
//! [`video`] talks to the GPU-backed video-synthesis API (submission and
//! status polling); [`speech`] talks to the text-to-speech API. Both are
//! opaque remote systems reached over HTTP; their response shapes are
//! modelled as closed variants so the scheduler's state machine stays
//! exhaustive.

pub mod speech;
pub mod video;

/// Errors from the remote synthesis API layer.
#[derive(Debug, thiserror::Error)]
pub enum SynthApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("synthesis API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but the body fits no known shape.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(String),
}
