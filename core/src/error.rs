//! Error types for the fetch shim.
//!
//! # Design
//! Caller-misuse variants are produced by `normalize` before anything
//! reaches the network, so callers can pre-validate cheaply. Envelope and
//! transport failures come back from `resolve` / `fetch`. Network failure
//! keeps one fixed message on every host so callers can match on it
//! uniformly. An upstream error response is not an error here: the
//! resolver rebuilds it as a normal `HttpResponse`.

use thiserror::Error;

/// Message shared by every network-failure signal.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network request failed";

/// Errors returned by the request normalizer and response resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A pre-built POST request was passed without an options bag, so the
    /// body needed for the GET fallback is out of reach.
    #[error("rexxar fetch POST error: pass the body in `init` for HTTP POST, not a prebuilt request")]
    PostRequestWithoutInit,

    /// POST with a content type other than URL-encoded form data.
    #[error("rexxar fetch POST error: only supports `application/x-www-form-urlencoded` as content-type, got `{content_type}`")]
    UnsupportedContentType { content_type: String },

    /// Form content type, but the body has no string form.
    #[error("rexxar fetch POST error: cannot handle this body type")]
    UnsupportedBody,

    /// The host reported a network failure (marker or status 999).
    #[error("{}", NETWORK_FAILURE_MESSAGE)]
    NetworkFailure,

    /// An `_error_` envelope carrying neither known marker.
    #[error("Unknown error type")]
    UnknownErrorType,

    /// The `_error_` value is not valid JSON.
    #[error("malformed host error envelope: {0}")]
    MalformedEnvelope(String),

    /// The envelope carried a status no response can have.
    #[error("host error envelope carried invalid status {0}")]
    InvalidStatus(String),

    /// The transport itself failed before producing a response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// True for errors raised before any network call.
    pub fn is_caller_misuse(&self) -> bool {
        matches!(
            self,
            FetchError::PostRequestWithoutInit
                | FetchError::UnsupportedContentType { .. }
                | FetchError::UnsupportedBody
        )
    }

    pub fn is_network_failure(&self) -> bool {
        matches!(self, FetchError::NetworkFailure)
    }
}
