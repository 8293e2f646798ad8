//! Error taxonomy of the webhook handler and its HTTP mapping.

use crate::signature::SignatureError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Terminal outcome of a webhook request that did not reach the callback.
///
/// Every variant maps to exactly one HTTP status. The `Display` text is the
/// plain-text response body. Only [`BodyUnreadable`](Self::BodyUnreadable) and
/// [`DecodeFailure`](Self::DecodeFailure) pass through text from elsewhere;
/// all other messages are fixed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WebhookError {
    /// The request did not use `POST`.
    ///
    /// Maps to: `405 Method Not Allowed`
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The body could not be read or exceeded the size cap.
    ///
    /// Maps to: `500 Internal Server Error`
    #[error("{message}")]
    BodyUnreadable { message: String },

    /// Neither `X-Hub-Signature` nor `X-Gitea-Signature` was present.
    ///
    /// Maps to: `401 Unauthorized`
    #[error("missing signature header (X-Hub-Signature or X-Gitea-Signature)")]
    MissingSignature,

    /// A signature header was malformed or did not match the body.
    ///
    /// Maps to: `401 Unauthorized`
    #[error("invalid signature header")]
    InvalidSignature,

    /// The decoder rejected the payload. Carries the decoder's own message.
    ///
    /// Maps to: `400 Bad Request`
    #[error("{message}")]
    DecodeFailure { message: String },

    /// The decoder does not handle this event type.
    ///
    /// Maps to: `501 Not Implemented`
    #[error("event type not supported")]
    UnsupportedEventType,
}

impl WebhookError {
    /// HTTP status sent for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BodyUnreadable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingSignature | Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::DecodeFailure { .. } => StatusCode::BAD_REQUEST,
            Self::UnsupportedEventType => StatusCode::NOT_IMPLEMENTED,
        }
    }

    /// Returns `true` for failures caused by the sender rather than this server.
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<SignatureError> for WebhookError {
    fn from(error: SignatureError) -> Self {
        match error {
            SignatureError::Missing => Self::MissingSignature,
            SignatureError::Invalid => Self::InvalidSignature,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
