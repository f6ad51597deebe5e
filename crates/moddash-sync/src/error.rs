//! Failure taxonomy for the sync layer.
//!
//! Network, HTTP-status and decode failures never leave a controller: they
//! become `FeedStatus::Error` plus one notification.  Validation failures
//! stay inside the submission flow and are shown inline.

use thiserror::Error;

/// A failed request, normalized at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// No usable response: connect failure, reset, or timeout.
    #[error("network error: {message}")]
    Network { message: String },
    /// The backend answered with a non-2xx status.
    #[error("HTTP {status} {status_text}")]
    Status { status: u16, status_text: String },
    /// The body was not the JSON shape we expect.
    #[error("decode failure: {message}")]
    Decode { message: String },
}

impl HttpError {
    /// Status reported for failures that never produced a response.
    pub const NETWORK_STATUS: i32 = 0;
    /// Status reported for bodies that failed to decode.
    pub const DECODE_STATUS: i32 = -1;

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn status(&self) -> i32 {
        match self {
            HttpError::Network { .. } => Self::NETWORK_STATUS,
            HttpError::Status { status, .. } => i32::from(*status),
            HttpError::Decode { .. } => Self::DECODE_STATUS,
        }
    }

    /// Short operator-facing text for error banners.
    pub fn summary(&self) -> String {
        match self {
            HttpError::Network { message } => format!("Backend unreachable ({})", message),
            HttpError::Status {
                status,
                status_text,
            } if status_text.is_empty() => format!("Server returned {}", status),
            HttpError::Status {
                status,
                status_text,
            } => format!("Server returned {} {}", status, status_text),
            HttpError::Decode { .. } => "Malformed response from server".to_string(),
        }
    }
}

/// Client-side rejection of a submission before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("a submission is already in progress")]
    InFlight,
}

impl ValidationError {
    /// Inline message for the submission form.
    pub fn inline_message(&self) -> &'static str {
        match self {
            ValidationError::MissingField { .. } => "Please fill in all required fields",
            ValidationError::InFlight => "Submission already in progress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Http(#[from] HttpError),
}
