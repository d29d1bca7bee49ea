use std::fmt;

use thiserror::Error;

use super::envelope::{Envelope, FieldError};

/// Failure classes a caller of the request pipeline can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthExpired,
    NotFound,
    ValidationError,
    BusinessError,
    NetworkError,
    InvalidResponse,
}

impl ErrorKind {
    /// Whether the pipeline itself shows a notice for this kind.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ErrorKind::NotFound | ErrorKind::ValidationError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::AuthExpired => "AuthExpired",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::BusinessError => "BusinessError",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::InvalidResponse => "InvalidResponse",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Session expired: {0}")]
    AuthExpired(String),

    #[error("Not found: {}", .envelope.msg)]
    NotFound { envelope: Envelope },

    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    #[error("{message}")]
    Business { code: i64, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::AuthExpired(_) => ErrorKind::AuthExpired,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Validation { .. } => ErrorKind::ValidationError,
            ApiError::Business { .. } => ErrorKind::BusinessError,
            ApiError::Network(_) => ErrorKind::NetworkError,
            ApiError::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }

    /// Whether the calling view can do something useful with this failure.
    /// A business failure depends on its message, so it is reported as
    /// recoverable and left to the view.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ApiError::AuthExpired(_))
    }

    /// Human-readable message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::AuthExpired(message)
            | ApiError::Network(message)
            | ApiError::InvalidResponse(message) => message,
            ApiError::NotFound { envelope } => &envelope.msg,
            ApiError::Validation { message, .. } | ApiError::Business { message, .. } => message,
        }
    }

    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Network(format!("Request timed out: {}", e))
        } else {
            ApiError::Network(e.to_string())
        }
    }
}
