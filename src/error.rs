// Client-side API error taxonomy
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failure of one call through the request pipeline
#[derive(Debug, Error)]
pub enum ApiError {
    // Connection refused, DNS, TLS, timeout
    #[error("Network failure: {0}")]
    Network(String),

    // 401 / 403
    #[error("{message}")]
    AuthenticationRejected { status: u16, message: String },

    // Remaining 4xx, server-provided message
    #[error("{message}")]
    ValidationRejected { status: u16, message: String },

    // 5xx
    #[error("Server error ({status}): {message}")]
    ServerFault { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Request cancelled by navigation")]
    Cancelled,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Classify a non-success HTTP status with its response body
    pub fn from_status(status: u16, body: &Value) -> Self {
        let message = server_message(body).unwrap_or_else(|| {
            StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Request failed")
                .to_string()
        });

        match status {
            401 | 403 => ApiError::AuthenticationRejected { status, message },
            400..=499 => ApiError::ValidationRejected { status, message },
            _ => ApiError::ServerFault { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthenticationRejected { status, .. }
            | ApiError::ValidationRejected { status, .. }
            | ApiError::ServerFault { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_authentication_rejected(&self) -> bool {
        matches!(self, ApiError::AuthenticationRejected { .. })
    }

    /// Short machine-readable code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_FAILURE",
            ApiError::AuthenticationRejected { .. } => "AUTHENTICATION_REJECTED",
            ApiError::ValidationRejected { .. } => "VALIDATION_REJECTED",
            ApiError::ServerFault { .. } => "SERVER_FAULT",
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::Cancelled => "CANCELLED",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}

/// The backend reports errors as `{ "msg": ... }`; fall back to `message`/`error`
fn server_message(body: &Value) -> Option<String> {
    ["msg", "message", "error"]
        .iter()
        .filter_map(|key| body.get(*key))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
        .map(str::to_string)
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_builder() {
            ApiError::InvalidRequest(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
