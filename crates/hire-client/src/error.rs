//! Client error types.

use hire_models::{ApiResponse, FieldError, ModelError};
use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shown instead of the raw error on HTTP 429.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

/// Shown instead of the raw error on HTTP 5xx.
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Errors surfaced by the API client and resource clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Field-level validation failure, from the backend or checked locally.
    #[error("{}", first_field_message(.0))]
    Validation(Vec<FieldError>),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{}", RATE_LIMIT_MESSAGE)]
    RateLimited,

    #[error("{}", SERVER_ERROR_MESSAGE)]
    Server(u16),

    /// Refresh token missing or rejected; the session has been cleared.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ModelError> for ClientError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(errors) => ClientError::Validation(errors),
            ModelError::Json(e) => ClientError::Json(e),
            other => ClientError::InvalidResponse(other.to_string()),
        }
    }
}

impl ClientError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Map a non-success HTTP status and its (optional) envelope to an error.
    ///
    /// 429 and 5xx always map to their fixed messages; the envelope is only
    /// consulted for other statuses.
    pub fn from_http_status(status: u16, body: Option<&ApiResponse<Value>>) -> Self {
        match status {
            429 => return ClientError::RateLimited,
            s if s >= 500 => return ClientError::Server(s),
            _ => {}
        }

        if let Some(body) = body {
            if !body.field_errors().is_empty() {
                return ClientError::Validation(body.field_errors().to_vec());
            }
        }

        let message = body
            .and_then(|b| b.message.clone())
            .unwrap_or_else(|| default_message(status).to_string());

        match status {
            401 => ClientError::Unauthorized(message),
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            _ => ClientError::Api { status, message },
        }
    }

    /// Error for a 2xx response whose envelope says `success: false`.
    pub fn from_unsuccessful(status: u16, body: &ApiResponse<Value>) -> Self {
        if !body.field_errors().is_empty() {
            return ClientError::Validation(body.field_errors().to_vec());
        }
        ClientError::Api {
            status,
            message: body
                .message
                .clone()
                .unwrap_or_else(|| "Request failed".to_string()),
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) | ClientError::SessionExpired(_) => Some(401),
            ClientError::Forbidden(_) => Some(403),
            ClientError::NotFound(_) => Some(404),
            ClientError::Validation(_) => Some(400),
            ClientError::RateLimited => Some(429),
            ClientError::Server(status) => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Text for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(e) if e.is_timeout() => "Request timed out".to_string(),
            other => other.to_string(),
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Validation(errors) => errors,
            _ => &[],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }
}

fn first_field_message(errors: &[FieldError]) -> &str {
    errors
        .first()
        .map(|e| e.message.as_str())
        .unwrap_or("Validation failed")
}

fn default_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Unauthorized",
        403 => "You do not have permission to perform this action",
        404 => "Resource not found",
        409 => "Conflict",
        _ => "Request failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(message: Option<&str>, errors: Vec<FieldError>) -> ApiResponse<Value> {
        ApiResponse {
            success: false,
            message: message.map(str::to_string),
            data: None,
            errors: if errors.is_empty() { None } else { Some(errors) },
        }
    }

    #[test]
    fn test_rate_limit_has_fixed_message() {
        let body = envelope(Some("slow down"), vec![]);
        let err = ClientError::from_http_status(429, Some(&body));
        assert!(matches!(err, ClientError::RateLimited));
        assert_eq!(err.user_message(), RATE_LIMIT_MESSAGE);
        assert_eq!(err.http_status(), Some(429));
    }

    #[test]
    fn test_server_errors_have_fixed_message() {
        for status in [500, 502, 503] {
            let body = envelope(Some("stack trace"), vec![]);
            let err = ClientError::from_http_status(status, Some(&body));
            assert!(matches!(err, ClientError::Server(s) if s == status));
            assert_eq!(err.user_message(), SERVER_ERROR_MESSAGE);
        }
    }

    #[test]
    fn test_validation_first_message_verbatim() {
        let body = envelope(
            Some("Validation failed"),
            vec![
                FieldError::new("name", "Name must be between 2 and 255 characters"),
                FieldError::new("website", "Invalid URL"),
            ],
        );
        let err = ClientError::from_http_status(400, Some(&body));
        assert_eq!(err.user_message(), "Name must be between 2 and 255 characters");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_message_passthrough() {
        let body = envelope(Some("Job is closed"), vec![]);
        let err = ClientError::from_http_status(409, Some(&body));
        assert!(matches!(err, ClientError::Api { status: 409, .. }));
        assert_eq!(err.user_message(), "Job is closed");
    }

    #[test]
    fn test_status_defaults_without_body() {
        assert!(matches!(
            ClientError::from_http_status(404, None),
            ClientError::NotFound(_)
        ));
        assert!(matches!(
            ClientError::from_http_status(401, None),
            ClientError::Unauthorized(_)
        ));
    }

    #[test]
    fn test_model_validation_converts() {
        let err: ClientError =
            ModelError::Validation(vec![FieldError::new("name", "too short")]).into();
        assert_eq!(err.user_message(), "too short");
    }
}
