//! Model error types.

use thiserror::Error;

use crate::envelope::FieldError;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{}", first_message(.0))]
    Validation(Vec<FieldError>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }
}

fn first_message(errors: &[FieldError]) -> &str {
    errors
        .first()
        .map(|e| e.message.as_str())
        .unwrap_or("Validation failed")
}
