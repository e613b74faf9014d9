//! Response envelope shared by every API endpoint.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Field-level validation error reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// `{ success, message?, data?, errors? }`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Field errors, empty when the backend sent none.
    pub fn field_errors(&self) -> &[FieldError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Message to show the user: the first field error wins over the
    /// top-level message.
    pub fn error_message(&self) -> Option<&str> {
        self.field_errors()
            .first()
            .map(|e| e.message.as_str())
            .or(self.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_parse_validation_failure() {
        let json = r#"{
            "success": false,
            "message": "Validation failed",
            "errors": [
                {"field": "name", "message": "Name must be between 2 and 255 characters"},
                {"field": "primary_email", "message": "Invalid email"}
            ]
        }"#;
        let resp: ApiResponse<Value> = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.field_errors().len(), 2);
        assert_eq!(
            resp.error_message(),
            Some("Name must be between 2 and 255 characters")
        );
    }

    #[test]
    fn test_message_fallback() {
        let resp: ApiResponse<Value> = ApiResponse::failure("Job not found");
        assert_eq!(resp.error_message(), Some("Job not found"));
        assert!(resp.field_errors().is_empty());
    }

    #[test]
    fn test_success_roundtrip_omits_empty_fields() {
        let resp = ApiResponse::ok(serde_json::json!({"id": "1"}));
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"success":true,"data":{"id":"1"}}"#);
    }
}
