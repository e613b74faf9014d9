//! Authentication request and response payloads.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ModelError, ModelResult};
use crate::user::{Role, User};
use crate::validation::ValidatedPayload;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 4, max = 8, message = "OTP must be between 4 and 8 characters"))]
    pub otp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct EmailRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    pub otp: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, JsonSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

impl ValidatedPayload for SignupRequest {
    const FIELD_ORDER: &'static [&'static str] = &["email", "password"];
}

impl ValidatedPayload for VerifyOtpRequest {
    const FIELD_ORDER: &'static [&'static str] = &["email", "otp"];
}

impl ValidatedPayload for EmailRequest {
    const FIELD_ORDER: &'static [&'static str] = &["email"];
}

impl ValidatedPayload for LoginRequest {
    const FIELD_ORDER: &'static [&'static str] = &["email", "password"];
}

impl ValidatedPayload for ResetPasswordRequest {
    const FIELD_ORDER: &'static [&'static str] = &["email", "new_password"];
}

impl ValidatedPayload for ChangePasswordRequest {
    const FIELD_ORDER: &'static [&'static str] = &["new_password"];
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Raw `data` of login / verify-otp / refresh-token responses.
///
/// The backend has shipped the access token as both `token` and
/// `accessToken`; [`AuthData::into_tokens`] is the only place that knows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuthData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(
        default,
        rename = "accessToken",
        alias = "access_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,
    #[serde(
        default,
        rename = "refreshToken",
        alias = "refresh_token",
        skip_serializing_if = "Option::is_none"
    )]
    pub refresh_token: Option<String>,
}

/// Canonical token set after normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl AuthData {
    /// Map the legacy `token` field and `accessToken` onto one access token.
    /// `accessToken` wins when both are present.
    pub fn into_tokens(self) -> ModelResult<(Option<User>, AuthTokens)> {
        let access_token = self
            .access_token
            .or(self.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ModelError::invalid_payload("response carries no access token"))?;

        Ok((
            self.user,
            AuthTokens {
                access_token,
                refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            },
        ))
    }
}

/// `data` of a signup response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SignupData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// `false` when the verification email could not be delivered.
    #[serde(
        default,
        rename = "emailSent",
        alias = "email_sent",
        skip_serializing_if = "Option::is_none"
    )]
    pub email_sent: Option<bool>,
}

impl SignupData {
    pub fn email_failed(&self) -> bool {
        self.email_sent == Some(false)
    }
}
