//! Authentication endpoints under `/auth`.

use hire_models::{
    AuthData, ChangePasswordRequest, EmailRequest, LoginRequest, ResetPasswordRequest,
    SignupData, SignupRequest, VerifyOtpRequest,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use super::validate;
use crate::error::ClientResult;
use crate::http::{ApiClient, ApiRequest};

/// Decoded `data` plus the envelope's message, for callers that show it.
#[derive(Debug, Clone)]
pub struct Reply<T> {
    pub data: T,
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct AuthApi {
    api: ApiClient,
}

impl AuthApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<Reply<SignupData>> {
        validate(request)?;
        info!(role = %request.role, "Signing up");
        self.credential_call("auth.signup", "/auth/signup", request)
            .await
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> ClientResult<Reply<AuthData>> {
        validate(request)?;
        self.credential_call("auth.verify_otp", "/auth/verify-otp", request)
            .await
    }

    pub async fn resend_otp(&self, request: &EmailRequest) -> ClientResult<Option<String>> {
        validate(request)?;
        let reply: Reply<Value> = self
            .credential_call("auth.resend_otp", "/auth/resend-otp", request)
            .await?;
        Ok(reply.message)
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<Reply<AuthData>> {
        validate(request)?;
        self.credential_call("auth.login", "/auth/login", request)
            .await
    }

    /// Tell the backend to revoke `refresh_token`. Authenticated call.
    pub async fn logout(&self, refresh_token: Option<&str>) -> ClientResult<()> {
        let body = match refresh_token {
            Some(token) => json!({ "refreshToken": token }),
            None => json!({}),
        };
        self.api
            .send_envelope(ApiRequest::post("auth.logout", "/auth/logout").json(&body)?)
            .await
            .map(|_| ())
    }

    pub async fn forgot_password(&self, request: &EmailRequest) -> ClientResult<Option<String>> {
        validate(request)?;
        let reply: Reply<Value> = self
            .credential_call("auth.forgot_password", "/auth/forgot-password", request)
            .await?;
        Ok(reply.message)
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> ClientResult<Option<String>> {
        validate(request)?;
        let reply: Reply<Value> = self
            .credential_call("auth.reset_password", "/auth/reset-password", request)
            .await?;
        Ok(reply.message)
    }

    /// Authenticated; an expired token goes through the normal refresh path.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ClientResult<Option<String>> {
        validate(request)?;
        let envelope = self
            .api
            .send_envelope(
                ApiRequest::post("auth.change_password", "/auth/change-password").json(request)?,
            )
            .await?;
        Ok(envelope.message)
    }

    /// Exchange the stored refresh token for a new access token.
    pub async fn refresh_token(&self) -> ClientResult<String> {
        self.api.refresh_access_token().await
    }

    /// POST to an unauthenticated credential endpoint. A 401 here means bad
    /// credentials, so it is not routed through the token refresh.
    async fn credential_call<B, T>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> ClientResult<Reply<T>>
    where
        B: Serialize,
        T: DeserializeOwned + Default,
    {
        let request = ApiRequest::post(operation, path).json(body)?.without_refresh();
        let envelope = self.api.send_envelope(request).await?;
        let data = match envelope.data {
            Some(Value::Null) | None => T::default(),
            Some(value) => serde_json::from_value(value)?,
        };
        Ok(Reply {
            data,
            message: envelope.message,
        })
    }
}
