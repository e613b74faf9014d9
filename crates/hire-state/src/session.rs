//! Session manager: the only owner of the signed-in user.
//!
//! Built once with its collaborators and driven through an explicit
//! `init` / `teardown` lifecycle. Together with the client's refresh path it
//! is the only writer of the `token`, `refreshToken` and `user` keys.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hire_client::{
    AuthApi, ClientError, ClientResult, SessionListener, SessionStore, SessionStoreExt,
    REFRESH_TOKEN_KEY, TOKEN_KEY,
};
use hire_models::{
    AuthData, ChangePasswordRequest, EmailRequest, LoginRequest, ResetPasswordRequest, Role,
    SignupData, SignupRequest, User, VerifyOtpRequest,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::notify::Notifier;

/// Shown when signup succeeded but the verification email bounced.
pub const EMAIL_NOT_SENT_MESSAGE: &str =
    "Account created, but we could not send the verification email. Please request a new code.";

/// In-memory session snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub user: Option<User>,
    #[serde(skip)]
    pub token: Option<String>,
    pub loading: bool,
    pub initialized: bool,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

pub struct SessionManager {
    auth: AuthApi,
    store: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    /// The store is the one the auth client's [`hire_client::ApiClient`]
    /// reads its bearer token from.
    pub fn new(auth: AuthApi, notifier: Arc<dyn Notifier>) -> Self {
        let store = Arc::clone(auth.api().store());
        Self {
            auth,
            store,
            notifier,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Shared manager registered with the auth client, so refreshes made by
    /// any request keep the in-memory session in step with storage.
    pub fn shared(auth: AuthApi, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        let api = auth.api().clone();
        let session = Arc::new(Self::new(auth, notifier));
        api.add_session_listener(&session);
        session
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore the persisted session without a server round-trip.
    ///
    /// Both user and token present: authenticated. Unparseable user or only
    /// one of the two present: storage is cleared and the session starts
    /// signed out.
    pub fn init(&self) -> SessionState {
        let token = self.store.access_token();
        let (user, corrupt) = match self.store.user() {
            Ok(user) => (user, false),
            Err(e) => {
                warn!("Stored user does not parse, clearing session: {}", e);
                (None, true)
            }
        };

        let restored = match (user, token) {
            (Some(user), Some(token)) => {
                info!(user_id = %user.id, role = %user.role, "Restored session");
                SessionState {
                    user: Some(user),
                    token: Some(token),
                    loading: false,
                    initialized: true,
                }
            }
            (user, token) => {
                if corrupt || user.is_some() || token.is_some() {
                    debug!("Partial session in storage, clearing");
                    self.clear_storage();
                }
                SessionState {
                    initialized: true,
                    ..Default::default()
                }
            }
        };

        *self.lock() = restored.clone();
        restored
    }

    /// Drop in-memory state. Storage is left alone so a later `init`
    /// restores the session.
    pub fn teardown(&self) {
        *self.lock() = SessionState::default();
        debug!("Session manager torn down");
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.lock().role()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Signed in with one of `allowed`.
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.lock()
            .user
            .as_ref()
            .is_some_and(|u| u.has_role(allowed))
    }

    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Register an account. Does not sign in; the user verifies by OTP next.
    pub async fn signup(&self, request: SignupRequest) -> ClientResult<SignupData> {
        let reply = self.with_loading(self.auth.signup(&request)).await;
        let reply = self.notify_failure(reply)?;

        if reply.data.email_failed() {
            warn!(email = %request.email, "Verification email was not sent");
            self.notifier.warning(EMAIL_NOT_SENT_MESSAGE);
        } else {
            self.notifier.success(
                reply
                    .message
                    .as_deref()
                    .unwrap_or("Account created. Check your email for the verification code."),
            );
        }
        Ok(reply.data)
    }

    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> ClientResult<User> {
        let reply = self.with_loading(self.auth.verify_otp(&request)).await;
        let reply = self.notify_failure(reply)?;
        let user = self.notify_failure(self.establish(reply.data))?;

        self.notifier.success(
            reply
                .message
                .as_deref()
                .unwrap_or("Email verified successfully"),
        );
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> ClientResult<User> {
        let reply = self.with_loading(self.auth.login(&request)).await;
        let reply = self.notify_failure(reply)?;
        let user = self.notify_failure(self.establish(reply.data))?;

        self.notifier
            .success(reply.message.as_deref().unwrap_or("Logged in successfully"));
        Ok(user)
    }

    /// Sign out. The backend call is best-effort; local state is always
    /// cleared.
    pub async fn logout(&self) {
        let refresh_token = self.store.refresh_token();
        if self.store.access_token().is_some() {
            if let Err(e) = self
                .with_loading(self.auth.logout(refresh_token.as_deref()))
                .await
            {
                warn!("Logout request failed, clearing local session anyway: {}", e);
            }
        }

        self.sign_out_locally();
        self.clear_storage();
        info!("Logged out");
        self.notifier.info("Logged out");
    }

    /// Explicit token refresh. On failure the session is cleared and the
    /// error returned.
    pub async fn refresh_token(&self) -> ClientResult<String> {
        match self.auth.refresh_token().await {
            Ok(token) => {
                self.lock().token = Some(token.clone());
                Ok(token)
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                // The client already cleared storage; keep memory in step.
                self.sign_out_locally();
                self.clear_storage();
                Err(e)
            }
        }
    }

    /// Optimistically switch the cached user's role and persist it.
    pub fn update_user_role(&self, role: Role) -> ClientResult<User> {
        let mut state = self.lock();
        let user = state
            .user
            .as_mut()
            .ok_or_else(|| ClientError::Unauthorized("No user is signed in".to_string()))?;

        user.role = role;
        let updated = user.clone();
        drop(state);

        self.store.store_user(&updated)?;
        debug!(user_id = %updated.id, %role, "Updated cached user role");
        Ok(updated)
    }

    pub async fn resend_otp(&self, email: impl Into<String>) -> ClientResult<()> {
        let request = EmailRequest {
            email: email.into(),
        };
        let message = self.with_loading(self.auth.resend_otp(&request)).await;
        let message = self.notify_failure(message)?;
        self.notifier
            .success(message.as_deref().unwrap_or("Verification code sent"));
        Ok(())
    }

    pub async fn forgot_password(&self, email: impl Into<String>) -> ClientResult<()> {
        let request = EmailRequest {
            email: email.into(),
        };
        let message = self.with_loading(self.auth.forgot_password(&request)).await;
        let message = self.notify_failure(message)?;
        self.notifier
            .success(message.as_deref().unwrap_or("Password reset code sent"));
        Ok(())
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> ClientResult<()> {
        let message = self.with_loading(self.auth.reset_password(&request)).await;
        let message = self.notify_failure(message)?;
        self.notifier
            .success(message.as_deref().unwrap_or("Password reset successfully"));
        Ok(())
    }

    pub async fn change_password(&self, request: ChangePasswordRequest) -> ClientResult<()> {
        let message = self.with_loading(self.auth.change_password(&request)).await;
        let message = self.notify_failure(message)?;
        self.notifier
            .success(message.as_deref().unwrap_or("Password changed successfully"));
        Ok(())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Persist tokens and user from an auth response and mark the session
    /// signed in.
    fn establish(&self, data: AuthData) -> ClientResult<User> {
        let (user, tokens) = data.into_tokens()?;
        let user = user.ok_or_else(|| {
            ClientError::invalid_response("authentication response carries no user")
        })?;

        self.store.set(TOKEN_KEY, &tokens.access_token)?;
        match &tokens.refresh_token {
            Some(refresh) => self.store.set(REFRESH_TOKEN_KEY, refresh)?,
            None => self.store.remove(REFRESH_TOKEN_KEY)?,
        }
        self.store.store_user(&user)?;

        info!(user_id = %user.id, role = %user.role, "Signed in");
        let mut state = self.lock();
        state.user = Some(user.clone());
        state.token = Some(tokens.access_token);
        state.initialized = true;
        Ok(user)
    }

    fn sign_out_locally(&self) {
        *self.lock() = SessionState {
            initialized: true,
            ..Default::default()
        };
    }

    async fn with_loading<T, F>(&self, fut: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        self.lock().loading = true;
        let result = fut.await;
        self.lock().loading = false;
        result
    }

    fn notify_failure<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(e) = &result {
            if !e.is_cancelled() {
                self.notifier.error(&e.user_message());
            }
        }
        result
    }

    fn clear_storage(&self) {
        if let Err(e) = self.store.clear_session() {
            warn!("Failed to clear stored session: {}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionListener for SessionManager {
    fn token_refreshed(&self, token: &str) {
        let mut state = self.lock();
        if state.user.is_some() {
            state.token = Some(token.to_string());
        }
    }

    fn session_ended(&self) {
        if self.is_authenticated() {
            info!("Session ended by failed token refresh");
        }
        self.sign_out_locally();
    }
}
