//! Authenticated HTTP client.
//!
//! Single point of outbound configuration:
//! - Base URL plus the `/api/v1` prefix, JSON headers, 10 s timeout
//! - Bearer token from the session store on every request
//! - One refresh-and-retry on 401, with single-flight refresh
//! - Fixed messages for 429 and 5xx
//! - Optional cancellation token honored by every suspending call

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Instant;

use hire_models::{ApiResponse, AuthData, QueryFilters, RefreshTokenRequest};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::metrics::{record_refresh, record_request};
use crate::navigation::{Navigator, SessionListener};
use crate::storage::{SessionStore, SessionStoreExt, REFRESH_TOKEN_KEY, TOKEN_KEY};

// =============================================================================
// Request
// =============================================================================

/// A request against a path under the API prefix.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    operation: &'static str,
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    refresh_on_unauthorized: bool,
}

impl ApiRequest {
    /// `operation` labels logs and metrics, e.g. `"jobs.list"`.
    pub fn new(operation: &'static str, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            refresh_on_unauthorized: true,
        }
    }

    pub fn get(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::GET, path)
    }

    pub fn post(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::POST, path)
    }

    pub fn put(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::PUT, path)
    }

    pub fn patch(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::PATCH, path)
    }

    pub fn delete(operation: &'static str, path: impl Into<String>) -> Self {
        Self::new(operation, Method::DELETE, path)
    }

    /// Attach filters; absent and empty values are dropped.
    pub fn query(mut self, filters: &QueryFilters) -> Self {
        self.query = filters.to_query_pairs();
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Let a 401 through untouched. Used by credential endpoints, where a
    /// 401 means "wrong credentials" rather than "expired token".
    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Per-request state carried across the retry.
#[derive(Debug, Default)]
struct RequestContext {
    retried: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// =============================================================================
// Client
// =============================================================================

struct Inner {
    http: Client,
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    listeners: RwLock<Vec<Weak<dyn SessionListener>>>,
    refresh_lock: Mutex<()>,
}

/// Authenticated API client. Cheap to clone; clones share the connection
/// pool, the session store and the refresh lock.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
    cancel: Option<CancellationToken>,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .default_headers(headers)
            .user_agent(concat!("hire-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                store,
                navigator,
                listeners: RwLock::new(Vec::new()),
                refresh_lock: Mutex::new(()),
            }),
            cancel: None,
        })
    }

    /// Create from environment variables.
    pub fn from_env(
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        Self::new(ClientConfig::from_env(), store, navigator)
    }

    /// A client whose calls abort with [`ClientError::Cancelled`] once
    /// `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            cancel: Some(token),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    /// Register `listener` for refresh outcomes. Held weakly; dropped
    /// listeners are pruned on the next notification.
    pub fn add_session_listener<L: SessionListener + 'static>(&self, listener: &Arc<L>) {
        let weak: Weak<dyn SessionListener> = Arc::downgrade(listener) as Weak<L>;
        self.inner
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(weak);
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// Send a request and decode the envelope's `data`.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let envelope = self.send_envelope(request).await?;
        decode_data(envelope.data)
    }

    /// Send a request and return the whole success envelope.
    pub async fn send_envelope(&self, request: ApiRequest) -> ClientResult<ApiResponse<Value>> {
        let span = info_span!(
            "api_request",
            operation = request.operation,
            method = %request.method,
            path = %request.path
        );

        let start = Instant::now();
        let result = self.execute(&request).instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(0),
        };
        record_request(request.operation, status, latency_ms);

        result
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: impl Into<String>,
        filters: &QueryFilters,
    ) -> ClientResult<T> {
        self.send(ApiRequest::get(operation, path).query(filters)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: impl Into<String>,
        body: &B,
    ) -> ClientResult<T> {
        self.send(ApiRequest::post(operation, path).json(body)?).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: impl Into<String>,
        body: &B,
    ) -> ClientResult<T> {
        self.send(ApiRequest::put(operation, path).json(body)?).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        operation: &'static str,
        path: impl Into<String>,
        body: &B,
    ) -> ClientResult<T> {
        self.send(ApiRequest::patch(operation, path).json(body)?).await
    }

    /// DELETE; any `data` in the response is ignored.
    pub async fn delete(&self, operation: &'static str, path: impl Into<String>) -> ClientResult<()> {
        self.send_envelope(ApiRequest::delete(operation, path))
            .await
            .map(|_| ())
    }

    /// Check if the API is up. Unauthenticated, outside the version prefix.
    pub async fn health_check(&self) -> ClientResult<bool> {
        let url = self.inner.config.root_url("/health");

        let sent = self
            .guard(async { self.inner.http.get(&url).send().await.map_err(ClientError::from) })
            .await;

        match sent {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(matches!(
                    health.status.to_ascii_lowercase().as_str(),
                    "ok" | "healthy"
                ))
            }
            Ok(response) => {
                warn!("API health check failed: {}", response.status());
                Ok(false)
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                warn!("API health check error: {}", e);
                Ok(false)
            }
        }
    }

    // =========================================================================
    // Token refresh
    // =========================================================================

    /// Exchange the stored refresh token for a new access token.
    ///
    /// On failure the stored session is cleared, the navigator is sent to
    /// the login route and the failure is returned.
    pub async fn refresh_access_token(&self) -> ClientResult<String> {
        let _guard = self.guard(async { Ok(self.inner.refresh_lock.lock().await) }).await?;
        self.refresh_locked().await
    }

    /// Refresh after a 401 on a request sent with `stale`. Waiters that find
    /// the token already replaced reuse it.
    async fn refresh_after_unauthorized(&self, stale: Option<&str>) -> ClientResult<String> {
        let _guard = self.guard(async { Ok(self.inner.refresh_lock.lock().await) }).await?;

        if let Some(current) = self.inner.store.access_token() {
            if stale != Some(current.as_str()) {
                debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        self.refresh_locked().await
    }

    async fn refresh_locked(&self) -> ClientResult<String> {
        match self.exchange_refresh_token().await {
            Ok(token) => {
                record_refresh("success");
                debug!("Refreshed access token");
                self.notify_listeners(|l| l.token_refreshed(&token));
                Ok(token)
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                record_refresh("failure");
                warn!("Token refresh failed, ending session: {}", e);
                if let Err(clear_err) = self.inner.store.clear_session() {
                    warn!("Failed to clear stored session: {}", clear_err);
                }
                self.notify_listeners(|l| l.session_ended());
                self.inner.navigator.redirect_to_login();
                Err(e)
            }
        }
    }

    async fn exchange_refresh_token(&self) -> ClientResult<String> {
        let refresh_token = self
            .inner
            .store
            .refresh_token()
            .ok_or_else(|| ClientError::SessionExpired("No refresh token available".to_string()))?;

        let url = self.inner.config.api_url("/auth/refresh-token");
        let body = RefreshTokenRequest { refresh_token };

        let response = self
            .guard(async {
                self.inner
                    .http
                    .post(&url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(ClientError::from)
            })
            .await?;
        let status = response.status();

        let envelope = self
            .guard(read_envelope(status, response))
            .await
            .map_err(|e| match e {
                ClientError::Cancelled => ClientError::Cancelled,
                other => ClientError::SessionExpired(other.user_message()),
            })?;

        let data: AuthData = match envelope.data {
            Some(value) => serde_json::from_value(value)?,
            None => AuthData::default(),
        };
        let (_, tokens) = data
            .into_tokens()
            .map_err(|e| ClientError::SessionExpired(e.to_string()))?;

        self.inner.store.set(TOKEN_KEY, &tokens.access_token)?;
        if let Some(rotated) = &tokens.refresh_token {
            self.inner.store.set(REFRESH_TOKEN_KEY, rotated)?;
        }

        Ok(tokens.access_token)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    async fn execute(&self, request: &ApiRequest) -> ClientResult<ApiResponse<Value>> {
        let mut ctx = RequestContext::default();

        loop {
            let token = self.inner.store.access_token();
            let response = self.dispatch(request, token.as_deref()).await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED
                && request.refresh_on_unauthorized
                && !ctx.retried
            {
                ctx.retried = true;
                debug!("Received 401, refreshing token and retrying once");
                self.refresh_after_unauthorized(token.as_deref()).await?;
                continue;
            }

            return self.guard(read_envelope(status, response)).await;
        }
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> ClientResult<reqwest::Response> {
        let url = self.inner.config.api_url(&request.path);
        let mut builder = self.inner.http.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        self.guard(async { builder.send().await.map_err(ClientError::from) })
            .await
    }

    fn notify_listeners(&self, notify: impl Fn(&dyn SessionListener)) {
        let live: Vec<Arc<dyn SessionListener>> = {
            let mut listeners = self
                .inner
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            listeners.retain(|l| l.strong_count() > 0);
            listeners.iter().filter_map(Weak::upgrade).collect()
        };
        for listener in live {
            notify(listener.as_ref());
        }
    }

    /// Race `fut` against this client's cancellation token.
    async fn guard<T, F>(&self, fut: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ClientError::Cancelled),
                result = fut => result,
            },
            None => fut.await,
        }
    }
}

/// Turn a response into a success envelope or a normalized error.
async fn read_envelope(
    status: StatusCode,
    response: reqwest::Response,
) -> ClientResult<ApiResponse<Value>> {
    let bytes = response.bytes().await?;
    let body: Option<ApiResponse<Value>> = if bytes.is_empty() {
        None
    } else {
        serde_json::from_slice(&bytes).ok()
    };

    if !status.is_success() {
        return Err(ClientError::from_http_status(status.as_u16(), body.as_ref()));
    }

    match body {
        Some(envelope) if envelope.success => Ok(envelope),
        Some(envelope) => Err(ClientError::from_unsuccessful(status.as_u16(), &envelope)),
        None if bytes.is_empty() => Ok(ApiResponse {
            success: true,
            message: None,
            data: None,
            errors: None,
        }),
        None => Err(ClientError::invalid_response(format!(
            "{} response is not a JSON envelope",
            status
        ))),
    }
}

fn decode_data<T: DeserializeOwned>(data: Option<Value>) -> ClientResult<T> {
    Ok(serde_json::from_value(data.unwrap_or(Value::Null))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let filters = QueryFilters::page(1, 5).with("search", "");
        let req = ApiRequest::get("jobs.list", "/jobs").query(&filters);
        assert_eq!(req.operation(), "jobs.list");
        assert_eq!(req.path(), "/jobs");
        assert_eq!(
            req.query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "5".to_string())
            ]
        );
        assert!(req.refresh_on_unauthorized);
        assert!(!req.without_refresh().refresh_on_unauthorized);
    }

    #[test]
    fn test_decode_missing_data_as_unit() {
        let unit: () = decode_data(None).unwrap();
        assert_eq!(unit, ());
        let missing: ClientResult<Vec<String>> = decode_data(None);
        assert!(missing.is_err());
    }
}
