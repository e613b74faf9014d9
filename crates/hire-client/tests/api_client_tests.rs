//! HTTP behavior of the API client against a mock backend.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hire_client::{
    ApiClient, BusinessPartnersClient, CancellationToken, ClientConfig, ClientError, JobsClient,
    MemoryStore, RecordingNavigator, SessionStore, SessionStoreExt, LOGIN_ROUTE,
    RATE_LIMIT_MESSAGE, REFRESH_TOKEN_KEY, SERVER_ERROR_MESSAGE, SessionListener, TOKEN_KEY,
    USER_KEY,
};
use hire_models::{CreateBusinessPartner, QueryFilters};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    server: MockServer,
    store: Arc<MemoryStore>,
    navigator: Arc<RecordingNavigator>,
    api: ApiClient,
}

async fn harness() -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(RecordingNavigator::new());
    let api = ApiClient::new(
        ClientConfig::new(server.uri()),
        store.clone(),
        navigator.clone(),
    )
    .unwrap();
    Harness {
        server,
        store,
        navigator,
        api,
    }
}

/// Records refresh outcomes reported by the client.
#[derive(Default)]
struct Events(Mutex<Vec<String>>);

impl Events {
    fn seen(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl SessionListener for Events {
    fn token_refreshed(&self, token: &str) {
        self.0.lock().unwrap().push(format!("refreshed:{}", token));
    }

    fn session_ended(&self) {
        self.0.lock().unwrap().push("ended".to_string());
    }
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn jobs_page() -> Value {
    json!({
        "jobs": [{ "id": "j1", "title": "Rust Engineer" }],
        "pagination": {
            "currentPage": 1, "totalPages": 1, "totalItems": 1, "itemsPerPage": 10
        }
    })
}

#[tokio::test]
async fn test_bearer_token_attached() {
    let h = harness().await;
    h.store.set(TOKEN_KEY, "t1").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(ok(jobs_page()))
        .expect(1)
        .mount(&h.server)
        .await;

    let page = JobsClient::new(h.api.clone())
        .list(&QueryFilters::new())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "Rust Engineer");
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .respond_with(ok(jobs_page()))
        .mount(&h.server)
        .await;

    JobsClient::new(h.api.clone())
        .list(&QueryFilters::new())
        .await
        .unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_query_string_from_filters() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .respond_with(ok(jobs_page()))
        .mount(&h.server)
        .await;

    let filters = QueryFilters::page(1, 5)
        .with("search", "")
        .with("status", "open");
    JobsClient::new(h.api.clone()).list(&filters).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("page=1&limit=5&status=open"));
}

#[tokio::test]
async fn test_unauthorized_refreshes_once_and_retries() {
    let h = harness().await;
    h.store.set(TOKEN_KEY, "old").unwrap();
    h.store.set(REFRESH_TOKEN_KEY, "r1").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "r1" })))
        .respond_with(ok(json!({ "accessToken": "new", "refreshToken": "r2" })))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ok(jobs_page()))
        .expect(1)
        .mount(&h.server)
        .await;

    let page = JobsClient::new(h.api.clone())
        .list(&QueryFilters::new())
        .await
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(h.store.access_token().as_deref(), Some("new"));
    assert_eq!(h.store.refresh_token().as_deref(), Some("r2"));
    assert!(h.navigator.routes().is_empty());
}

#[tokio::test]
async fn test_second_unauthorized_is_not_retried() {
    let h = harness().await;
    h.store.set(TOKEN_KEY, "old").unwrap();
    h.store.set(REFRESH_TOKEN_KEY, "r1").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false, "message": "Invalid token"
        })))
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh-token"))
        .respond_with(ok(json!({ "token": "new" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = JobsClient::new(h.api.clone())
        .list(&QueryFilters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized(ref m) if m == "Invalid token"));
}

#[tokio::test]
async fn test_failed_refresh_clears_session_and_redirects() {
    let h = harness().await;
    h.store.set(TOKEN_KEY, "old").unwrap();
    h.store.set(REFRESH_TOKEN_KEY, "revoked").unwrap();
    h.store
        .set(USER_KEY, r#"{"id":"u1","email":"a@b.co","role":"recruiter"}"#)
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false, "message": "Refresh token revoked"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let err = JobsClient::new(h.api.clone())
        .list(&QueryFilters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired(ref m) if m == "Refresh token revoked"));
    assert!(h.store.get(TOKEN_KEY).is_none());
    assert!(h.store.get(REFRESH_TOKEN_KEY).is_none());
    assert!(h.store.get(USER_KEY).is_none());
    assert_eq!(h.navigator.last_route().as_deref(), Some(LOGIN_ROUTE));
}

#[tokio::test]
async fn test_missing_refresh_token_skips_refresh_call() {
    let h = harness().await;
    h.store.set(TOKEN_KEY, "old").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh-token"))
        .respond_with(ok(json!({ "token": "new" })))
        .expect(0)
        .mount(&h.server)
        .await;

    let err = JobsClient::new(h.api.clone())
        .list(&QueryFilters::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::SessionExpired(_)));
    assert!(h.store.get(TOKEN_KEY).is_none());
    assert_eq!(h.navigator.last_route().as_deref(), Some(LOGIN_ROUTE));
}

#[tokio::test]
async fn test_concurrent_unauthorized_share_one_refresh() {
    let h = harness().await;
    h.store.set(TOKEN_KEY, "old").unwrap();
    h.store.set(REFRESH_TOKEN_KEY, "r1").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .and(header("Authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh-token"))
        .respond_with(ok(json!({ "accessToken": "new" })).set_delay(Duration::from_millis(100)))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .and(header("Authorization", "Bearer new"))
        .respond_with(ok(jobs_page()))
        .expect(3)
        .mount(&h.server)
        .await;

    let jobs = JobsClient::new(h.api.clone());
    let filters = QueryFilters::new();
    let (a, b, c) = tokio::join!(
        jobs.list(&filters),
        jobs.list(&filters),
        jobs.list(&filters)
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(h.store.access_token().as_deref(), Some("new"));
}

#[tokio::test]
async fn test_rate_limit_and_server_errors_use_fixed_messages() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "success": false, "message": "bucket empty"
        })))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/jobs/j1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&h.server)
        .await;

    let jobs = JobsClient::new(h.api.clone());

    let rate_limited = jobs.list(&QueryFilters::new()).await.unwrap_err();
    assert_eq!(rate_limited.user_message(), RATE_LIMIT_MESSAGE);

    let server = jobs.get("j1").await.unwrap_err();
    assert!(matches!(server, ClientError::Server(502)));
    assert_eq!(server.user_message(), SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_unsuccessful_envelope_on_ok_status() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs/j9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false, "message": "Job not visible"
        })))
        .mount(&h.server)
        .await;

    let err = JobsClient::new(h.api.clone()).get("j9").await.unwrap_err();
    assert_eq!(err.user_message(), "Job not visible");
}

#[tokio::test]
async fn test_partner_list_normalized() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/business-partners"))
        .respond_with(ok(json!({
            "businessPartners": [
                { "id": "p1", "name": "Acme Staffing", "status": "prospect" },
                { "id": "p2", "name": "Globex", "is_vendor": true }
            ],
            "pagination": {
                "currentPage": 1, "totalPages": 3, "totalItems": 25, "itemsPerPage": 10
            }
        })))
        .mount(&h.server)
        .await;

    let page = BusinessPartnersClient::new(h.api.clone())
        .list(&QueryFilters::page(1, 10))
        .await
        .unwrap();

    let names: Vec<_> = page.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Acme Staffing", "Globex"]);
    assert!(page.pagination.has_next_page);
    assert!(!page.pagination.has_prev_page);
}

#[tokio::test]
async fn test_invalid_partner_never_sent() {
    let h = harness().await;

    let err = BusinessPartnersClient::new(h.api.clone())
        .create(CreateBusinessPartner::new("A"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Name must be between 2 and 255 characters");
    assert!(h.server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_backend_validation_message_surfaced() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/business-partners"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "Validation failed",
            "errors": [{ "field": "name", "message": "Name must be between 2 and 255 characters" }]
        })))
        .mount(&h.server)
        .await;

    let err = BusinessPartnersClient::new(h.api.clone())
        .create(CreateBusinessPartner::new("Acme"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Name must be between 2 and 255 characters");
    assert_eq!(err.field_errors()[0].field, "name");
}

#[tokio::test]
async fn test_health_check() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "OK" })))
        .mount(&h.server)
        .await;

    assert!(h.api.health_check().await.unwrap());
}

#[tokio::test]
async fn test_health_check_unhealthy() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    assert!(!h.api.health_check().await.unwrap());
}

#[tokio::test]
async fn test_cancellation_aborts_in_flight_request() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/jobs"))
        .respond_with(ok(jobs_page()).set_delay(Duration::from_secs(5)))
        .mount(&h.server)
        .await;

    let token = CancellationToken::new();
    let jobs = JobsClient::new(h.api.with_cancellation(token.clone()));

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let started = Instant::now();
    let err = jobs.list(&QueryFilters::new()).await.unwrap_err();
    canceller.await.unwrap();

    assert!(err.is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_listeners_hear_refresh_outcomes() {
    let h = harness().await;
    let events = Arc::new(Events::default());
    h.api.add_session_listener(&events);
    h.store.set(TOKEN_KEY, "old").unwrap();
    h.store.set(REFRESH_TOKEN_KEY, "r1").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh-token"))
        .respond_with(ok(json!({ "accessToken": "new" })))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    assert_eq!(h.api.refresh_access_token().await.unwrap(), "new");
    assert!(h.api.refresh_access_token().await.is_err());

    assert_eq!(events.seen(), vec!["refreshed:new".to_string(), "ended".to_string()]);
}

#[tokio::test]
async fn test_dropped_listener_is_not_called() {
    let h = harness().await;
    let events = Arc::new(Events::default());
    h.api.add_session_listener(&events);
    drop(events);

    // No refresh token: fails locally and notifies nobody.
    assert!(h.api.refresh_access_token().await.is_err());
    assert_eq!(h.navigator.last_route().as_deref(), Some(LOGIN_ROUTE));
}
