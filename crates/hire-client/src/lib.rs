//! Authenticated REST client for the Hireflow recruiting API.
//!
//! This crate provides:
//! - [`ApiClient`]: bearer-token injection, one refresh-and-retry on 401,
//!   normalized errors and cooperative cancellation
//! - Durable session storage behind [`SessionStore`]
//! - Typed resource clients for jobs, candidates, interviews, business
//!   partners, skills, experience and the dashboard
//! - Request metrics via the `metrics` facade

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod navigation;
pub mod resources;
pub mod storage;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, RATE_LIMIT_MESSAGE, SERVER_ERROR_MESSAGE};
pub use http::{ApiClient, ApiRequest, HealthResponse};
pub use navigation::{
    LogNavigator, Navigator, RecordingNavigator, SessionListener, LOGIN_ROUTE,
};
pub use resources::{
    AuthApi, BusinessPartnersClient, CandidateClient, CandidateSearchClient, DashboardClient,
    ExperienceClient, InterviewsClient, JobsClient, Reply, SkillsClient,
};
pub use storage::{
    FileStore, MemoryStore, SessionStore, SessionStoreExt, StorageError, REFRESH_TOKEN_KEY,
    TOKEN_KEY, USER_KEY,
};

// Re-export so callers need not depend on tokio-util directly.
pub use tokio_util::sync::CancellationToken;
