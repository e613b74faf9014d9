//! Per-resource clients. Each returns the envelope's `data` payload and
//! never retries on its own; the 401 retry lives in [`ApiClient`].

mod auth;
mod business_partners;
mod candidates;
mod dashboard;
mod experience;
mod interviews;
mod jobs;
mod skills;

pub use auth::{AuthApi, Reply};
pub use business_partners::BusinessPartnersClient;
pub use candidates::{CandidateClient, CandidateSearchClient};
pub use dashboard::DashboardClient;
pub use experience::ExperienceClient;
pub use interviews::InterviewsClient;
pub use jobs::JobsClient;
pub use skills::SkillsClient;

use hire_models::{Page, QueryFilters, ValidatedPayload};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientResult;
use crate::http::ApiClient;

/// Keys under which list payloads carry their items.
pub mod list_keys {
    pub const JOBS: &str = "jobs";
    pub const CANDIDATES: &str = "candidates";
    pub const INTERVIEWS: &str = "interviews";
    pub const BUSINESS_PARTNERS: &str = "businessPartners";
    pub const SKILLS: &str = "skills";
    pub const EXPERIENCES: &str = "experiences";
    pub const ACTIVITIES: &str = "activities";
}

/// GET a list endpoint and normalize it into a page.
pub(crate) async fn fetch_page<T: DeserializeOwned>(
    api: &ApiClient,
    operation: &'static str,
    path: &str,
    key: &str,
    filters: &QueryFilters,
) -> ClientResult<Page<T>> {
    let data: Value = api.get(operation, path, filters).await?;
    Ok(Page::from_list_data(data, key, filters)?)
}

/// GET an unpaginated list endpoint.
pub(crate) async fn fetch_all<T: DeserializeOwned>(
    api: &ApiClient,
    operation: &'static str,
    path: &str,
    key: &str,
    filters: &QueryFilters,
) -> ClientResult<Vec<T>> {
    fetch_page(api, operation, path, key, filters)
        .await
        .map(|page| page.items)
}

/// Reject an invalid payload before it reaches the network.
pub(crate) fn validate<P: ValidatedPayload>(payload: &P) -> ClientResult<()> {
    Ok(payload.check()?)
}

/// `base/id` with the id percent-encoded.
pub(crate) fn item_path(base: &str, id: &str) -> String {
    format!("{}/{}", base, urlencoding::encode(id))
}
