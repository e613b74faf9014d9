//! Candidate search (hiring side) and the candidate's own profile.

use hire_models::{CandidateProfile, CandidateProfileUpdate, Page, QueryFilters};

use super::{fetch_page, item_path, list_keys, validate};
use crate::error::ClientResult;
use crate::http::ApiClient;

const SEARCH_BASE: &str = "/candidate-search";
const CANDIDATE_BASE: &str = "/candidate";

#[derive(Clone)]
pub struct CandidateSearchClient {
    api: ApiClient,
}

impl CandidateSearchClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn search(&self, filters: &QueryFilters) -> ClientResult<Page<CandidateProfile>> {
        fetch_page(
            &self.api,
            "candidates.search",
            SEARCH_BASE,
            list_keys::CANDIDATES,
            filters,
        )
        .await
    }

    pub async fn get(&self, id: &str) -> ClientResult<CandidateProfile> {
        self.api
            .get("candidates.search_get", item_path(SEARCH_BASE, id), &QueryFilters::new())
            .await
    }
}

#[derive(Clone)]
pub struct CandidateClient {
    api: ApiClient,
}

impl CandidateClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Profile of the signed-in candidate.
    pub async fn profile(&self) -> ClientResult<CandidateProfile> {
        self.api
            .get("candidate.profile", "/candidate/profile", &QueryFilters::new())
            .await
    }

    pub async fn update_profile(
        &self,
        update: &CandidateProfileUpdate,
    ) -> ClientResult<CandidateProfile> {
        validate(update)?;
        self.api
            .put("candidate.update_profile", "/candidate/profile", update)
            .await
    }

    pub async fn get(&self, id: &str) -> ClientResult<CandidateProfile> {
        self.api
            .get("candidate.get", item_path(CANDIDATE_BASE, id), &QueryFilters::new())
            .await
    }
}
