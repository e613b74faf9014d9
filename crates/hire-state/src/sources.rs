//! Resource clients as [`PageSource`] / [`ItemSource`] implementations.

use async_trait::async_trait;
use hire_client::{
    BusinessPartnersClient, CandidateClient, CandidateSearchClient, ClientResult,
    ExperienceClient, InterviewsClient, JobsClient, SkillsClient,
};
use hire_models::{
    BusinessPartner, CandidateProfile, Experience, Interview, Job, Page, Pagination,
    QueryFilters, Skill,
};

use crate::detail::ItemSource;
use crate::resource::PageSource;

/// One synthetic page holding a whole unpaginated list.
fn single_page<T>(items: Vec<T>) -> Page<T> {
    let len = items.len();
    Page::new(items, Pagination::from_counts(1, len.max(1) as u32, len as u64))
}

#[async_trait]
impl PageSource for JobsClient {
    type Item = Job;

    fn name(&self) -> &'static str {
        "jobs"
    }

    async fn fetch_page(&self, filters: &QueryFilters) -> ClientResult<Page<Job>> {
        self.list(filters).await
    }
}

#[async_trait]
impl ItemSource for JobsClient {
    type Item = Job;

    fn name(&self) -> &'static str {
        "job"
    }

    async fn fetch_item(&self, id: &str) -> ClientResult<Job> {
        self.get(id).await
    }
}

/// Public job view, readable without a session.
pub struct PublicJobs(pub JobsClient);

#[async_trait]
impl ItemSource for PublicJobs {
    type Item = Job;

    fn name(&self) -> &'static str {
        "public_job"
    }

    async fn fetch_item(&self, id: &str) -> ClientResult<Job> {
        self.0.get_public(id).await
    }
}

#[async_trait]
impl PageSource for CandidateSearchClient {
    type Item = CandidateProfile;

    fn name(&self) -> &'static str {
        "candidate_search"
    }

    async fn fetch_page(&self, filters: &QueryFilters) -> ClientResult<Page<CandidateProfile>> {
        self.search(filters).await
    }
}

#[async_trait]
impl ItemSource for CandidateSearchClient {
    type Item = CandidateProfile;

    fn name(&self) -> &'static str {
        "candidate_search_item"
    }

    async fn fetch_item(&self, id: &str) -> ClientResult<CandidateProfile> {
        self.get(id).await
    }
}

#[async_trait]
impl ItemSource for CandidateClient {
    type Item = CandidateProfile;

    fn name(&self) -> &'static str {
        "candidate"
    }

    async fn fetch_item(&self, id: &str) -> ClientResult<CandidateProfile> {
        self.get(id).await
    }
}

#[async_trait]
impl PageSource for InterviewsClient {
    type Item = Interview;

    fn name(&self) -> &'static str {
        "interviews"
    }

    async fn fetch_page(&self, filters: &QueryFilters) -> ClientResult<Page<Interview>> {
        self.list(filters).await
    }
}

#[async_trait]
impl ItemSource for InterviewsClient {
    type Item = Interview;

    fn name(&self) -> &'static str {
        "interview"
    }

    async fn fetch_item(&self, id: &str) -> ClientResult<Interview> {
        self.get(id).await
    }
}

#[async_trait]
impl PageSource for BusinessPartnersClient {
    type Item = BusinessPartner;

    fn name(&self) -> &'static str {
        "business_partners"
    }

    async fn fetch_page(&self, filters: &QueryFilters) -> ClientResult<Page<BusinessPartner>> {
        self.list(filters).await
    }
}

#[async_trait]
impl ItemSource for BusinessPartnersClient {
    type Item = BusinessPartner;

    fn name(&self) -> &'static str {
        "business_partner"
    }

    async fn fetch_item(&self, id: &str) -> ClientResult<BusinessPartner> {
        self.get(id).await
    }
}

#[async_trait]
impl PageSource for SkillsClient {
    type Item = Skill;

    fn name(&self) -> &'static str {
        "skills"
    }

    async fn fetch_page(&self, _filters: &QueryFilters) -> ClientResult<Page<Skill>> {
        self.list().await.map(single_page)
    }
}

#[async_trait]
impl PageSource for ExperienceClient {
    type Item = Experience;

    fn name(&self) -> &'static str {
        "experience"
    }

    async fn fetch_page(&self, _filters: &QueryFilters) -> ClientResult<Page<Experience>> {
        self.list().await.map(single_page)
    }
}
