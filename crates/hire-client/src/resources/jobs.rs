//! Job postings.

use hire_models::{Job, JobInput, JobStatus, JobStatusUpdate, Page, QueryFilters};
use tracing::info;

use super::{fetch_page, item_path, list_keys, validate};
use crate::error::ClientResult;
use crate::http::ApiClient;

const BASE: &str = "/jobs";

#[derive(Clone)]
pub struct JobsClient {
    api: ApiClient,
}

impl JobsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, filters: &QueryFilters) -> ClientResult<Page<Job>> {
        fetch_page(&self.api, "jobs.list", BASE, list_keys::JOBS, filters).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Job> {
        self.api
            .get("jobs.get", item_path(BASE, id), &QueryFilters::new())
            .await
    }

    /// Public view of a posting, readable without a session.
    pub async fn get_public(&self, id: &str) -> ClientResult<Job> {
        let path = format!("{}/public", item_path(BASE, id));
        self.api
            .get("jobs.get_public", path, &QueryFilters::new())
            .await
    }

    pub async fn create(&self, input: &JobInput) -> ClientResult<Job> {
        validate(input)?;
        let job: Job = self.api.post("jobs.create", BASE, input).await?;
        info!(job_id = %job.id, "Created job");
        Ok(job)
    }

    pub async fn update(&self, id: &str, input: &JobInput) -> ClientResult<Job> {
        validate(input)?;
        self.api.put("jobs.update", item_path(BASE, id), input).await
    }

    pub async fn update_status(&self, id: &str, status: JobStatus) -> ClientResult<Job> {
        let path = format!("{}/status", item_path(BASE, id));
        self.api
            .patch("jobs.update_status", path, &JobStatusUpdate { status })
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete("jobs.delete", item_path(BASE, id)).await
    }
}
