//! Interview scheduling.

use hire_models::{
    Interview, InterviewInput, InterviewStatus, InterviewStatusUpdate, Page, QueryFilters,
};

use super::{fetch_page, item_path, list_keys, validate};
use crate::error::ClientResult;
use crate::http::ApiClient;

const BASE: &str = "/interviews";

#[derive(Clone)]
pub struct InterviewsClient {
    api: ApiClient,
}

impl InterviewsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, filters: &QueryFilters) -> ClientResult<Page<Interview>> {
        fetch_page(&self.api, "interviews.list", BASE, list_keys::INTERVIEWS, filters).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Interview> {
        self.api
            .get("interviews.get", item_path(BASE, id), &QueryFilters::new())
            .await
    }

    pub async fn create(&self, input: &InterviewInput) -> ClientResult<Interview> {
        validate(input)?;
        self.api.post("interviews.create", BASE, input).await
    }

    pub async fn update(&self, id: &str, input: &InterviewInput) -> ClientResult<Interview> {
        validate(input)?;
        self.api
            .put("interviews.update", item_path(BASE, id), input)
            .await
    }

    pub async fn update_status(
        &self,
        id: &str,
        status: InterviewStatus,
    ) -> ClientResult<Interview> {
        let path = format!("{}/status", item_path(BASE, id));
        self.api
            .patch("interviews.update_status", path, &InterviewStatusUpdate { status })
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api
            .delete("interviews.delete", item_path(BASE, id))
            .await
    }
}
