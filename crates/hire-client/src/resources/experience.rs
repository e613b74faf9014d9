use hire_models::{Experience, ExperienceInput, QueryFilters};

use super::{fetch_all, item_path, list_keys, validate};
use crate::error::ClientResult;
use crate::http::ApiClient;

const BASE: &str = "/experience";

/// Work history on the signed-in user's profile.
#[derive(Clone)]
pub struct ExperienceClient {
    api: ApiClient,
}

impl ExperienceClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<Experience>> {
        fetch_all(
            &self.api,
            "experience.list",
            BASE,
            list_keys::EXPERIENCES,
            &QueryFilters::new(),
        )
        .await
    }

    pub async fn create(&self, input: &ExperienceInput) -> ClientResult<Experience> {
        validate(input)?;
        self.api.post("experience.create", BASE, input).await
    }

    pub async fn update(&self, id: &str, input: &ExperienceInput) -> ClientResult<Experience> {
        validate(input)?;
        self.api
            .put("experience.update", item_path(BASE, id), input)
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api
            .delete("experience.delete", item_path(BASE, id))
            .await
    }
}
