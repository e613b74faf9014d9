use hire_models::{QueryFilters, Skill, SkillInput};

use super::{fetch_all, item_path, list_keys, validate};
use crate::error::ClientResult;
use crate::http::ApiClient;

const BASE: &str = "/skills";

/// Skills on the signed-in user's profile.
#[derive(Clone)]
pub struct SkillsClient {
    api: ApiClient,
}

impl SkillsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<Skill>> {
        fetch_all(&self.api, "skills.list", BASE, list_keys::SKILLS, &QueryFilters::new()).await
    }

    pub async fn create(&self, input: &SkillInput) -> ClientResult<Skill> {
        validate(input)?;
        self.api.post("skills.create", BASE, input).await
    }

    pub async fn update(&self, id: &str, input: &SkillInput) -> ClientResult<Skill> {
        validate(input)?;
        self.api.put("skills.update", item_path(BASE, id), input).await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.api.delete("skills.delete", item_path(BASE, id)).await
    }
}
