//! Role-specific dashboard data.

use hire_models::{ActivityItem, DashboardStats, QueryFilters, Role};
use serde_json::Value;

use super::{fetch_all, list_keys};
use crate::error::ClientResult;
use crate::http::ApiClient;

/// Default number of activity entries requested.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 10;

#[derive(Clone)]
pub struct DashboardClient {
    api: ApiClient,
}

impl DashboardClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Statistics for the signed-in user. The payload is untagged on the
    /// wire; `role` picks its shape.
    pub async fn stats(&self, role: Role) -> ClientResult<DashboardStats> {
        let data: Value = self
            .api
            .get("dashboard.stats", "/dashboard/stats", &QueryFilters::new())
            .await?;
        Ok(DashboardStats::from_role_data(role, data)?)
    }

    pub async fn activity(&self, limit: Option<u32>) -> ClientResult<Vec<ActivityItem>> {
        let filters =
            QueryFilters::new().with("limit", limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT));
        fetch_all(
            &self.api,
            "dashboard.activity",
            "/dashboard/activity",
            list_keys::ACTIVITIES,
            &filters,
        )
        .await
    }
}
