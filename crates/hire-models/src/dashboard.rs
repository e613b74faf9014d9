//! Dashboard statistics and activity feed.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelResult;
use crate::user::Role;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CandidateStats {
    #[serde(alias = "applications")]
    pub total_applications: u64,
    pub active_applications: u64,
    pub upcoming_interviews: u64,
    pub profile_completion: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RecruiterStats {
    pub open_jobs: u64,
    pub total_candidates: u64,
    pub total_submissions: u64,
    pub upcoming_interviews: u64,
    pub placements: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VendorStats {
    pub active_requirements: u64,
    pub submitted_candidates: u64,
    pub interviews_scheduled: u64,
    pub placements: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientStats {
    pub posted_jobs: u64,
    pub received_submissions: u64,
    pub interviews_scheduled: u64,
    pub hires: u64,
}

/// Dashboard statistics, one variant per role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum DashboardStats {
    Candidate(CandidateStats),
    Recruiter(RecruiterStats),
    Vendor(VendorStats),
    Client(ClientStats),
}

impl DashboardStats {
    /// Interpret the untagged `data` of `GET /dashboard/stats` for `role`.
    /// A nested `stats` object is unwrapped first.
    pub fn from_role_data(role: Role, data: Value) -> ModelResult<Self> {
        let data = match data {
            Value::Object(mut map) if map.get("stats").is_some_and(Value::is_object) => {
                map.remove("stats").unwrap_or(Value::Null)
            }
            other => other,
        };
        let data = if data.is_null() { Value::Object(Default::default()) } else { data };

        Ok(match role {
            Role::Candidate => DashboardStats::Candidate(serde_json::from_value(data)?),
            Role::Recruiter => DashboardStats::Recruiter(serde_json::from_value(data)?),
            Role::Vendor => DashboardStats::Vendor(serde_json::from_value(data)?),
            Role::Client => DashboardStats::Client(serde_json::from_value(data)?),
        })
    }

    pub fn role(&self) -> Role {
        match self {
            DashboardStats::Candidate(_) => Role::Candidate,
            DashboardStats::Recruiter(_) => Role::Recruiter,
            DashboardStats::Vendor(_) => Role::Vendor,
            DashboardStats::Client(_) => Role::Client,
        }
    }
}

/// One entry of `GET /dashboard/activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
