//! Interview scheduling.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::ValidatedPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
    NoShow,
}

impl InterviewStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, InterviewStatus::Completed | InterviewStatus::Cancelled | InterviewStatus::NoShow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InterviewKind {
    Phone,
    Video,
    Onsite,
    Technical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Interview {
    pub id: String,
    pub job_id: String,
    pub candidate_id: String,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<InterviewKind>,
    #[serde(default)]
    pub status: InterviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn default_duration() -> u32 {
    60
}

/// Body of `POST /interviews` and `PUT /interviews/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct InterviewInput {
    #[validate(length(min = 1, message = "Job is required"))]
    pub job_id: String,
    #[validate(length(min = 1, message = "Candidate is required"))]
    pub candidate_id: String,
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 15, max = 480, message = "Duration must be between 15 and 480 minutes"))]
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<InterviewKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Please provide a valid meeting link"))]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ValidatedPayload for InterviewInput {
    const FIELD_ORDER: &'static [&'static str] =
        &["job_id", "candidate_id", "duration_minutes", "meeting_link"];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct InterviewStatusUpdate {
    pub status: InterviewStatus,
}

/// Query filters for `GET /interviews`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InterviewFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InterviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interview_defaults() {
        let json = r#"{
            "id": "i1", "job_id": "j1", "candidate_id": "c1",
            "scheduled_at": "2026-03-01T15:00:00Z"
        }"#;
        let interview: Interview = serde_json::from_str(json).unwrap();
        assert_eq!(interview.duration_minutes, 60);
        assert_eq!(interview.status, InterviewStatus::Scheduled);
        assert!(!interview.status.is_final());
    }

    #[test]
    fn test_duration_bounds() {
        let input = InterviewInput {
            job_id: "j1".to_string(),
            candidate_id: "c1".to_string(),
            scheduled_at: Utc::now(),
            duration_minutes: 5,
            interview_type: Some(InterviewKind::Video),
            meeting_link: None,
            notes: None,
        };
        assert!(input.check().is_err());
    }
}
