//! Skills and work experience records attached to a profile.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::ValidatedPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<Proficiency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct SkillInput {
    #[validate(length(min = 1, max = 100, message = "Skill name must be between 1 and 100 characters"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proficiency: Option<Proficiency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(max = 60, message = "Years of experience must be at most 60"))]
    pub years_of_experience: Option<u32>,
}

impl ValidatedPayload for SkillInput {
    const FIELD_ORDER: &'static [&'static str] = &["name", "years_of_experience"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
#[validate(schema(function = "validate_dates"))]
pub struct ExperienceInput {
    #[validate(length(min = 1, max = 255, message = "Company must be between 1 and 255 characters"))]
    pub company: String,
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn validate_dates(input: &ExperienceInput) -> Result<(), validator::ValidationError> {
    if let Some(end) = input.end_date {
        if input.is_current {
            return Err(validator::ValidationError::new("end_date")
                .with_message("A current position cannot have an end date".into()));
        }
        if end < input.start_date {
            return Err(validator::ValidationError::new("end_date")
                .with_message("End date must be after start date".into()));
        }
    }
    Ok(())
}

impl ValidatedPayload for ExperienceInput {
    const FIELD_ORDER: &'static [&'static str] = &["company", "title", "__all__"];
}
