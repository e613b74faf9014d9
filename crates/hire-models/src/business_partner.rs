//! Business partners (leads, clients, vendors) and their validation contract.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{normalize_email, validate_phone, ValidatedPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    #[default]
    Active,
    Inactive,
    Prospect,
    OnHold,
}

impl PartnerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerStatus::Active => "active",
            PartnerStatus::Inactive => "inactive",
            PartnerStatus::Prospect => "prospect",
            PartnerStatus::OnHold => "on_hold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartnerPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl PartnerPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerPriority::Low => "low",
            PartnerPriority::Medium => "medium",
            PartnerPriority::High => "high",
            PartnerPriority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BusinessPartner {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub status: PartnerStatus,
    #[serde(default)]
    pub priority: PartnerPriority,
    #[serde(default)]
    pub is_lead: bool,
    #[serde(default)]
    pub is_client: bool,
    #[serde(default)]
    pub is_vendor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /business-partners`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct CreateBusinessPartner {
    #[validate(length(min = 2, max = 255, message = "Name must be between 2 and 255 characters"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please provide a valid email"))]
    pub primary_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub primary_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Please provide a valid website URL"))]
    pub website: Option<String>,
    #[serde(default)]
    pub status: PartnerStatus,
    #[serde(default)]
    pub priority: PartnerPriority,
    #[serde(default)]
    pub is_lead: bool,
    #[serde(default)]
    pub is_client: bool,
    #[serde(default)]
    pub is_vendor: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "State must be at most 100 characters"))]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateBusinessPartner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Trim text fields, lower-case the email and drop blank optionals.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.primary_email = blank_to_none(self.primary_email).map(|e| normalize_email(&e));
        self.primary_phone = blank_to_none(self.primary_phone);
        self.website = blank_to_none(self.website);
        self.industry = blank_to_none(self.industry);
        self.city = blank_to_none(self.city);
        self.state = blank_to_none(self.state);
        self.country = blank_to_none(self.country);
        self.notes = blank_to_none(self.notes);
        self
    }
}

impl ValidatedPayload for CreateBusinessPartner {
    const FIELD_ORDER: &'static [&'static str] = PARTNER_FIELD_ORDER;
}

/// Body of `PUT /business-partners/:id`. Every field is optional; present
/// fields follow the same rules as on create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, JsonSchema)]
pub struct UpdateBusinessPartner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 255, message = "Name must be between 2 and 255 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please provide a valid email"))]
    pub primary_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub primary_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Please provide a valid website URL"))]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PartnerStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PartnerPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_lead: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_client: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_vendor: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "State must be at most 100 characters"))]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl UpdateBusinessPartner {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|n| n.trim().to_string());
        self.primary_email = blank_to_none(self.primary_email).map(|e| normalize_email(&e));
        self.primary_phone = blank_to_none(self.primary_phone);
        self.website = blank_to_none(self.website);
        self.industry = blank_to_none(self.industry);
        self.city = blank_to_none(self.city);
        self.state = blank_to_none(self.state);
        self.country = blank_to_none(self.country);
        self.notes = blank_to_none(self.notes);
        self
    }
}

impl ValidatedPayload for UpdateBusinessPartner {
    const FIELD_ORDER: &'static [&'static str] = PARTNER_FIELD_ORDER;
}

const PARTNER_FIELD_ORDER: &[&str] = &[
    "name",
    "primary_email",
    "primary_phone",
    "website",
    "status",
    "priority",
    "is_lead",
    "is_client",
    "is_vendor",
    "city",
    "state",
    "country",
    "assigned_to",
];

/// Query filters for `GET /business-partners`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BusinessPartnerFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PartnerStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<PartnerPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_lead: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_client: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_vendor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Uuid>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
