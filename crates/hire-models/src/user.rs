//! User accounts and roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Role a user signed up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Candidate,
    Recruiter,
    Vendor,
    Client,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Candidate, Role::Recruiter, Role::Vendor, Role::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Recruiter => "recruiter",
            Role::Vendor => "vendor",
            Role::Client => "client",
        }
    }

    /// Roles that hire, as opposed to candidates looking for work.
    pub fn is_hiring_side(&self) -> bool {
        !matches!(self, Role::Candidate)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "candidate" => Ok(Role::Candidate),
            "recruiter" => Ok(Role::Recruiter),
            "vendor" => Ok(Role::Vendor),
            "client" => Ok(Role::Client),
            other => Err(ModelError::UnknownRole(other.to_string())),
        }
    }
}

/// Authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name for display, falling back to the email address.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.to_string(),
            (None, Some(last)) => last.to_string(),
            (None, None) => self.email.clone(),
        }
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u-1".to_string(),
            email: "jane@example.com".to_string(),
            role: Role::Recruiter,
            email_verified: true,
            first_name: Some("Jane".to_string()),
            last_name: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Recruiter".parse::<Role>().unwrap(), Role::Recruiter);
        assert_eq!(" vendor ".parse::<Role>().unwrap(), Role::Vendor);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
        let role: Role = serde_json::from_str("\"candidate\"").unwrap();
        assert_eq!(role, Role::Candidate);
    }

    #[test]
    fn test_user_deserialize_minimal() {
        let json = r#"{"id":"1","email":"a@b.co","role":"candidate"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.email_verified);
        assert_eq!(user.display_name(), "a@b.co");
    }

    #[test]
    fn test_display_name_and_roles() {
        let user = user();
        assert_eq!(user.display_name(), "Jane");
        assert!(user.has_role(&[Role::Recruiter, Role::Client]));
        assert!(!user.has_role(&[Role::Candidate]));
    }
}
