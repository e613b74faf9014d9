//! Shared data models for the Hireflow recruiting API.
//!
//! This crate provides Serde-serializable types for:
//! - Users, roles and authentication payloads
//! - The `{ success, message, data, errors }` response envelope
//! - Pagination snapshots and query filter objects
//! - Jobs, candidates, interviews, business partners, skills and experience
//! - Dashboard statistics
//! - Request validation rules (the business-partner acceptance contract)

pub mod auth;
pub mod business_partner;
pub mod candidate;
pub mod dashboard;
pub mod envelope;
pub mod error;
pub mod filters;
pub mod interview;
pub mod job;
pub mod pagination;
pub mod profile;
pub mod user;
pub mod validation;

// Re-export common types
pub use auth::{
    AuthData, AuthTokens, ChangePasswordRequest, EmailRequest, LoginRequest, RefreshTokenRequest,
    ResetPasswordRequest, SignupData, SignupRequest, VerifyOtpRequest,
};
pub use business_partner::{
    BusinessPartner, BusinessPartnerFilters, CreateBusinessPartner, PartnerPriority,
    PartnerStatus, UpdateBusinessPartner,
};
pub use candidate::{Availability, CandidateProfile, CandidateProfileUpdate, CandidateSearchFilters};
pub use dashboard::{
    ActivityItem, CandidateStats, ClientStats, DashboardStats, RecruiterStats, VendorStats,
};
pub use envelope::{ApiResponse, FieldError};
pub use error::{ModelError, ModelResult};
pub use filters::QueryFilters;
pub use interview::{
    Interview, InterviewFilters, InterviewInput, InterviewKind, InterviewStatus,
    InterviewStatusUpdate,
};
pub use job::{EmploymentType, Job, JobFilters, JobInput, JobStatus, JobStatusUpdate};
pub use pagination::{Page, Pagination};
pub use profile::{Experience, ExperienceInput, Proficiency, Skill, SkillInput};
pub use user::{Role, User};
pub use validation::ValidatedPayload;
