//! Session and data-fetching state for Hireflow clients.
//!
//! This crate provides:
//! - [`SessionManager`]: signup / OTP / login / logout / refresh and the
//!   persisted session
//! - [`PaginatedResource`] and [`ItemResource`]: list and detail containers
//!   with role gating, generation-checked writes and cancellation
//! - Mutation managers sharing one [`MutationRunner`] pattern
//! - [`DashboardState`] for role-specific statistics
//! - [`Hireflow`]: wiring for all of the above

pub mod access;
pub mod context;
pub mod dashboard;
pub mod detail;
pub mod mutation;
pub mod notify;
pub mod resource;
pub mod session;
pub mod sources;

pub use access::{roles, RoleGate, FORBIDDEN_MESSAGE};
pub use context::Hireflow;
pub use dashboard::{DashboardSnapshot, DashboardState};
pub use detail::{ItemResource, ItemSource, ItemState};
pub use mutation::{
    BusinessPartnerManager, CandidateProfileManager, ExperienceManager, InterviewManager,
    JobManager, MutationRunner, SkillManager,
};
pub use notify::{Level, Notification, NotificationLog, Notifier, TracingNotifier};
pub use resource::{FetchOutcome, PageMode, PageSource, PaginatedResource, ResourceState};
pub use session::{SessionManager, SessionState, EMAIL_NOT_SENT_MESSAGE};
pub use sources::PublicJobs;
