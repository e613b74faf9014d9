//! Client-side role gating.
//!
//! A UX guard only: the backend makes the authoritative check.

use std::sync::Arc;

use hire_models::Role;

use crate::session::SessionManager;

/// Shown when a gated mutation is attempted by the wrong role.
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action";

/// Roles allowed per resource.
pub mod roles {
    use hire_models::Role;

    pub const CANDIDATE_SEARCH: &[Role] = &[Role::Recruiter];
    pub const BUSINESS_PARTNERS: &[Role] = &[Role::Recruiter];
    pub const JOB_MANAGEMENT: &[Role] = &[Role::Recruiter, Role::Client];
    pub const INTERVIEW_MANAGEMENT: &[Role] = &[Role::Recruiter, Role::Client];
    pub const CANDIDATE_PROFILE: &[Role] = &[Role::Candidate];
}

/// Optional allowed-role set checked against the session's user.
#[derive(Clone, Default)]
pub struct RoleGate {
    pub(crate) session: Option<Arc<SessionManager>>,
    pub(crate) allowed: Option<Vec<Role>>,
}

impl RoleGate {
    /// Gate that lets everything through.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn new(session: Arc<SessionManager>, allowed: &[Role]) -> Self {
        Self {
            session: Some(session),
            allowed: Some(allowed.to_vec()),
        }
    }

    pub fn allowed(&self) -> Option<&[Role]> {
        self.allowed.as_deref()
    }

    /// Whether the current user may proceed. Without a role set every
    /// caller passes; with one, a signed-out caller never does.
    pub fn permits(&self) -> bool {
        match (&self.allowed, &self.session) {
            (None, _) => true,
            (Some(allowed), Some(session)) => session.has_role(allowed),
            (Some(_), None) => false,
        }
    }
}
