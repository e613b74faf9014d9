//! Wiring: one API client and session manager, containers on demand.

use std::sync::Arc;

use hire_client::{
    ApiClient, AuthApi, BusinessPartnersClient, CandidateClient, CandidateSearchClient,
    DashboardClient, ExperienceClient, InterviewsClient, JobsClient, SkillsClient,
};
use hire_models::Role;

use crate::access::{roles, RoleGate};
use crate::dashboard::DashboardState;
use crate::detail::ItemResource;
use crate::mutation::{
    BusinessPartnerManager, CandidateProfileManager, ExperienceManager, InterviewManager,
    JobManager, MutationRunner, SkillManager,
};
use crate::notify::Notifier;
use crate::resource::PaginatedResource;
use crate::session::SessionManager;
use crate::sources::PublicJobs;

/// Shared handles for building state containers.
#[derive(Clone)]
pub struct Hireflow {
    api: ApiClient,
    session: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
}

impl Hireflow {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        let session = SessionManager::shared(AuthApi::new(api.clone()), Arc::clone(&notifier));
        Self {
            api,
            session,
            notifier,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    fn gate(&self, allowed: &[Role]) -> RoleGate {
        RoleGate::new(Arc::clone(&self.session), allowed)
    }

    fn runner(&self, allowed: &[Role]) -> MutationRunner {
        MutationRunner::new(self.gate(allowed), Arc::clone(&self.notifier))
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub fn jobs(&self) -> PaginatedResource<JobsClient> {
        PaginatedResource::new(JobsClient::new(self.api.clone()), Arc::clone(&self.notifier))
    }

    pub fn candidate_search(&self) -> PaginatedResource<CandidateSearchClient> {
        PaginatedResource::new(
            CandidateSearchClient::new(self.api.clone()),
            Arc::clone(&self.notifier),
        )
        .with_gate(self.gate(roles::CANDIDATE_SEARCH))
    }

    pub fn interviews(&self) -> PaginatedResource<InterviewsClient> {
        PaginatedResource::new(
            InterviewsClient::new(self.api.clone()),
            Arc::clone(&self.notifier),
        )
    }

    pub fn business_partners(&self) -> PaginatedResource<BusinessPartnersClient> {
        PaginatedResource::new(
            BusinessPartnersClient::new(self.api.clone()),
            Arc::clone(&self.notifier),
        )
        .with_gate(self.gate(roles::BUSINESS_PARTNERS))
    }

    pub fn skills(&self) -> PaginatedResource<SkillsClient> {
        PaginatedResource::new(SkillsClient::new(self.api.clone()), Arc::clone(&self.notifier))
            .with_gate(self.gate(roles::CANDIDATE_PROFILE))
    }

    pub fn experience(&self) -> PaginatedResource<ExperienceClient> {
        PaginatedResource::new(
            ExperienceClient::new(self.api.clone()),
            Arc::clone(&self.notifier),
        )
        .with_gate(self.gate(roles::CANDIDATE_PROFILE))
    }

    // =========================================================================
    // Single entities
    // =========================================================================

    pub fn job(&self) -> ItemResource<JobsClient> {
        ItemResource::new(JobsClient::new(self.api.clone()), Arc::clone(&self.notifier))
    }

    pub fn public_job(&self) -> ItemResource<PublicJobs> {
        ItemResource::new(
            PublicJobs(JobsClient::new(self.api.clone())),
            Arc::clone(&self.notifier),
        )
    }

    pub fn candidate(&self) -> ItemResource<CandidateClient> {
        ItemResource::new(CandidateClient::new(self.api.clone()), Arc::clone(&self.notifier))
            .with_gate(self.gate(roles::CANDIDATE_SEARCH))
    }

    pub fn interview(&self) -> ItemResource<InterviewsClient> {
        ItemResource::new(
            InterviewsClient::new(self.api.clone()),
            Arc::clone(&self.notifier),
        )
    }

    pub fn business_partner(&self) -> ItemResource<BusinessPartnersClient> {
        ItemResource::new(
            BusinessPartnersClient::new(self.api.clone()),
            Arc::clone(&self.notifier),
        )
        .with_gate(self.gate(roles::BUSINESS_PARTNERS))
    }

    pub fn dashboard(&self) -> DashboardState {
        DashboardState::new(
            DashboardClient::new(self.api.clone()),
            Arc::clone(&self.session),
            Arc::clone(&self.notifier),
        )
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub fn business_partner_manager(&self) -> BusinessPartnerManager {
        BusinessPartnerManager::new(
            BusinessPartnersClient::new(self.api.clone()),
            self.runner(roles::BUSINESS_PARTNERS),
        )
    }

    pub fn job_manager(&self) -> JobManager {
        JobManager::new(
            JobsClient::new(self.api.clone()),
            self.runner(roles::JOB_MANAGEMENT),
        )
    }

    pub fn interview_manager(&self) -> InterviewManager {
        InterviewManager::new(
            InterviewsClient::new(self.api.clone()),
            self.runner(roles::INTERVIEW_MANAGEMENT),
        )
    }

    pub fn skill_manager(&self) -> SkillManager {
        SkillManager::new(
            SkillsClient::new(self.api.clone()),
            self.runner(roles::CANDIDATE_PROFILE),
        )
    }

    pub fn experience_manager(&self) -> ExperienceManager {
        ExperienceManager::new(
            ExperienceClient::new(self.api.clone()),
            self.runner(roles::CANDIDATE_PROFILE),
        )
    }

    pub fn candidate_profile_manager(&self) -> CandidateProfileManager {
        CandidateProfileManager::new(
            CandidateClient::new(self.api.clone()),
            self.runner(roles::CANDIDATE_PROFILE),
        )
    }
}
