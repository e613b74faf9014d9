//! Create / update / delete flows.
//!
//! Every mutation runs the same steps: role check, shared loading flag, the
//! call, a success or failure notification, and loading cleared on every
//! exit path. Entities come back as `Option`, deletes as `bool`.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use hire_client::{
    BusinessPartnersClient, CandidateClient, ClientError, ClientResult, ExperienceClient,
    InterviewsClient, JobsClient, SkillsClient,
};
use hire_models::{
    BusinessPartner, CandidateProfile, CandidateProfileUpdate, CreateBusinessPartner,
    Experience, ExperienceInput, Interview, InterviewInput, InterviewStatus, Job, JobInput,
    JobStatus, Skill, SkillInput, UpdateBusinessPartner,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::access::{RoleGate, FORBIDDEN_MESSAGE};
use crate::notify::Notifier;

/// Decrements the in-flight counter when dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared runner behind every mutation manager.
pub struct MutationRunner {
    gate: RoleGate,
    notifier: Arc<dyn Notifier>,
    cancel: CancellationToken,
    in_flight: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

impl MutationRunner {
    pub fn new(gate: RoleGate, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gate,
            notifier,
            cancel: CancellationToken::new(),
            in_flight: AtomicUsize::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// True while any mutation of this runner is running.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Message of the most recent failure, cleared by the next success.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Run `call` and return its value, or `None` after notifying the failure.
    pub async fn run<T, F>(&self, action: &'static str, success: &str, call: F) -> Option<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        self.execute(action, Some(success), call).await
    }

    /// Like [`run`](Self::run) for reads: call failures are reported the
    /// same way, while success and a refused role are silent.
    pub async fn read<T, F>(&self, action: &'static str, call: F) -> Option<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if !self.gate.permits() {
            debug!(action, "Read skipped by role gate");
            return None;
        }
        self.execute(action, None, call).await
    }

    async fn execute<T, F>(&self, action: &'static str, success: Option<&str>, call: F) -> Option<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if !self.gate.permits() {
            debug!(action, "Mutation blocked by role gate");
            self.fail(ClientError::forbidden(FORBIDDEN_MESSAGE));
            return None;
        }

        let _in_flight = InFlight::enter(&self.in_flight);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            result = call => result,
        };

        match result {
            Ok(value) => {
                self.set_error(None);
                if let Some(success) = success {
                    self.notifier.success(success);
                }
                Some(value)
            }
            Err(ClientError::Cancelled) => None,
            Err(e) => {
                warn!(action, "Mutation failed: {}", e);
                self.fail(e);
                None
            }
        }
    }

    /// Like [`run`](Self::run) for calls without a result entity.
    pub async fn run_unit<F>(&self, action: &'static str, success: &str, call: F) -> bool
    where
        F: Future<Output = ClientResult<()>>,
    {
        self.run(action, success, call).await.is_some()
    }

    fn fail(&self, err: ClientError) {
        let message = err.user_message();
        self.set_error(Some(message.clone()));
        self.notifier.error(&message);
    }

    fn set_error(&self, error: Option<String>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }
}

impl Drop for MutationRunner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// =============================================================================
// Managers
// =============================================================================

pub struct BusinessPartnerManager {
    client: BusinessPartnersClient,
    runner: MutationRunner,
}

impl BusinessPartnerManager {
    pub fn new(client: BusinessPartnersClient, runner: MutationRunner) -> Self {
        Self { client, runner }
    }

    pub fn runner(&self) -> &MutationRunner {
        &self.runner
    }

    pub async fn create(&self, input: CreateBusinessPartner) -> Option<BusinessPartner> {
        self.runner
            .run(
                "business_partners.create",
                "Business partner created successfully",
                self.client.create(input),
            )
            .await
    }

    pub async fn update(&self, id: &str, input: UpdateBusinessPartner) -> Option<BusinessPartner> {
        self.runner
            .run(
                "business_partners.update",
                "Business partner updated successfully",
                self.client.update(id, input),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.runner
            .run_unit(
                "business_partners.delete",
                "Business partner deleted successfully",
                self.client.delete(id),
            )
            .await
    }
}

pub struct JobManager {
    client: JobsClient,
    runner: MutationRunner,
}

impl JobManager {
    pub fn new(client: JobsClient, runner: MutationRunner) -> Self {
        Self { client, runner }
    }

    pub fn runner(&self) -> &MutationRunner {
        &self.runner
    }

    pub async fn create(&self, input: &JobInput) -> Option<Job> {
        self.runner
            .run("jobs.create", "Job created successfully", self.client.create(input))
            .await
    }

    pub async fn update(&self, id: &str, input: &JobInput) -> Option<Job> {
        self.runner
            .run("jobs.update", "Job updated successfully", self.client.update(id, input))
            .await
    }

    pub async fn update_status(&self, id: &str, status: JobStatus) -> Option<Job> {
        self.runner
            .run(
                "jobs.update_status",
                "Job status updated",
                self.client.update_status(id, status),
            )
            .await
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.runner
            .run_unit("jobs.delete", "Job deleted successfully", self.client.delete(id))
            .await
    }
}

pub struct InterviewManager {
    client: InterviewsClient,
    runner: MutationRunner,
}

impl InterviewManager {
    pub fn new(client: InterviewsClient, runner: MutationRunner) -> Self {
        Self { client, runner }
    }

    pub fn runner(&self) -> &MutationRunner {
        &self.runner
    }

    pub async fn schedule(&self, input: &InterviewInput) -> Option<Interview> {
        self.runner
            .run(
                "interviews.create",
                "Interview scheduled successfully",
                self.client.create(input),
            )
            .await
    }

    pub async fn update(&self, id: &str, input: &InterviewInput) -> Option<Interview> {
        self.runner
            .run(
                "interviews.update",
                "Interview updated successfully",
                self.client.update(id, input),
            )
            .await
    }

    pub async fn update_status(&self, id: &str, status: InterviewStatus) -> Option<Interview> {
        self.runner
            .run(
                "interviews.update_status",
                "Interview status updated",
                self.client.update_status(id, status),
            )
            .await
    }

    pub async fn cancel(&self, id: &str) -> bool {
        self.runner
            .run_unit("interviews.delete", "Interview deleted", self.client.delete(id))
            .await
    }
}

pub struct SkillManager {
    client: SkillsClient,
    runner: MutationRunner,
}

impl SkillManager {
    pub fn new(client: SkillsClient, runner: MutationRunner) -> Self {
        Self { client, runner }
    }

    pub fn runner(&self) -> &MutationRunner {
        &self.runner
    }

    pub async fn add(&self, input: &SkillInput) -> Option<Skill> {
        self.runner
            .run("skills.create", "Skill added", self.client.create(input))
            .await
    }

    pub async fn update(&self, id: &str, input: &SkillInput) -> Option<Skill> {
        self.runner
            .run("skills.update", "Skill updated", self.client.update(id, input))
            .await
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.runner
            .run_unit("skills.delete", "Skill removed", self.client.delete(id))
            .await
    }
}

pub struct ExperienceManager {
    client: ExperienceClient,
    runner: MutationRunner,
}

impl ExperienceManager {
    pub fn new(client: ExperienceClient, runner: MutationRunner) -> Self {
        Self { client, runner }
    }

    pub fn runner(&self) -> &MutationRunner {
        &self.runner
    }

    pub async fn add(&self, input: &ExperienceInput) -> Option<Experience> {
        self.runner
            .run("experience.create", "Experience added", self.client.create(input))
            .await
    }

    pub async fn update(&self, id: &str, input: &ExperienceInput) -> Option<Experience> {
        self.runner
            .run(
                "experience.update",
                "Experience updated",
                self.client.update(id, input),
            )
            .await
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.runner
            .run_unit("experience.delete", "Experience removed", self.client.delete(id))
            .await
    }
}

pub struct CandidateProfileManager {
    client: CandidateClient,
    runner: MutationRunner,
}

impl CandidateProfileManager {
    pub fn new(client: CandidateClient, runner: MutationRunner) -> Self {
        Self { client, runner }
    }

    pub fn runner(&self) -> &MutationRunner {
        &self.runner
    }

    /// Own profile. Read-only, so no success notification is shown.
    pub async fn load(&self) -> Option<CandidateProfile> {
        self.runner
            .read("candidate.profile", self.client.profile())
            .await
    }

    pub async fn update(&self, update: &CandidateProfileUpdate) -> Option<CandidateProfile> {
        self.runner
            .run(
                "candidate.update_profile",
                "Profile updated successfully",
                self.client.update_profile(update),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Level, NotificationLog};
    use hire_models::Role;
    use std::sync::atomic::AtomicBool;

    #[tokio::test]
    async fn test_run_success_and_failure() {
        let log = Arc::new(NotificationLog::new());
        let runner = MutationRunner::new(RoleGate::open(), log.clone());

        let created = runner
            .run("thing.create", "Created", async { Ok::<_, ClientError>(7) })
            .await;
        assert_eq!(created, Some(7));
        assert!(!runner.is_loading());

        let failed = runner
            .run_unit("thing.delete", "Deleted", async {
                Err(ClientError::Api {
                    status: 409,
                    message: "Still referenced".to_string(),
                })
            })
            .await;
        assert!(!failed);
        assert!(!runner.is_loading());
        assert_eq!(runner.last_error().as_deref(), Some("Still referenced"));
        assert_eq!(log.messages(Level::Success), vec!["Created".to_string()]);
        assert_eq!(log.messages(Level::Error), vec!["Still referenced".to_string()]);
    }

    #[tokio::test]
    async fn test_read_reports_failure_without_success_toast() {
        let log = Arc::new(NotificationLog::new());
        let runner = MutationRunner::new(RoleGate::open(), log.clone());

        let loaded = runner
            .read("thing.get", async { Ok::<_, ClientError>(3) })
            .await;
        assert_eq!(loaded, Some(3));
        assert!(log.entries().is_empty());

        let missing = runner
            .read("thing.get", async {
                Err::<u8, _>(ClientError::Server(500))
            })
            .await;
        assert!(missing.is_none());
        assert_eq!(
            runner.last_error().as_deref(),
            Some(hire_client::SERVER_ERROR_MESSAGE)
        );
        assert_eq!(
            log.messages(Level::Error),
            vec![hire_client::SERVER_ERROR_MESSAGE.to_string()]
        );
    }

    #[tokio::test]
    async fn test_gate_blocks_without_calling() {
        let log = Arc::new(NotificationLog::new());
        let gate = RoleGate {
            session: None,
            allowed: Some(vec![Role::Recruiter]),
        };
        let runner = MutationRunner::new(gate, log.clone());

        let polled = AtomicBool::new(false);
        let result = runner
            .run("thing.create", "Created", async {
                polled.store(true, Ordering::SeqCst);
                Ok::<u8, ClientError>(0)
            })
            .await;

        assert!(result.is_none());
        assert!(!polled.load(Ordering::SeqCst));
        assert_eq!(log.messages(Level::Error), vec![FORBIDDEN_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_loading_visible_during_call() {
        let runner = Arc::new(MutationRunner::new(
            RoleGate::open(),
            Arc::new(NotificationLog::new()),
        ));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let task = {
            let runner = Arc::clone(&runner);
            tokio::spawn(async move {
                runner
                    .run("thing.slow", "Done", async move {
                        let _ = rx.await;
                        Ok::<_, ClientError>(())
                    })
                    .await
            })
        };

        tokio::task::yield_now().await;
        while !runner.is_loading() {
            tokio::task::yield_now().await;
        }
        tx.send(()).unwrap();

        assert_eq!(task.await.unwrap(), Some(()));
        assert!(!runner.is_loading());
    }
}
