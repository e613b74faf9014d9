//! Dashboard statistics and recent activity for the signed-in role.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hire_client::{ClientError, DashboardClient};
use hire_models::{ActivityItem, DashboardStats};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::notify::Notifier;
use crate::session::SessionManager;

#[derive(Debug, Clone, Default)]
pub struct DashboardSnapshot {
    pub stats: Option<DashboardStats>,
    pub activity: Vec<ActivityItem>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct DashboardState {
    client: DashboardClient,
    session: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
    activity_limit: Option<u32>,
    cancel: CancellationToken,
    state: Mutex<DashboardSnapshot>,
}

impl DashboardState {
    pub fn new(
        client: DashboardClient,
        session: Arc<SessionManager>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            client,
            session,
            notifier,
            activity_limit: None,
            cancel: CancellationToken::new(),
            state: Mutex::new(DashboardSnapshot::default()),
        }
    }

    pub fn with_activity_limit(mut self, limit: u32) -> Self {
        self.activity_limit = Some(limit);
        self
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.lock().clone()
    }

    /// Load stats and activity concurrently. Signed out: nothing happens.
    pub async fn load(&self) -> DashboardSnapshot {
        let Some(role) = self.session.role() else {
            debug!("No signed-in user, skipping dashboard load");
            return self.snapshot();
        };

        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
        }

        let joined = async {
            tokio::join!(
                self.client.stats(role),
                self.client.activity(self.activity_limit)
            )
        };
        let (stats, activity) = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.lock().loading = false;
                return self.snapshot();
            }
            results = joined => results,
        };

        let mut failure: Option<ClientError> = None;
        let mut state = self.lock();
        state.loading = false;

        match stats {
            Ok(stats) => state.stats = Some(stats),
            Err(e) => failure = Some(e),
        }
        match activity {
            Ok(items) => state.activity = items,
            // Activity is secondary; a stats failure takes precedence.
            Err(e) => {
                warn!("Failed to load dashboard activity: {}", e);
                failure.get_or_insert(e);
            }
        }

        if let Some(e) = failure {
            let message = e.user_message();
            state.error = Some(message.clone());
            let snapshot = state.clone();
            drop(state);
            if !e.is_cancelled() {
                self.notifier.error(&message);
            }
            return snapshot;
        }

        state.clone()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn lock(&self) -> MutexGuard<'_, DashboardSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DashboardState {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
