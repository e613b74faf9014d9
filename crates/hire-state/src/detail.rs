//! Single-entity container: load by id, `None` on failure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use hire_client::{ClientError, ClientResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::access::RoleGate;
use crate::notify::Notifier;

#[async_trait]
pub trait ItemSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    async fn fetch_item(&self, id: &str) -> ClientResult<Self::Item>;
}

#[derive(Debug, Clone)]
pub struct ItemState<T> {
    pub id: Option<String>,
    pub item: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ItemState<T> {
    fn default() -> Self {
        Self {
            id: None,
            item: None,
            loading: false,
            error: None,
        }
    }
}

pub struct ItemResource<S: ItemSource> {
    source: S,
    notifier: Arc<dyn Notifier>,
    gate: RoleGate,
    cancel: CancellationToken,
    generation: AtomicU64,
    state: Mutex<ItemState<S::Item>>,
}

impl<S: ItemSource> ItemResource<S> {
    pub fn new(source: S, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            source,
            notifier,
            gate: RoleGate::open(),
            cancel: CancellationToken::new(),
            generation: AtomicU64::new(0),
            state: Mutex::new(ItemState::default()),
        }
    }

    pub fn with_gate(mut self, gate: RoleGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn snapshot(&self) -> ItemState<S::Item> {
        self.lock().clone()
    }

    pub fn item(&self) -> Option<S::Item> {
        self.lock().item.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Load `id`. Failure leaves `item` empty, sets `error` and notifies.
    pub async fn load(&self, id: &str) -> Option<S::Item> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if !self.gate.permits() {
            debug!(resource = self.source.name(), id, "Role not allowed, skipping load");
            self.generation.fetch_add(1, Ordering::SeqCst);
            *self.lock() = ItemState::default();
            return None;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            state.id = Some(id.to_string());
            state.loading = true;
            state.error = None;
        }

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            result = self.source.fetch_item(id) => result,
        };

        if self.cancel.is_cancelled() {
            self.lock().loading = false;
            return None;
        }

        let mut state = self.lock();
        if generation != self.generation.load(Ordering::SeqCst) {
            debug!(resource = self.source.name(), id, "Discarding superseded item");
            return None;
        }
        state.loading = false;

        match result {
            Ok(item) => {
                state.item = Some(item.clone());
                Some(item)
            }
            Err(e) => {
                warn!(resource = self.source.name(), id, "Load failed: {}", e);
                let message = e.user_message();
                state.item = None;
                state.error = Some(message.clone());
                drop(state);
                self.notifier.error(&message);
                None
            }
        }
    }

    /// Reload the last requested id.
    pub async fn reload(&self) -> Option<S::Item> {
        let id = self.lock().id.clone()?;
        self.load(&id).await
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn lock(&self) -> MutexGuard<'_, ItemState<S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: ItemSource> Drop for ItemResource<S> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationLog;
    use std::time::Duration;

    struct Lookup;

    #[async_trait]
    impl ItemSource for Lookup {
        type Item = String;

        fn name(&self) -> &'static str {
            "lookup"
        }

        async fn fetch_item(&self, id: &str) -> ClientResult<String> {
            if id == "slow" {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            match id {
                "missing" => Err(ClientError::NotFound("Job not found".to_string())),
                other => Ok(format!("item-{}", other)),
            }
        }
    }

    #[tokio::test]
    async fn test_load_and_failure() {
        let log = Arc::new(NotificationLog::new());
        let resource = ItemResource::new(Lookup, log.clone());

        assert_eq!(resource.load("7").await.as_deref(), Some("item-7"));
        assert_eq!(resource.reload().await.as_deref(), Some("item-7"));

        assert!(resource.load("missing").await.is_none());
        let state = resource.snapshot();
        assert!(state.item.is_none());
        assert_eq!(state.error.as_deref(), Some("Job not found"));
        assert_eq!(log.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_close_clears_loading() {
        let resource = Arc::new(ItemResource::new(Lookup, Arc::new(NotificationLog::new())));

        let pending = {
            let resource = Arc::clone(&resource);
            tokio::spawn(async move { resource.load("slow").await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(resource.is_loading());
        resource.close();

        assert!(pending.await.unwrap().is_none());
        assert!(!resource.is_loading());
        assert!(resource.item().is_none());
    }

    #[tokio::test]
    async fn test_gate_without_session_clears_item() {
        let resource = ItemResource::new(Lookup, Arc::new(NotificationLog::new())).with_gate(
            RoleGate {
                session: None,
                allowed: Some(vec![hire_models::Role::Recruiter]),
            },
        );
        {
            let mut state = resource.lock();
            state.id = Some("7".to_string());
            state.item = Some("item-7".to_string());
        }

        assert!(resource.load("7").await.is_none());
        assert!(resource.item().is_none());
        assert!(resource.snapshot().id.is_none());
    }
}
