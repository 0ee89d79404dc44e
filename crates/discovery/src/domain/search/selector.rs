//! Backend selection with silent degradation.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::warn;

use crate::domain::search::{
    backends::{BackendKind, SearchBackend},
    errors::BackendError,
    query::{SearchQuery, SuggestQuery},
    results::{SearchPage, Suggestion},
};

/// Cheap reachability check for the primary backend.
#[automock]
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    async fn is_alive(&self) -> bool;
}

/// A result together with the backend that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Routed<T> {
    pub value: T,
    pub backend: BackendKind,
}

/// Routes each request to the primary backend when it is reachable and to
/// the degraded backend otherwise.
///
/// The probe runs once per request. A primary outage after a successful
/// probe re-executes the same request on the degraded backend; a request the
/// index refuses is reported as is.
#[derive(Clone)]
pub struct BackendSelector {
    primary: Arc<dyn SearchBackend>,
    degraded: Arc<dyn SearchBackend>,
    probe: Arc<dyn LivenessProbe>,
}

impl BackendSelector {
    #[must_use]
    pub fn new(
        primary: Arc<dyn SearchBackend>,
        degraded: Arc<dyn SearchBackend>,
        probe: Arc<dyn LivenessProbe>,
    ) -> Self {
        Self {
            primary,
            degraded,
            probe,
        }
    }

    /// The backend that should serve the next request.
    pub async fn select(&self) -> Arc<dyn SearchBackend> {
        if self.probe.is_alive().await {
            Arc::clone(&self.primary)
        } else {
            warn!(
                backend = %self.degraded.kind(),
                reason = "liveness probe failed",
                "search index unreachable, degrading"
            );

            Arc::clone(&self.degraded)
        }
    }

    /// # Errors
    ///
    /// Returns an error when the serving backend fails for a reason other
    /// than primary unavailability.
    pub async fn search(&self, query: &SearchQuery) -> Result<Routed<SearchPage>, BackendError> {
        let backend = self.select().await;

        if backend.kind() == self.degraded.kind() {
            return routed(backend.as_ref(), backend.search(query).await);
        }

        match backend.search(query).await {
            Err(BackendError::Index(error)) if error.is_unavailable() => {
                warn!(
                    backend = %self.degraded.kind(),
                    reason = %error,
                    "search index request failed, degrading"
                );

                routed(self.degraded.as_ref(), self.degraded.search(query).await)
            }
            result => routed(backend.as_ref(), result),
        }
    }

    /// # Errors
    ///
    /// Returns an error when the serving backend fails for a reason other
    /// than primary unavailability.
    pub async fn suggest(
        &self,
        query: &SuggestQuery,
    ) -> Result<Routed<Vec<Suggestion>>, BackendError> {
        let backend = self.select().await;

        if backend.kind() == self.degraded.kind() {
            return routed(backend.as_ref(), backend.suggest(query).await);
        }

        match backend.suggest(query).await {
            Err(BackendError::Index(error)) if error.is_unavailable() => {
                warn!(
                    backend = %self.degraded.kind(),
                    reason = %error,
                    "search index suggestion failed, degrading"
                );

                routed(self.degraded.as_ref(), self.degraded.suggest(query).await)
            }
            result => routed(backend.as_ref(), result),
        }
    }
}

fn routed<T>(
    backend: &dyn SearchBackend,
    result: Result<T, BackendError>,
) -> Result<Routed<T>, BackendError> {
    result.map(|value| Routed {
        value,
        backend: backend.kind(),
    })
}
