//! Single-flight token refresh.

use std::future::Future;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio::sync::oneshot;

use crate::error::AuthError;

/// Result of one refresh, shared by every caller that waited on it.
pub type RefreshOutcome = Result<String, Arc<AuthError>>;

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

/// Ensures at most one refresh is in flight.
///
/// The first caller to find no refresh running becomes the leader and runs
/// the refresh; everyone arriving while it runs is queued and receives the
/// leader's outcome, in arrival order. Once the outcome is delivered the next
/// failure wave can start a new refresh.
///
/// The state lock is never held across an await point.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    started: AtomicU64,
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `refresh` unless one is already in flight, in which case waits for
    /// that one instead.
    pub async fn refresh<F, Fut>(&self, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, AuthError>>,
    {
        let waiter = {
            let mut state = self.lock();
            if state.in_flight {
                let (tx, rx) = oneshot::channel();
                state.waiters.push(tx);
                Some(rx)
            } else {
                state.in_flight = true;
                None
            }
        };

        if let Some(rx) = waiter {
            log::debug!("waiting on in-flight token refresh");
            return rx
                .await
                .unwrap_or_else(|_| Err(Arc::new(AuthError::RefreshAborted)));
        }

        self.started.fetch_add(1, Ordering::SeqCst);
        log::debug!("starting token refresh");

        let mut guard = InFlightGuard {
            coordinator: self,
            armed: true,
        };
        let outcome = refresh().await.map_err(Arc::new);
        guard.complete(&outcome);
        outcome
    }

    /// Returns `true` while a refresh is running.
    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight
    }

    /// Number of refreshes started since creation.
    pub fn refreshes_started(&self) -> u64 {
        self.started.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears the flag and hands back the queued waiters.
    fn release(&self) -> Vec<oneshot::Sender<RefreshOutcome>> {
        let mut state = self.lock();
        state.in_flight = false;
        std::mem::take(&mut state.waiters)
    }
}

/// Releases the flag even if the leader's future is dropped mid-refresh.
struct InFlightGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl InFlightGuard<'_> {
    fn complete(&mut self, outcome: &RefreshOutcome) {
        self.armed = false;
        let waiters = self.coordinator.release();
        if !waiters.is_empty() {
            log::debug!("delivering refresh outcome to {} waiter(s)", waiters.len());
        }
        for waiter in waiters {
            // receiver gone means the waiting request was cancelled
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("token refresh abandoned before completion");
            // dropping the senders wakes the waiters with RefreshAborted
            drop(self.coordinator.release());
        }
    }
}
