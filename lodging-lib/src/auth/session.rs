//! Session signals and the idle session timer.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use tokio::sync::broadcast;

/// Session lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session can no longer be recovered; the host must force a re-login.
    Expired,
    /// A token refresh succeeded.
    Restored,
}

/// Broadcasts [`SessionEvent`]s and remembers whether the session expired.
///
/// The signal fires independently of the rejected call, so it reaches the
/// host even for requests nobody awaits.
#[derive(Debug)]
pub struct SessionSignal {
    sender: broadcast::Sender<SessionEvent>,
    expired: AtomicBool,
}

impl Default for SessionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionSignal {
    /// Creates a signal with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            sender,
            expired: AtomicBool::new(false),
        }
    }

    /// Subscribes to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Marks the session expired and notifies subscribers.
    pub fn expire(&self) {
        self.expired.store(true, Ordering::SeqCst);
        self.emit(SessionEvent::Expired);
    }

    /// Clears the expired flag and notifies subscribers.
    pub fn restore(&self) {
        self.expired.store(false, Ordering::SeqCst);
        self.emit(SessionEvent::Restored);
    }

    /// Clears the expired flag without emitting anything.
    pub fn reset(&self) {
        self.expired.store(false, Ordering::SeqCst);
    }

    /// Returns `true` once the session has expired, until reset or restored.
    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        if self.sender.send(event).is_err() {
            log::debug!("no session listeners for {:?}", event);
        }
    }
}

/// Idle timeout for an authenticated session.
///
/// Activity extends the deadline only while the session is still alive; once
/// it has lapsed, only [`start`](Self::start) begins a new one.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    duration: Duration,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionTimer {
    /// Creates a stopped timer.
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            expires_at: None,
        }
    }

    /// Starts the timer at `now`.
    ///
    /// A still-valid `stored` deadline (for example one persisted by another
    /// instance) is reused instead of starting a fresh window.
    pub fn start(&mut self, now: DateTime<Utc>, stored: Option<DateTime<Utc>>) {
        self.expires_at = match stored {
            Some(deadline) if deadline > now => Some(deadline),
            _ => Some(self.deadline_from(now)),
        };
    }

    /// Records user activity at `now`.
    ///
    /// Returns `true` if the deadline was extended.
    pub fn touch(&mut self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(deadline) if deadline > now => {
                self.expires_at = Some(self.deadline_from(now));
                true
            }
            _ => false,
        }
    }

    /// Stops the timer (logout).
    pub fn stop(&mut self) {
        self.expires_at = None;
    }

    /// Returns the current deadline.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Returns whole seconds left; the full window when stopped.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.expires_at {
            None => self.duration,
            Some(deadline) => {
                let secs = (deadline - now).num_seconds().max(0) as u64;
                Duration::from_secs(secs)
            }
        }
    }

    /// Returns `true` if the timer is running and its deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= now)
    }

    /// Deadline one window after `now`, saturating at the latest representable time.
    fn deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.duration)
            .ok()
            .and_then(|window| now.checked_add_signed(window))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
