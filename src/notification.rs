//! Ephemeral, self-expiring notifications.
//!
//! Surfaces the outcome of local commands and of push events. Each entry
//! owns an abortable tokio task that removes it after the queue's TTL;
//! removing an entry early always aborts that task first. Identities are
//! allocated from a counter and never reused, so a stale timer can never
//! remove a different entry.
//!
//! # Example
//!
//! ```no_run
//! use rideflux_sync::{NotificationQueue, Severity};
//!
//! # async fn example() {
//! let queue = NotificationQueue::new();
//! let id = queue.add(Severity::Success, "Ride requested successfully!");
//! assert_eq!(queue.len(), 1);
//! queue.remove(id);
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{trace, warn};

use crate::identifiers::NotificationId;

// ============================================================================
// Constants
// ============================================================================

/// Default lifetime of a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

// ============================================================================
// Severity
// ============================================================================

/// Severity class of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational.
    Info,
    /// Positive outcome.
    Success,
    /// Degraded outcome.
    Warning,
    /// Failed command.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

// ============================================================================
// Notification
// ============================================================================

/// A single notification entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Unique, monotonic identity.
    pub id: NotificationId,
    /// Severity class.
    pub severity: Severity,
    /// Human-readable text.
    pub message: String,
    /// When the entry was added.
    pub created_at: Instant,
}

// ============================================================================
// NotificationQueue
// ============================================================================

/// Shared state behind the queue handle.
#[derive(Default)]
struct QueueState {
    /// Visible entries in insertion order.
    entries: Vec<Notification>,
    /// Pending expiry tasks.
    timers: FxHashMap<NotificationId, AbortHandle>,
    /// Last allocated id.
    counter: u64,
}

/// Ordered list of transient notifications.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct NotificationQueue {
    state: Arc<Mutex<QueueState>>,
    ttl: Duration,
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationQueue {
    /// Creates a queue with the default 5 s TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_NOTIFICATION_TTL)
    }

    /// Creates a queue whose entries expire after `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            ttl,
        }
    }

    /// Returns the configured lifetime of entries.
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Adds an entry and schedules its expiry.
    ///
    /// The entry is visible immediately. Outside a tokio runtime the entry
    /// is kept without expiry and must be removed explicitly.
    pub fn add(&self, severity: Severity, message: impl Into<String>) -> NotificationId {
        let message = message.into();
        let mut state = self.state.lock();

        state.counter += 1;
        let id = NotificationId::new(state.counter);
        let now = Instant::now();

        trace!(%id, %severity, %message, "Notification added");
        state.entries.push(Notification {
            id,
            severity,
            message,
            created_at: now,
        });

        match Handle::try_current() {
            Ok(handle) => {
                // Spawned under the lock: the timer cannot run before its
                // abort handle is registered.
                let deadline = now + self.ttl;
                let task = handle.spawn(Self::expire(Arc::downgrade(&self.state), id, deadline));
                state.timers.insert(id, task.abort_handle());
            }
            Err(_) => warn!(%id, "No tokio runtime; notification will not expire"),
        }

        id
    }

    /// Removes an entry immediately, cancelling its expiry.
    ///
    /// Returns `true` if the entry was present.
    pub fn remove(&self, id: NotificationId) -> bool {
        let mut state = self.state.lock();

        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }

        let before = state.entries.len();
        state.entries.retain(|n| n.id != id);
        before != state.entries.len()
    }

    /// Removes every entry and cancels all pending expiries.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.entries.clear();
    }

    /// Returns a snapshot of the visible entries, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<Notification> {
        self.state.lock().entries.clone()
    }

    /// Returns the number of visible entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns `true` if nothing is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Expiry task body.
    async fn expire(state: Weak<Mutex<QueueState>>, id: NotificationId, deadline: Instant) {
        sleep_until(deadline).await;

        let Some(state) = state.upgrade() else {
            return;
        };

        let mut state = state.lock();
        state.timers.remove(&id);
        state.entries.retain(|n| n.id != id);
        trace!(%id, "Notification expired");
    }
}

impl fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("len", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::time::advance;

    /// Lets spawned expiry tasks observe the advanced clock.
    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_visible_then_expires() {
        let queue = NotificationQueue::new();
        let id = queue.add(Severity::Info, "hello");

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.list()[0].id, id);

        advance(Duration::from_millis(4999)).await;
        settle().await;
        assert_eq!(queue.len(), 1);

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_remove_makes_timer_noop() {
        let queue = NotificationQueue::new();
        let first = queue.add(Severity::Warning, "first");

        advance(Duration::from_millis(1000)).await;
        assert!(queue.remove(first));
        assert!(queue.is_empty());

        let second = queue.add(Severity::Success, "second");
        assert_ne!(first, second);

        // First entry's original deadline passes; second must survive it.
        advance(Duration::from_millis(4000)).await;
        settle().await;
        assert_eq!(queue.list().len(), 1);
        assert_eq!(queue.list()[0].id, second);
        assert!(!queue.remove(first));

        advance(Duration::from_millis(1000)).await;
        settle().await;
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_monotonic_and_unique() {
        let queue = NotificationQueue::new();
        let a = queue.add(Severity::Info, "a");
        let b = queue.add(Severity::Info, "b");
        queue.clear();
        let c = queue.add(Severity::Info, "c");

        assert!(a < b && b < c);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cancels_timers() {
        let queue = NotificationQueue::with_ttl(Duration::from_millis(100));
        queue.add(Severity::Error, "x");
        queue.add(Severity::Error, "y");
        queue.clear();
        assert!(queue.is_empty());

        advance(Duration::from_millis(200)).await;
        settle().await;
        assert!(queue.is_empty());
    }

    #[test]
    fn test_add_outside_runtime_does_not_panic() {
        let queue = NotificationQueue::new();
        queue.add(Severity::Info, "no runtime");
        assert_eq!(queue.len(), 1);
    }
}
