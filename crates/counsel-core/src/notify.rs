//! Transient notification broadcasting.
//!
//! The [`Notifier`] is a process-wide queue of self-expiring toasts with
//! multi-subscriber fan-out. It lives outside the case store deliberately:
//! toasts are ephemeral and never part of session state. It is an explicitly
//! constructed service, created once at startup and handed (cheaply cloned)
//! to whatever needs to publish or observe, rather than living in a global.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::observe::SubscriptionId;

/// How long a toast stays in the queue before it removes itself.
pub const TOAST_TTL: Duration = Duration::from_millis(5000);

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A transient, self-expiring notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Monotonic id, unique for the process lifetime.
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    /// Creation time in wall-clock millis.
    pub created_at: i64,
}

/// Callback invoked with the full toast queue after every change.
pub type ToastObserver = Arc<dyn Fn(&[Toast]) + Send + Sync>;

struct NotifierInner {
    toasts: Mutex<Vec<Toast>>,
    subscribers: Mutex<Vec<(u64, ToastObserver)>>,
    next_toast: AtomicU64,
    next_subscription: AtomicU64,
    ttl: Duration,
}

/// Shared handle to the toast queue.
///
/// Cloning is cheap and every clone observes the same queue. Each published
/// toast schedules its own removal after the configured delay; removal fans
/// out just like publication, so a toast is guaranteed gone from the live
/// queue no later than its expiry regardless of subscriber presence.
///
/// Must be used from within a tokio runtime (expiry is a spawned timer).
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Notifier {
    /// Creates a notifier with the standard 5 s toast lifetime.
    pub fn new() -> Self {
        Self::with_ttl(TOAST_TTL)
    }

    /// Creates a notifier with a custom toast lifetime.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(NotifierInner {
                toasts: Mutex::new(Vec::new()),
                subscribers: Mutex::new(Vec::new()),
                next_toast: AtomicU64::new(1),
                next_subscription: AtomicU64::new(1),
                ttl,
            }),
        }
    }

    /// Publishes a success toast.
    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    /// Publishes an error toast.
    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    /// Publishes an info toast.
    pub fn info(&self, message: impl Into<String>) {
        self.push(ToastKind::Info, message.into());
    }

    /// Removes a toast before its expiry (e.g. user dismissal). Unknown ids
    /// are a no-op and trigger no fan-out.
    pub fn dismiss(&self, id: u64) {
        let removed = {
            let mut toasts = self.inner.toasts.lock().unwrap();
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        };
        if removed {
            self.fan_out();
        }
    }

    /// Returns a clone of the current queue.
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.toasts.lock().unwrap().clone()
    }

    /// Registers an observer; it will receive the full queue on every change
    /// until unsubscribed.
    pub fn subscribe(&self, observer: impl Fn(&[Toast]) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .push((id, Arc::new(observer)));
        SubscriptionId(id)
    }

    /// Removes an observer. Idempotent; unknown ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .retain(|(sub_id, _)| *sub_id != id.0);
    }

    fn push(&self, kind: ToastKind, message: String) {
        let id = self.inner.next_toast.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            kind,
            message,
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        self.inner.toasts.lock().unwrap().push(toast);
        self.fan_out();

        // Every toast owns its removal; dismissal ahead of the timer makes
        // the later dismiss a no-op.
        let notifier = self.clone();
        let ttl = self.inner.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            notifier.dismiss(id);
        });
    }

    /// Hands every observer a fresh copy of the current queue.
    fn fan_out(&self) {
        let snapshot = self.toasts();
        let observers: Vec<ToastObserver> = {
            let subscribers = self.inner.subscribers.lock().unwrap();
            subscribers.iter().map(|(_, obs)| obs.clone()).collect()
        };
        for observer in observers {
            observer(&snapshot);
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Seen = Arc<Mutex<Vec<Vec<Toast>>>>;

    fn record(notifier: &Notifier) -> Seen {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        notifier.subscribe(move |toasts| {
            seen_clone.lock().unwrap().push(toasts.to_vec());
        });
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_toast_fans_out_and_expires() {
        let notifier = Notifier::new();
        let seen = record(&notifier);

        notifier.error("bad key");

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].len(), 1);
            assert_eq!(seen[0][0].kind, ToastKind::Error);
            assert_eq!(seen[0][0].message, "bad key");
        }

        // Past the fixed expiry the queue fans out again, now empty.
        tokio::time::sleep(TOAST_TTL + Duration::from_millis(100)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].is_empty());
        assert!(notifier.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_observers_receive_identical_queues() {
        let notifier = Notifier::new();
        let first = record(&notifier);
        let second = record(&notifier);

        notifier.success("saved");

        let first = first.lock().unwrap();
        let second = second.lock().unwrap();
        assert_eq!(*first, *second);
        assert_eq!(first[0][0].kind, ToastKind::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_unknown_id_is_noop() {
        let notifier = Notifier::new();
        let seen = record(&notifier);

        notifier.dismiss(999);

        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_dismiss_removes_before_expiry() {
        let notifier = Notifier::new();

        notifier.info("working");
        let id = notifier.toasts()[0].id;
        notifier.dismiss(id);

        assert!(notifier.toasts().is_empty());

        // The expiry timer still fires but finds nothing to remove.
        tokio::time::sleep(TOAST_TTL + Duration::from_millis(100)).await;
        assert!(notifier.toasts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribed_observer_stops_receiving() {
        let notifier = Notifier::new();
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let id = notifier.subscribe(move |toasts| {
            seen_clone.lock().unwrap().push(toasts.to_vec());
        });

        notifier.info("first");
        notifier.unsubscribe(id);
        notifier.unsubscribe(id);
        notifier.info("second");

        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_are_monotonic() {
        let notifier = Notifier::new();

        notifier.info("a");
        notifier.info("b");
        notifier.info("c");

        let toasts = notifier.toasts();
        assert!(toasts[0].id < toasts[1].id);
        assert!(toasts[1].id < toasts[2].id);
    }
}
