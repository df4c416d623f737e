//! Toast notifications — one visible toast, auto-dismissed after a fixed delay.
//!
//! Showing a new toast replaces the current one and restarts the timer. A
//! timer only clears the toast it was started for, so a stale timer can
//! never dismiss a newer toast.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// How long a toast stays visible.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(3);

/// Identity of a shown toast.
pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    pub message: String,
    pub severity: Severity,
}

struct ToasterInner {
    state: watch::Sender<Option<Toast>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl ToasterInner {
    fn dismiss_if_current(&self, id: ToastId) -> bool {
        self.state.send_if_modified(|current| {
            if current.as_ref().is_some_and(|t| t.id == id) {
                *current = None;
                true
            } else {
                false
            }
        })
    }

    fn lock_timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Owner of the single visible toast.
///
/// `show` spawns the dismissal timer on the current tokio runtime.
pub struct Toaster {
    inner: Arc<ToasterInner>,
    duration: Duration,
}

impl Toaster {
    pub fn new() -> Self {
        Self::with_duration(DEFAULT_TOAST_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        let (state, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(ToasterInner {
                state,
                timer: Mutex::new(None),
                next_id: AtomicU64::new(1),
            }),
            duration,
        }
    }

    /// Show a toast, replacing any visible one.
    pub fn show(&self, message: impl Into<String>, severity: Severity) -> ToastId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            severity,
        };
        debug!(toast_id = id, severity = ?severity, "Showing toast");

        // Publish and re-arm under the timer lock so concurrent calls cannot
        // leave a newer toast without a running timer.
        let mut timer = self.inner.lock_timer();
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        self.inner.state.send_replace(Some(toast));

        let weak: Weak<ToasterInner> = Arc::downgrade(&self.inner);
        let duration = self.duration;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(inner) = weak.upgrade() {
                if inner.dismiss_if_current(id) {
                    debug!(toast_id = id, "Toast auto-dismissed");
                }
            }
        }));
        drop(timer);

        id
    }

    /// Dismiss whatever toast is visible.
    pub fn dismiss(&self) {
        let mut timer = self.inner.lock_timer();
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        self.inner.state.send_replace(None);
    }

    /// Dismiss toast `id` only if it is still the visible one.
    pub fn dismiss_if_current(&self, id: ToastId) -> bool {
        self.inner.dismiss_if_current(id)
    }

    pub fn current(&self) -> Option<Toast> {
        self.inner.state.borrow().clone()
    }

    /// Watch the visible toast.
    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.inner.state.subscribe()
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Toaster {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.lock_timer().take() {
            timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn auto_dismisses_after_duration() {
        let toaster = Toaster::new();
        toaster.show("Saved", Severity::Success);
        assert_eq!(toaster.current().unwrap().message, "Saved");

        tokio::time::sleep(ms(2_900)).await;
        assert!(toaster.current().is_some());

        tokio::time::sleep(ms(200)).await;
        assert!(toaster.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_toast_survives_first_timer() {
        let toaster = Toaster::new();
        toaster.show("first", Severity::Info);

        tokio::time::sleep(ms(2_000)).await;
        let second = toaster.show("second", Severity::Error);

        // Past the first toast's deadline.
        tokio::time::sleep(ms(1_500)).await;
        let current = toaster.current().unwrap();
        assert_eq!(current.id, second);
        assert_eq!(current.message, "second");

        // Past the second toast's deadline.
        tokio::time::sleep(ms(1_600)).await;
        assert!(toaster.current().is_none());
    }

    #[tokio::test]
    async fn stale_id_does_not_clear_newer_toast() {
        let toaster = Toaster::new();
        let first = toaster.show("first", Severity::Info);
        let second = toaster.show("second", Severity::Warning);

        assert!(!toaster.dismiss_if_current(first));
        assert_eq!(toaster.current().unwrap().id, second);

        assert!(toaster.dismiss_if_current(second));
        assert!(toaster.current().is_none());
    }

    #[tokio::test]
    async fn manual_dismiss() {
        let toaster = Toaster::new();
        toaster.show("bye", Severity::Info);
        toaster.dismiss();
        assert!(toaster.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_show_and_dismiss() {
        let toaster = Toaster::with_duration(ms(500));
        let mut rx = toaster.subscribe();

        toaster.show("hello", Severity::Success);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().message, "hello");

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_timer() {
        let toaster = Toaster::new();
        // Keep the shared state alive so a surviving timer could still upgrade and dismiss.
        let inner = Arc::clone(&toaster.inner);
        toaster.show("left behind", Severity::Info);
        drop(toaster);

        tokio::time::sleep(ms(5_000)).await;
        assert!(inner.lock_timer().is_none());
        assert_eq!(inner.state.borrow().as_ref().unwrap().message, "left behind");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_shows_leave_no_orphaned_toast() {
        let toaster = Arc::new(Toaster::with_duration(ms(20)));

        let mut tasks = Vec::new();
        for worker in 0..8 {
            let toaster = Arc::clone(&toaster);
            tasks.push(tokio::spawn(async move {
                for n in 0..50 {
                    toaster.show(format!("{worker}-{n}"), Severity::Info);
                    tokio::task::yield_now().await;
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        tokio::time::sleep(ms(200)).await;
        assert!(toaster.current().is_none());
    }

    #[test]
    fn severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), "\"warning\"");
    }
}
