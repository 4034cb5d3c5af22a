//! Transient notifications
//!
//! A toast stays in [`Toasts::active`] until its timer fires. Listeners get
//! every new toast through [`Toasts::subscribe`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};

/// Time a toast stays visible
pub const AUTO_CLOSE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Notification queue with auto-dismiss timers
pub struct Toasts {
    next_id: AtomicU64,
    active: Arc<Mutex<Vec<Toast>>>,
    auto_close: Duration,
    event_tx: broadcast::Sender<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::with_auto_close(AUTO_CLOSE)
    }

    pub fn with_auto_close(auto_close: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(32);
        Self {
            next_id: AtomicU64::new(1),
            active: Arc::new(Mutex::new(Vec::new())),
            auto_close,
            event_tx,
        }
    }

    pub async fn success(&self, message: impl Into<String>) -> u64 {
        self.show(ToastKind::Success, message.into()).await
    }

    pub async fn error(&self, message: impl Into<String>) -> u64 {
        self.show(ToastKind::Error, message.into()).await
    }

    /// Show a toast and schedule its removal. Must run inside a tokio runtime.
    pub async fn show(&self, kind: ToastKind, message: String) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast { id, kind, message };
        self.active.lock().await.push(toast.clone());
        // No receivers is OK
        let _ = self.event_tx.send(toast);

        let active = Arc::clone(&self.active);
        let auto_close = self.auto_close;
        tokio::spawn(async move {
            tokio::time::sleep(auto_close).await;
            active.lock().await.retain(|t| t.id != id);
        });
        id
    }

    pub async fn dismiss(&self, id: u64) {
        self.active.lock().await.retain(|t| t.id != id);
    }

    /// Toasts currently visible, oldest first
    pub async fn active(&self) -> Vec<Toast> {
        self.active.lock().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.event_tx.subscribe()
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_toast_auto_dismiss() {
        let toasts = Toasts::new();
        toasts.success("saved").await;
        assert_eq!(toasts.active().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(toasts.active().await.len(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(toasts.active().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_and_subscribe() {
        let toasts = Toasts::new();
        let mut rx = toasts.subscribe();

        let id = toasts.error("failed").await;
        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind, ToastKind::Error);
        assert_eq!(received.message, "failed");

        toasts.dismiss(id).await;
        assert!(toasts.active().await.is_empty());
    }
}
