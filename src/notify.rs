use crate::config::NotificationConfig;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

/// A transient on-screen message
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub shown_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn is_visible_at(&self, now: Instant) -> bool {
        now < self.shown_at + self.duration
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.label(), self.message)
    }
}

/// Publishes transient messages with a fixed visible duration
pub struct NotificationCenter {
    sender: broadcast::Sender<Notification>,
    duration: Duration,
    next_id: AtomicU64,
    history_limit: usize,
    history: Mutex<VecDeque<Notification>>,
}

impl NotificationCenter {
    pub fn new(config: &NotificationConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity);
        Self {
            sender,
            duration: config.duration(),
            next_id: AtomicU64::new(1),
            history_limit: config.history_limit.max(1),
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Receive every notification shown from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn show<S: Into<String>>(&self, kind: NotificationKind, message: S) -> Notification {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            kind,
            message: message.into(),
            shown_at: Instant::now(),
            duration: self.duration,
        };

        match kind {
            NotificationKind::Error => error!("Notification: {}", notification.message),
            NotificationKind::Warning => warn!("Notification: {}", notification.message),
            _ => info!("Notification: {}", notification.message),
        }

        {
            let mut history = self.history.lock();
            if history.len() >= self.history_limit {
                history.pop_front();
            }
            history.push_back(notification.clone());
        }

        // No subscribers is a normal state for headless use
        if self.sender.send(notification.clone()).is_err() {
            debug!("Notification {} had no subscribers", notification.id);
        }

        notification
    }

    pub fn success<S: Into<String>>(&self, message: S) -> Notification {
        self.show(NotificationKind::Success, message)
    }

    pub fn error<S: Into<String>>(&self, message: S) -> Notification {
        self.show(NotificationKind::Error, message)
    }

    pub fn warning<S: Into<String>>(&self, message: S) -> Notification {
        self.show(NotificationKind::Warning, message)
    }

    pub fn info<S: Into<String>>(&self, message: S) -> Notification {
        self.show(NotificationKind::Info, message)
    }

    /// Notifications still within their visible duration
    pub fn active(&self) -> Vec<Notification> {
        let now = Instant::now();
        let history = self.history.lock();
        // Every entry shares one duration, so the visible ones form a suffix
        let expired = history.partition_point(|n| !n.is_visible_at(now));
        history.range(expired..).cloned().collect()
    }

    /// The most recent notifications, oldest first, up to the history limit
    pub fn history(&self) -> Vec<Notification> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.history.lock().back().cloned()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;

    fn center() -> NotificationCenter {
        NotificationCenter::new(&RosterConfig::default().notification)
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_expire_after_duration() {
        let center = center();
        center.success("Saved");

        assert_eq!(center.active().len(), 1);

        tokio::time::advance(Duration::from_millis(2999)).await;
        assert_eq!(center.active().len(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(center.active().is_empty());
        assert_eq!(center.history().len(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let center = center();
        let mut receiver = center.subscribe();

        center.warning("Maximum of 5 photos reached");

        let received = receiver.recv().await.unwrap();
        assert_eq!(received.kind, NotificationKind::Warning);
        assert_eq!(received.to_string(), "[warning] Maximum of 5 photos reached");
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let center = center();
        let first = center.info("one");
        let second = center.error("two");
        assert_eq!(second.id, first.id + 1);
        assert_eq!(center.last().unwrap().message, "two");
    }

    #[tokio::test]
    async fn test_history_keeps_most_recent() {
        let mut config = RosterConfig::default().notification;
        config.history_limit = 3;
        let center = NotificationCenter::new(&config);

        for i in 0..10 {
            center.info(format!("message {}", i));
        }

        let history = center.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].message, "message 7");
        assert_eq!(center.last().unwrap().message, "message 9");
        assert_eq!(center.active().len(), 3);
    }
}
