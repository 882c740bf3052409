use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use eyre::Error;
use log::{debug, warn};
use parking_lot::Mutex;

/// Minimum pause between two messages of the same purpose to the same
/// recipient.
pub const MIN_NOTIFY_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Inline action attached to an outbound message.
#[derive(Debug, Clone)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, data: impl Into<String>) -> Button {
        Button {
            label: label.into(),
            data: data.into(),
        }
    }
}

/// Outbound message delivery. The transport lives outside this crate;
/// callers treat every send as fire-and-forget.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: &str, buttons: &[Button]) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    TrainingScheduled,
    TrainingCanceled,
    StatusChanged,
    BlockExhausted,
    NutritionReminder,
}

/// Per-(purpose, recipient) throttle. Ephemeral per-process state;
/// entries older than the interval are evicted on every check.
pub struct RateLimiter {
    min_interval: Duration,
    sent: Mutex<HashMap<(Purpose, i64), Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        RateLimiter {
            min_interval,
            sent: Mutex::new(HashMap::new()),
        }
    }

    pub fn allow(&self, purpose: Purpose, recipient: i64, now: Instant) -> bool {
        let mut sent = self.sent.lock();
        sent.retain(|_, at| now.saturating_duration_since(*at) < self.min_interval);
        if sent.contains_key(&(purpose, recipient)) {
            return false;
        }
        sent.insert((purpose, recipient), now);
        true
    }
}

/// Best-effort notification dispatch. Delivery failures are logged and
/// dropped; they never abort the accounting transaction that triggered
/// them.
#[derive(Clone)]
pub struct Notifications {
    notifier: Arc<dyn Notifier>,
    limiter: Arc<RateLimiter>,
    admin_chat_id: Option<i64>,
}

impl Notifications {
    pub fn new(notifier: Arc<dyn Notifier>, admin_chat_id: Option<i64>) -> Self {
        Notifications {
            notifier,
            limiter: Arc::new(RateLimiter::new(MIN_NOTIFY_INTERVAL)),
            admin_chat_id,
        }
    }

    pub async fn notify(&self, purpose: Purpose, chat_id: i64, text: &str, buttons: &[Button]) {
        if !self.limiter.allow(purpose, chat_id, Instant::now()) {
            debug!("Throttled {:?} notification to {}", purpose, chat_id);
            return;
        }
        if let Err(err) = self.notifier.send(chat_id, text, buttons).await {
            warn!("Failed to notify {}: {:#}", chat_id, err);
        }
    }

    pub async fn notify_admin(&self, purpose: Purpose, text: &str) {
        if let Some(chat_id) = self.admin_chat_id {
            self.notify(purpose, chat_id, text, &[]).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_send_allowed() {
        let limiter = RateLimiter::new(MIN_NOTIFY_INTERVAL);
        assert!(limiter.allow(Purpose::StatusChanged, 1, Instant::now()));
    }

    #[test]
    fn test_repeat_within_interval_suppressed() {
        let limiter = RateLimiter::new(MIN_NOTIFY_INTERVAL);
        let now = Instant::now();
        assert!(limiter.allow(Purpose::StatusChanged, 1, now));
        assert!(!limiter.allow(Purpose::StatusChanged, 1, now + Duration::from_secs(10)));
    }

    #[test]
    fn test_purposes_throttle_independently() {
        let limiter = RateLimiter::new(MIN_NOTIFY_INTERVAL);
        let now = Instant::now();
        assert!(limiter.allow(Purpose::StatusChanged, 1, now));
        assert!(limiter.allow(Purpose::BlockExhausted, 1, now));
        assert!(limiter.allow(Purpose::StatusChanged, 2, now));
    }

    #[test]
    fn test_allowed_again_after_interval() {
        let limiter = RateLimiter::new(MIN_NOTIFY_INTERVAL);
        let now = Instant::now();
        assert!(limiter.allow(Purpose::NutritionReminder, 1, now));
        assert!(limiter.allow(Purpose::NutritionReminder, 1, now + MIN_NOTIFY_INTERVAL));
    }
}
