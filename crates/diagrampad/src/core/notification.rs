//! Transient user notifications
//!
//! Every operation reports its outcome here instead of failing loudly.
//! Notifications dismiss themselves once [`NOTIFICATION_TTL_MS`] has passed;
//! expiry is checked against the clock whenever they are read.

use chrono::{DateTime, Utc};
use std::fmt;

/// How long a notification stays visible
pub const NOTIFICATION_TTL_MS: i64 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationLevel::Info => write!(f, "info"),
            NotificationLevel::Success => write!(f, "success"),
            NotificationLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub posted: DateTime<Utc>,
}

impl Notification {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.posted).num_milliseconds() >= NOTIFICATION_TTL_MS
    }
}

/// Queue of posted notifications
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, level: NotificationLevel, message: impl Into<String>, now: DateTime<Utc>) {
        self.items.push(Notification {
            level,
            message: message.into(),
            posted: now,
        });
    }

    /// Notifications still on screen at `now`
    pub fn active(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(move |n| !n.is_expired(now))
    }

    /// Forget notifications that have expired by `now`
    pub fn prune(&mut self, now: DateTime<Utc>) {
        self.items.retain(|n| !n.is_expired(now));
    }

    /// Hand every pending notification to the caller
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.items)
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_notifications_expire_after_ttl() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut notifications = Notifications::new();
        notifications.post(NotificationLevel::Success, "Diagram saved!", start);
        notifications.post(
            NotificationLevel::Error,
            "Error saving diagram",
            start + Duration::seconds(2),
        );

        assert_eq!(notifications.active(start + Duration::milliseconds(2_999)).count(), 2);
        let later = start + Duration::seconds(3);
        let active: Vec<_> = notifications.active(later).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].level, NotificationLevel::Error);

        notifications.prune(later);
        assert_eq!(notifications.len(), 1);
        notifications.prune(start + Duration::seconds(10));
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_drain_empties_queue() {
        let now = Utc::now();
        let mut notifications = Notifications::new();
        notifications.post(NotificationLevel::Info, "Welcome", now);
        assert_eq!(notifications.latest().unwrap().message, "Welcome");
        let drained = notifications.drain();
        assert_eq!(drained.len(), 1);
        assert!(notifications.is_empty());
    }
}
