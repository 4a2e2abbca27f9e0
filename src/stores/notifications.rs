//! Transient user-facing messages.

use super::writable::{Subscription, Writable};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Danger,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// A notification before it is assigned an id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNotification {
    pub title: Option<String>,
    pub message: String,
    pub kind: NotificationKind,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
            kind,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A bare message is an error.
impl From<&str> for NewNotification {
    fn from(message: &str) -> Self {
        Self::new(NotificationKind::Danger, message)
    }
}

impl From<String> for NewNotification {
    fn from(message: String) -> Self {
        Self::new(NotificationKind::Danger, message)
    }
}

/// Append-only list of notifications with dismissal.
#[derive(Clone, Default)]
pub struct Notifications {
    list: Writable<Vec<Notification>>,
    sequence: Rc<Cell<u64>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification, returning its id.
    pub fn notify(&self, notification: impl Into<NewNotification>) -> String {
        let NewNotification {
            title,
            message,
            kind,
        } = notification.into();
        let id = self.next_id();

        let entry = Notification {
            id: id.clone(),
            title,
            message,
            kind,
        };
        self.list.update(|list| {
            let mut next = list.clone();
            next.push(entry);
            next
        });
        id
    }

    /// Remove the notification with this id.
    pub fn dismiss(&self, id: &str) {
        self.list
            .update(|list| list.iter().filter(|n| n.id != id).cloned().collect());
    }

    pub fn clear(&self) {
        self.list.set(Vec::new());
    }

    pub fn get(&self) -> Vec<Notification> {
        self.list.get()
    }

    pub fn set(&self, list: Vec<Notification>) {
        self.list.set(list);
    }

    pub fn update(&self, f: impl FnOnce(&Vec<Notification>) -> Vec<Notification>) {
        self.list.update(f);
    }

    pub fn subscribe(&self, callback: impl FnMut(&Vec<Notification>) + 'static) -> Subscription {
        self.list.subscribe(callback)
    }

    /// Millisecond timestamp plus a per-list counter, so ids stay unique
    /// within the same millisecond.
    fn next_id(&self) -> String {
        let seq = self.sequence.get();
        self.sequence.set(seq + 1);
        format!("{}-{}", chrono::Utc::now().timestamp_millis(), seq)
    }
}
