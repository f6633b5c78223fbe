//! Notification models.

use serde::{Deserialize, Serialize};

/// Default category assigned when the server omits one.
pub const GENERAL_KIND: &str = "general";

/// A notification for the current user, or for one of a parent's children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID. Server-assigned when available, otherwise derived
    /// locally; never reused within a session.
    pub id: String,
    /// Short title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Creation time in epoch milliseconds. Lists sort on this, newest first.
    pub timestamp: i64,
    /// Whether the notification has been read. Never reverts to false
    /// within a session.
    pub read: bool,
    /// Category tag (open enumeration: behavior, attendance, grade,
    /// homework, announcement, message, ...).
    pub kind: String,
    /// The child's auth code when fetched in a parent-proxy context.
    pub student_auth_code: Option<String>,
    /// The original server payload, kept so mark-read can recover the
    /// server's own identifier if it differs from the derived `id`.
    #[serde(default)]
    pub source: serde_json::Value,
}

impl Notification {
    /// The identifier to send back to the server for mark-read.
    ///
    /// Prefers the server's own `id` field from the retained payload; the
    /// derived `id` may be a local timestamp fallback the server has never
    /// seen.
    pub fn server_id(&self) -> &str {
        self.source
            .get("id")
            .and_then(serde_json::Value::as_str)
            .unwrap_or(&self.id)
    }
}

/// An ordered set of notifications plus its unread count.
///
/// Items are newest first and unique by id. The unread count is usually
/// `count(!read)` but may come straight from the server on a fresh load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationCollection {
    /// Notifications, newest first.
    pub items: Vec<Notification>,
    /// Unread count; non-negative, decremented (floored at zero) on every
    /// local mark-read.
    pub unread_count: u32,
}

impl NotificationCollection {
    /// Create a collection from items, computing the unread count when the
    /// server did not supply one.
    pub fn new(items: Vec<Notification>, unread_count: Option<u32>) -> Self {
        let unread_count = unread_count.unwrap_or_else(|| count_unread(&items));
        Self {
            items,
            unread_count,
        }
    }

    /// Whether there are no notifications at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mark the notification with `id` as read, decrementing the unread
    /// count (floored at zero). Marking an already-read item changes
    /// nothing. Returns whether a matching notification was found.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                if !n.read {
                    n.read = true;
                    self.unread_count = self.unread_count.saturating_sub(1);
                }
                true
            }
            None => false,
        }
    }

    /// Ids of every currently-unread notification, as the server knows them.
    pub fn unread_server_ids(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|n| !n.read)
            .map(|n| n.server_id().to_owned())
            .collect()
    }
}

/// Count items with `read == false`.
pub fn count_unread(items: &[Notification]) -> u32 {
    items.iter().filter(|n| !n.read).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noti(id: &str, read: bool) -> Notification {
        Notification {
            id: id.to_owned(),
            read,
            kind: GENERAL_KIND.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_computed_unread() {
        let c = NotificationCollection::new(vec![noti("1", false), noti("2", true)], None);
        assert_eq!(c.unread_count, 1);
    }

    #[test]
    fn test_server_unread_wins() {
        let c = NotificationCollection::new(vec![noti("1", false)], Some(5));
        assert_eq!(c.unread_count, 5);
    }

    #[test]
    fn test_mark_read_idempotent() {
        let mut c = NotificationCollection::new(vec![noti("1", false)], None);
        assert!(c.mark_read("1"));
        assert_eq!(c.unread_count, 0);
        assert!(c.mark_read("1"));
        assert_eq!(c.unread_count, 0);
        assert!(c.items[0].read);
    }

    #[test]
    fn test_mark_read_not_found() {
        let mut c = NotificationCollection::new(vec![noti("1", false)], None);
        assert!(!c.mark_read("nope"));
        assert_eq!(c.unread_count, 1);
    }

    #[test]
    fn test_unread_floor() {
        let mut c = NotificationCollection::new(vec![noti("1", false)], Some(0));
        assert!(c.mark_read("1"));
        assert_eq!(c.unread_count, 0);
    }

    #[test]
    fn test_server_id_prefers_source() {
        let mut n = noti("local-17", false);
        n.source = serde_json::json!({ "id": "srv-42" });
        assert_eq!(n.server_id(), "srv-42");

        let plain = noti("9", false);
        assert_eq!(plain.server_id(), "9");
    }
}
