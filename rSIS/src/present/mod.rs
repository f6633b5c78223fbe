//! Presentation adapter: per-screen derivation over the store's state.
//!
//! Given the viewer's role, decides which list is active, which unread
//! count is authoritative, and what a category filter leaves visible.
//! Pure functions over borrowed state; nothing here mutates the store.

use crate::models::{Notification, NotificationCollection};
use crate::store::NotificationStore;

/// Minimum filtered items to show before automatically paginating.
pub const MIN_VISIBLE: usize = 10;

/// The viewer's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Parent,
    Teacher,
}

/// Named category filters offered by the notification screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Unread,
    Behavior,
    Attendance,
    Grade,
    Homework,
    Messaging,
    Announcement,
}

impl Filter {
    /// Whether a notification passes this filter.
    pub fn matches(&self, n: &Notification) -> bool {
        match self {
            Filter::All => true,
            Filter::Unread => !n.read,
            Filter::Behavior => n.kind == "behavior",
            Filter::Attendance => n.kind == "attendance",
            Filter::Grade => n.kind == "grade" || n.kind == "exam",
            Filter::Homework => n.kind == "homework" || n.kind == "assignment",
            Filter::Messaging => n.kind == "message" || n.kind == "messaging",
            Filter::Announcement => n.kind == "announcement" || n.kind == "general",
        }
    }
}

/// Inputs for active-list resolution.
pub struct FeedContext<'a> {
    /// The viewer's role.
    pub role: Role,
    /// A list loaded specifically for this role/session, if any.
    pub role_scoped: Option<&'a NotificationCollection>,
    /// The root collection, used as fallback.
    pub root: &'a NotificationCollection,
    /// Whether the role-scoped fetch is still in flight.
    pub role_fetch_in_flight: bool,
}

/// Resolve which notification list a screen should show.
///
/// Precedence: a non-empty role-scoped list always wins; parents and
/// students fall back to the root collection; teachers fall back to the
/// root only while their role-scoped fetch is in flight, so the screen is
/// not blank during the switch-over.
pub fn active_items<'a>(ctx: &FeedContext<'a>) -> &'a [Notification] {
    if let Some(scoped) = ctx.role_scoped {
        if !scoped.is_empty() {
            return &scoped.items;
        }
    }
    match ctx.role {
        Role::Parent | Role::Student => &ctx.root.items,
        Role::Teacher => {
            if ctx.role_fetch_in_flight {
                &ctx.root.items
            } else {
                ctx.role_scoped.map(|c| c.items.as_slice()).unwrap_or(&[])
            }
        }
    }
}

/// The authoritative unread count for a role.
///
/// Parents aggregate across children (the store's max-of-totals rule);
/// students and teachers read their own collection.
pub fn unread_for_role(role: Role, store: &NotificationStore) -> u32 {
    match role {
        Role::Parent => store.total_unread(),
        Role::Student | Role::Teacher => store.root().unread_count,
    }
}

/// Apply a filter, keeping the list's order (newest first).
pub fn filtered<'a>(items: &'a [Notification], filter: Filter) -> Vec<&'a Notification> {
    items.iter().filter(|n| filter.matches(n)).collect()
}

/// Slice a filtered list for display.
pub fn page<'a>(filtered: &[&'a Notification], page: usize, page_size: usize) -> Vec<&'a Notification> {
    filtered
        .iter()
        .skip(page.saturating_sub(1) * page_size)
        .take(page_size)
        .copied()
        .collect()
}

/// Whether the screen should automatically fetch another page.
///
/// A category filter can shrink a full server page to a handful of visible
/// items; without this the list would look finished when it is not.
pub fn should_load_more(visible: usize, has_more: bool) -> bool {
    has_more && visible < MIN_VISIBLE
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn noti(id: &str, kind: &str, read: bool) -> Notification {
        Notification {
            id: id.to_owned(),
            kind: kind.to_owned(),
            read,
            ..Default::default()
        }
    }

    fn collection(items: Vec<Notification>) -> NotificationCollection {
        NotificationCollection::new(items, None)
    }

    #[test]
    fn test_role_scoped_list_wins_when_non_empty() {
        let scoped = collection(vec![noti("s", "grade", false)]);
        let root = collection(vec![noti("r", "grade", false)]);
        let ctx = FeedContext {
            role: Role::Teacher,
            role_scoped: Some(&scoped),
            root: &root,
            role_fetch_in_flight: false,
        };
        assert_eq!(active_items(&ctx)[0].id, "s");
    }

    #[test]
    fn test_student_falls_back_to_root() {
        let scoped = collection(vec![]);
        let root = collection(vec![noti("r", "grade", false)]);
        let ctx = FeedContext {
            role: Role::Student,
            role_scoped: Some(&scoped),
            root: &root,
            role_fetch_in_flight: false,
        };
        assert_eq!(active_items(&ctx)[0].id, "r");
    }

    #[test]
    fn test_teacher_falls_back_only_while_in_flight() {
        let root = collection(vec![noti("r", "grade", false)]);

        let loading = FeedContext {
            role: Role::Teacher,
            role_scoped: None,
            root: &root,
            role_fetch_in_flight: true,
        };
        assert_eq!(active_items(&loading)[0].id, "r");

        let settled = FeedContext {
            role: Role::Teacher,
            role_scoped: None,
            root: &root,
            role_fetch_in_flight: false,
        };
        assert!(active_items(&settled).is_empty());
    }

    #[test]
    fn test_filters() {
        let items = vec![
            noti("1", "behavior", false),
            noti("2", "grade", true),
            noti("3", "exam", false),
            noti("4", "announcement", false),
        ];

        assert_eq!(filtered(&items, Filter::All).len(), 4);
        assert_eq!(filtered(&items, Filter::Unread).len(), 3);
        assert_eq!(filtered(&items, Filter::Behavior).len(), 1);
        // "exam" counts as a grade notification.
        assert_eq!(filtered(&items, Filter::Grade).len(), 2);
        assert_eq!(filtered(&items, Filter::Homework).len(), 0);
        assert_eq!(filtered(&items, Filter::Announcement).len(), 1);
    }

    #[test]
    fn test_pagination_after_filter() {
        let items: Vec<Notification> = (0..25)
            .map(|i| noti(&i.to_string(), "grade", false))
            .collect();
        let visible = filtered(&items, Filter::Grade);

        let first = page(&visible, 1, 10);
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].id, "0");

        let third = page(&visible, 3, 10);
        assert_eq!(third.len(), 5);
        assert_eq!(third[0].id, "20");
    }

    #[test]
    fn test_auto_load_more_heuristic() {
        assert!(should_load_more(3, true));
        assert!(!should_load_more(3, false));
        assert!(!should_load_more(MIN_VISIBLE, true));
    }

    #[test]
    fn test_unread_for_role() {
        let mut store = NotificationStore::new();
        store.replace_all(vec![noti("1", "grade", false)], Some(2));
        store.set_student_collection("a", vec![], Some(5));

        assert_eq!(unread_for_role(Role::Student, &store), 2);
        assert_eq!(unread_for_role(Role::Teacher, &store), 2);
        assert_eq!(unread_for_role(Role::Parent, &store), 5);
    }
}
