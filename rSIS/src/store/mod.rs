//! Notification store: single source of truth for notification data and
//! unread counts.
//!
//! The store holds the signed-in user's own (root) collection plus one
//! collection per child when the viewer is a parent. It owns all read-state
//! mutation and does no network I/O; the sync controller feeds it. Every
//! operation is a total function over in-memory state.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::Result;
use crate::models::{Notification, NotificationCollection};

/// Sink for the OS application-icon badge count.
///
/// Propagation is best effort: the store logs and swallows sink errors,
/// they never reach the caller.
pub trait BadgeSink: Send + Sync + std::fmt::Debug {
    /// Set the badge to `count`.
    fn set_badge(&self, count: u32) -> Result<()>;
}

/// Process-wide notification state for one signed-in session.
///
/// Created on sign-in, cleared on logout. Single-threaded by design: all
/// mutation happens on the UI event loop, so consumers share it without
/// locking.
#[derive(Debug, Default)]
pub struct NotificationStore {
    root: NotificationCollection,
    /// Per-child collections, keyed by the child's auth code or student id.
    /// Created lazily, removed only by logout cleanup. BTreeMap so the
    /// mark-read search order across children is deterministic (ascending
    /// key).
    students: BTreeMap<String, NotificationCollection>,
    badge: Option<Arc<dyn BadgeSink>>,
}

impl NotificationStore {
    /// Create an empty store with no badge sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that propagates unread totals to `badge`.
    pub fn with_badge(badge: Arc<dyn BadgeSink>) -> Self {
        Self {
            badge: Some(badge),
            ..Self::default()
        }
    }

    /// The signed-in user's own collection.
    pub fn root(&self) -> &NotificationCollection {
        &self.root
    }

    /// A child's collection, if one has been loaded.
    pub fn student(&self, key: &str) -> Option<&NotificationCollection> {
        self.students.get(key)
    }

    /// Keys of all loaded child collections, ascending.
    pub fn student_keys(&self) -> impl Iterator<Item = &str> {
        self.students.keys().map(String::as_str)
    }

    /// Overwrite the root collection wholesale.
    ///
    /// When `unread_count` is `None` it is computed from the items' read
    /// flags; a supplied value (a server-reported count on a fresh load)
    /// is trusted as-is.
    pub fn replace_all(&mut self, items: Vec<Notification>, unread_count: Option<u32>) {
        self.root = NotificationCollection::new(items, unread_count);
        self.push_badge(self.total_unread());
    }

    /// Overwrite one child's collection wholesale, creating it on first use.
    pub fn set_student_collection(
        &mut self,
        student_key: impl Into<String>,
        items: Vec<Notification>,
        unread_count: Option<u32>,
    ) {
        self.students.insert(
            student_key.into(),
            NotificationCollection::new(items, unread_count),
        );
        self.push_badge(self.total_unread());
    }

    /// Mark a notification read, searching the root collection first and
    /// then each child collection in ascending key order; the first match
    /// wins. Applied optimistically: server confirmation happens elsewhere
    /// and is never rolled back.
    ///
    /// Returns whether a matching notification was found. Unknown ids are
    /// a silent no-op.
    pub fn mark_read(&mut self, id: &str) -> bool {
        let found = self.root.mark_read(id)
            || self
                .students
                .values_mut()
                .any(|collection| collection.mark_read(id));

        if found {
            self.push_badge(self.total_unread());
        } else {
            debug!("mark_read: no notification with id {}", id);
        }
        found
    }

    /// Mark every notification in the root collection read and zero its
    /// unread count.
    pub fn mark_all_root_read(&mut self) {
        for n in &mut self.root.items {
            n.read = true;
        }
        self.root.unread_count = 0;
        self.push_badge(self.total_unread());
    }

    /// Mark every notification in one child's collection read.
    pub fn mark_all_student_read(&mut self, student_key: &str) {
        if let Some(collection) = self.students.get_mut(student_key) {
            for n in &mut collection.items {
                n.read = true;
            }
            collection.unread_count = 0;
            self.push_badge(self.total_unread());
        }
    }

    /// Empty the root collection and zero the badge. Child collections are
    /// untouched; logout cleanup calls [`reset`](Self::reset) instead.
    pub fn clear_all(&mut self) {
        self.root = NotificationCollection::default();
        self.push_badge(0);
    }

    /// Full logout teardown: root and all child collections cleared,
    /// badge zeroed.
    pub fn reset(&mut self) {
        self.root = NotificationCollection::default();
        self.students.clear();
        self.push_badge(0);
    }

    /// The authoritative unread total for the badge.
    ///
    /// The same account is either a single-identity user (root collection)
    /// or a parent proxying children (per-student collections); only one
    /// total is meaningful at a time. Taking the max avoids under-reporting
    /// while both are partially populated during a role transition.
    pub fn total_unread(&self) -> u32 {
        let student_total: u32 = self.students.values().map(|c| c.unread_count).sum();
        self.root.unread_count.max(student_total)
    }

    /// Find a notification by id across all collections, root first then
    /// children in ascending key order.
    pub fn find(&self, id: &str) -> Option<&Notification> {
        self.root
            .items
            .iter()
            .find(|n| n.id == id)
            .or_else(|| {
                self.students
                    .values()
                    .flat_map(|c| c.items.iter())
                    .find(|n| n.id == id)
            })
    }

    fn push_badge(&self, count: u32) {
        if let Some(sink) = &self.badge {
            if let Err(e) = sink.set_badge(count) {
                warn!("badge update failed: {}", e);
            }
        }
    }
}
