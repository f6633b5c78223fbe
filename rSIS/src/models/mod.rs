//! Data models for SIS entities.

mod notification;

pub use notification::{count_unread, Notification, NotificationCollection, GENERAL_KIND};
