//! Rust client library for school information system mobile apps.
//!
//! Covers the notification subsystem end to end: fetching pages from the
//! backend (including parent-proxy fetches of a child's data), reconciling
//! read state and unread counts in a process-wide store, and deriving the
//! per-role view a screen presents.

pub mod api;
pub mod cache;
pub mod client;
pub mod error;
pub mod models;
pub mod present;
pub mod store;
pub mod sync;

// Re-export main types
pub use client::{AuthInfo, Device, HttpConfig, SISClient, SISClientBuilder};
pub use error::{Error, Result};

// Re-export commonly used models
pub use models::{Notification, NotificationCollection};

// Re-export the notification state machine
pub use present::{Filter, Role};
pub use store::{BadgeSink, NotificationStore};
pub use sync::{
    ListState, LoadOutcome, NotificationPage, NotificationSource, PageRequest, Poller,
    SyncController, SyncTarget,
};

// Re-export API types
pub use api::{CategoryInfo, NotificationApi, NotificationListBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = SISClient::builder().build();
        assert!(client.is_ok());

        let client = client.unwrap();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_client_with_auth() {
        let client = SISClient::builder()
            .auth("test_code", "12345")
            .build()
            .unwrap();

        assert!(client.is_authenticated());
        assert_eq!(client.current_user_id(), Some("12345"));
    }
}
