//! Data-source seam between the sync controller and the remote API.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Notification;

/// Default page size for notification list requests.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Parameters for one notification page fetch.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Server-side category filter, if any.
    pub category: Option<String>,
    /// Child auth code for parent-proxy fetches; `None` for the viewer's
    /// own notifications.
    pub student_auth_code: Option<String>,
}

impl PageRequest {
    /// First page, default size, no filters.
    pub fn first() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            category: None,
            student_auth_code: None,
        }
    }
}

/// One normalized page of notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationPage {
    /// Normalized notifications, server order preserved.
    pub items: Vec<Notification>,
    /// Server-reported unread count, when the response carried one.
    /// Trusted only on a fresh page-1 load; a single later page cannot
    /// speak for the whole list.
    pub unread_count: Option<u32>,
    /// Server-reported total item count, when present.
    pub total: Option<u64>,
}

/// Where notification pages come from.
///
/// Implemented by [`NotificationApi`](crate::api::NotificationApi) over the
/// remote backend; tests substitute in-memory fakes.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Fetch one page.
    async fn fetch_page(&self, req: &PageRequest) -> Result<NotificationPage>;

    /// Tell the server a notification was read.
    async fn mark_read(&self, server_id: &str, student_auth_code: Option<&str>) -> Result<()>;

    /// Tell the server every notification was read.
    async fn mark_all_read(&self, student_auth_code: Option<&str>) -> Result<()>;
}
