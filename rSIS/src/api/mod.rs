//! API modules.

mod notification;

pub use notification::{CategoryInfo, NotificationApi, NotificationListBuilder};
