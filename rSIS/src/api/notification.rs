//! Notification API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    client::SISClientInner,
    error::{Error, Result},
    sync::{normalize_page, NotificationPage, NotificationSource, PageRequest, DEFAULT_PAGE_SIZE},
};

/// API for notification operations.
pub struct NotificationApi {
    client: Arc<SISClientInner>,
}

impl NotificationApi {
    pub(crate) fn new(client: Arc<SISClientInner>) -> Self {
        Self { client }
    }

    /// List notifications for the signed-in user, or for a child via the
    /// parent-proxy parameter.
    pub fn list(&self) -> NotificationListBuilder {
        NotificationListBuilder {
            client: self.client.clone(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            category: None,
            student_auth_code: None,
        }
    }

    /// Mark one notification as read.
    pub async fn mark_read(
        &self,
        notification_id: impl AsRef<str>,
        student_auth_code: Option<&str>,
    ) -> Result<()> {
        let mut body = json!({ "notificationId": notification_id.as_ref() });
        if let Some(code) = student_auth_code {
            body["studentAuthCode"] = json!(code);
        }

        self.client
            .post_authed("notifications/read", &[], &body)
            .await?;

        Ok(())
    }

    /// Mark all notifications as read.
    pub async fn mark_all_read(&self, student_auth_code: Option<&str>) -> Result<()> {
        let body = match student_auth_code {
            Some(code) => json!({ "studentAuthCode": code }),
            None => json!({}),
        };

        self.client
            .post_authed("notifications/read-all", &[], &body)
            .await?;

        Ok(())
    }

    /// Fetch the server's notification category definitions.
    pub async fn categories(&self) -> Result<Vec<CategoryInfo>> {
        let value = self
            .client
            .get_authed("notifications/categories", &[])
            .await?;
        parse_categories(&value)
    }

    /// Fetch notification delivery statistics (staff only).
    pub async fn statistics(&self, params: &[(&str, &str)]) -> Result<Value> {
        self.client
            .get_authed("notifications/statistics", params)
            .await
    }

    /// Send a notification (staff only).
    pub async fn send(&self, payload: &Value) -> Result<()> {
        self.client
            .post_authed("notifications/send", &[], payload)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl NotificationSource for NotificationApi {
    async fn fetch_page(&self, req: &PageRequest) -> Result<NotificationPage> {
        let mut builder = self.list().page(req.page).limit(req.limit);
        if let Some(category) = &req.category {
            builder = builder.category(category);
        }
        if let Some(code) = &req.student_auth_code {
            builder = builder.student(code);
        }
        builder.send().await
    }

    async fn mark_read(&self, server_id: &str, student_auth_code: Option<&str>) -> Result<()> {
        NotificationApi::mark_read(self, server_id, student_auth_code).await
    }

    async fn mark_all_read(&self, student_auth_code: Option<&str>) -> Result<()> {
        NotificationApi::mark_all_read(self, student_auth_code).await
    }
}

/// Builder for notification list requests.
pub struct NotificationListBuilder {
    client: Arc<SISClientInner>,
    page: u32,
    limit: u32,
    category: Option<String>,
    student_auth_code: Option<String>,
}

impl NotificationListBuilder {
    /// Set the page number.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict to one category server-side.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Fetch a child's notifications (parent proxy).
    pub fn student(mut self, auth_code: impl Into<String>) -> Self {
        self.student_auth_code = Some(auth_code.into());
        self
    }

    /// Execute the request.
    pub async fn send(self) -> Result<NotificationPage> {
        let page_str = self.page.to_string();
        let limit_str = self.limit.to_string();

        let mut query: Vec<(&str, &str)> = vec![("page", &page_str), ("limit", &limit_str)];
        if let Some(category) = &self.category {
            query.push(("category", category));
        }
        if let Some(code) = &self.student_auth_code {
            query.push(("studentAuthCode", code));
        }

        let value = self.client.get_authed("notifications", &query).await?;

        Ok(normalize_page(
            &value,
            self.student_auth_code.as_deref(),
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}

/// A server-defined notification category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Category tag as it appears on notifications.
    pub name: String,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Display color, if the server themes categories.
    #[serde(default)]
    pub color: Option<String>,
}

fn parse_categories(value: &Value) -> Result<Vec<CategoryInfo>> {
    let records = value
        .get("categories")
        .or_else(|| value.get("data"))
        .ok_or_else(|| Error::missing("categories"))?;

    serde_json::from_value(records.clone()).map_err(Error::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_categories() {
        let value = json!({
            "success": true,
            "categories": [
                { "name": "behavior", "label": "Behavior", "color": "#d9534f" },
                { "name": "grade" }
            ]
        });

        let categories = parse_categories(&value).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "behavior");
        assert_eq!(categories[0].color.as_deref(), Some("#d9534f"));
        assert!(categories[1].label.is_none());
    }

    #[test]
    fn test_parse_categories_data_envelope() {
        let value = json!({ "data": [{ "name": "homework" }] });
        assert_eq!(parse_categories(&value).unwrap()[0].name, "homework");
    }

    #[test]
    fn test_parse_categories_missing() {
        let value = json!({ "success": true });
        assert!(parse_categories(&value).is_err());
    }
}
