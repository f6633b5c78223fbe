//! Server payload normalization.
//!
//! The backend is loose about shapes: the list envelope carries either
//! `notifications` or `data`, records spell fields in snake or camel case,
//! and read state arrives as either a timestamp or a flag. Everything funnels
//! through [`normalize_page`] with one explicit, ordered set of fallbacks so
//! no call site needs its own guessing.

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

use super::source::NotificationPage;
use crate::models::{Notification, GENERAL_KIND};

/// Timestamps below this are taken to be epoch seconds, not milliseconds.
const MS_THRESHOLD: i64 = 1_000_000_000_000;

/// Normalize a raw list response into a page.
///
/// `now_ms` seeds fallback ids and timestamps; callers pass the injected
/// clock so the result is deterministic under test.
pub fn normalize_page(
    envelope: &Value,
    student_auth_code: Option<&str>,
    now_ms: i64,
) -> NotificationPage {
    let records = envelope
        .get("notifications")
        .or_else(|| envelope.get("data"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let items = records
        .iter()
        .enumerate()
        .map(|(i, record)| normalize_record(record, student_auth_code, now_ms + i as i64))
        .collect();

    NotificationPage {
        items,
        unread_count: first_u64(envelope, &["unread_count", "unreadCount"]).map(|n| n as u32),
        total: first_u64(envelope, &["total", "total_count", "totalCount"]),
    }
}

/// Normalize one server record.
///
/// Fallback order, per field:
/// 1. `id`: server id (number or string), then a secondary id field, then
///    the timestamp seed.
/// 2. `read`: a truthy read-at timestamp or a truthy is-read flag.
/// 3. kind: category, then type, then `general`.
/// 4. `timestamp`: parsed created-at, else the seed.
pub fn normalize_record(record: &Value, student_auth_code: Option<&str>, now_ms: i64) -> Notification {
    let id = first_string(record, &["id", "notification_id", "notificationId"])
        .unwrap_or_else(|| now_ms.to_string());

    let read = is_truthy(pick(record, &["read_at", "readAt"]))
        || is_truthy(pick(record, &["is_read", "isRead", "read"]));

    let kind = first_string(record, &["category", "type"])
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| GENERAL_KIND.to_owned());

    let timestamp = pick(record, &["created_at", "createdAt", "timestamp"])
        .and_then(parse_timestamp_ms)
        .unwrap_or(now_ms);

    Notification {
        id,
        title: first_string(record, &["title", "subject"]).unwrap_or_default(),
        body: first_string(record, &["body", "message", "content"]).unwrap_or_default(),
        timestamp,
        read,
        kind,
        student_auth_code: student_auth_code.map(str::to_owned),
        source: record.clone(),
    }
}

fn pick<'v>(record: &'v Value, names: &[&str]) -> Option<&'v Value> {
    names.iter().find_map(|name| record.get(*name))
}

fn first_string(record: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match record.get(*name) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn first_u64(record: &Value, names: &[&str]) -> Option<u64> {
    names.iter().find_map(|name| match record.get(*name) {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Truthiness the way the backend means it: absent, null, false, zero, and
/// empty or zero-ish strings are all "no".
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0" && s != "false" && s != "null",
        Some(_) => true,
    }
}

/// Parse a created-at value to epoch milliseconds.
fn parse_timestamp_ms(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            let n = n.as_i64()?;
            Some(if n >= MS_THRESHOLD { n } else { n * 1000 })
        }
        Value::String(s) => {
            if let Ok(n) = s.parse::<i64>() {
                return Some(if n >= MS_THRESHOLD { n } else { n * 1000 });
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp_millis());
            }
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc().timestamp_millis())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_numeric_id_becomes_string() {
        let n = normalize_record(&json!({ "id": 42 }), None, NOW);
        assert_eq!(n.id, "42");
    }

    #[test]
    fn test_fallback_id_field() {
        let n = normalize_record(&json!({ "notification_id": "abc" }), None, NOW);
        assert_eq!(n.id, "abc");
    }

    #[test]
    fn test_missing_id_uses_clock() {
        let n = normalize_record(&json!({ "title": "t" }), None, NOW);
        assert_eq!(n.id, NOW.to_string());
    }

    #[test]
    fn test_read_from_read_at_or_flag() {
        assert!(normalize_record(&json!({ "read_at": "2024-01-01 10:00:00" }), None, NOW).read);
        assert!(normalize_record(&json!({ "is_read": true }), None, NOW).read);
        assert!(normalize_record(&json!({ "is_read": 1 }), None, NOW).read);
        assert!(!normalize_record(&json!({ "read_at": null, "is_read": false }), None, NOW).read);
        assert!(!normalize_record(&json!({ "read_at": "" }), None, NOW).read);
        assert!(!normalize_record(&json!({}), None, NOW).read);
    }

    #[test]
    fn test_kind_defaults_to_general() {
        assert_eq!(
            normalize_record(&json!({ "category": "behavior" }), None, NOW).kind,
            "behavior"
        );
        assert_eq!(
            normalize_record(&json!({ "type": "grade" }), None, NOW).kind,
            "grade"
        );
        assert_eq!(normalize_record(&json!({}), None, NOW).kind, GENERAL_KIND);
    }

    #[test]
    fn test_timestamp_parsing() {
        let rfc = normalize_record(&json!({ "created_at": "2023-11-14T22:13:20Z" }), None, NOW);
        assert_eq!(rfc.timestamp, 1_700_000_000_000);

        let sql = normalize_record(&json!({ "created_at": "2023-11-14 22:13:20" }), None, NOW);
        assert_eq!(sql.timestamp, 1_700_000_000_000);

        let secs = normalize_record(&json!({ "created_at": 1_700_000_000 }), None, NOW);
        assert_eq!(secs.timestamp, 1_700_000_000_000);

        let ms = normalize_record(&json!({ "created_at": 1_700_000_000_123i64 }), None, NOW);
        assert_eq!(ms.timestamp, 1_700_000_000_123);

        let garbage = normalize_record(&json!({ "created_at": "not a date" }), None, NOW);
        assert_eq!(garbage.timestamp, NOW);
    }

    #[test]
    fn test_source_retained() {
        let record = json!({ "id": 7, "extra": { "deep": true } });
        let n = normalize_record(&record, None, NOW);
        assert_eq!(n.source, record);
    }

    #[test]
    fn test_student_auth_code_tagged() {
        let n = normalize_record(&json!({ "id": 1 }), Some("child-1"), NOW);
        assert_eq!(n.student_auth_code.as_deref(), Some("child-1"));
    }

    #[test]
    fn test_envelope_notifications_or_data() {
        let a = normalize_page(&json!({ "notifications": [{ "id": 1 }] }), None, NOW);
        assert_eq!(a.items.len(), 1);

        let b = normalize_page(&json!({ "data": [{ "id": 1 }, { "id": 2 }] }), None, NOW);
        assert_eq!(b.items.len(), 2);

        let neither = normalize_page(&json!({ "success": true }), None, NOW);
        assert!(neither.items.is_empty());
    }

    #[test]
    fn test_envelope_counts() {
        let page = normalize_page(
            &json!({ "notifications": [], "unread_count": 5, "total": 120 }),
            None,
            NOW,
        );
        assert_eq!(page.unread_count, Some(5));
        assert_eq!(page.total, Some(120));

        let camel = normalize_page(&json!({ "data": [], "unreadCount": "3" }), None, NOW);
        assert_eq!(camel.unread_count, Some(3));
    }

    #[test]
    fn test_fallback_ids_unique_within_page() {
        let page = normalize_page(&json!({ "data": [{}, {}, {}] }), None, NOW);
        let mut ids: Vec<_> = page.items.iter().map(|n| n.id.clone()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_realistic_fixture() {
        let envelope = json!({
            "success": true,
            "unread_count": 2,
            "total": 41,
            "notifications": [
                {
                    "id": 9001,
                    "title": "Attendance updated",
                    "message": "Riley was marked late for period 2.",
                    "category": "attendance",
                    "created_at": "2024-03-05T08:41:00Z",
                    "read_at": null
                },
                {
                    "notificationId": "9000",
                    "subject": "Math quiz graded",
                    "content": "Score posted: 18/20",
                    "type": "grade",
                    "createdAt": "2024-03-04 15:02:11",
                    "isRead": 1
                }
            ]
        });

        let page = normalize_page(&envelope, Some("child-7"), NOW);
        assert_eq!(page.unread_count, Some(2));
        assert_eq!(page.total, Some(41));

        let first = &page.items[0];
        assert_eq!(first.id, "9001");
        assert_eq!(first.title, "Attendance updated");
        assert_eq!(first.body, "Riley was marked late for period 2.");
        assert_eq!(first.kind, "attendance");
        assert!(!first.read);

        let second = &page.items[1];
        assert_eq!(second.id, "9000");
        assert_eq!(second.title, "Math quiz graded");
        assert_eq!(second.kind, "grade");
        assert!(second.read);
        assert_eq!(second.student_auth_code.as_deref(), Some("child-7"));
    }
}
