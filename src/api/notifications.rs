//! `/notifications` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::WishflickClient;
use crate::error::Result;
use crate::net::request::RequestDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient_id: i64,
    #[serde(default)]
    pub sender_id: Option<i64>,
    /// e.g. `friend_request`, `join_request`, `message`.
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Filters for [`NotificationsApi::list`]. Unset fields are not sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationQuery {
    pub read_filter: Option<bool>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewNotification {
    pub recipient_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

pub struct NotificationsApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> NotificationsApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: NotificationQuery) -> Result<Vec<Notification>> {
        let mut request = RequestDescriptor::get("/notifications");
        if let Some(read) = query.read_filter {
            request = request.query("read_filter", read);
        }
        if let Some(limit) = query.limit {
            request = request.query("limit", limit);
        }
        self.client.call(request).await
    }

    pub async fn create(&self, notification: &NewNotification) -> Result<Notification> {
        self.client
            .call(RequestDescriptor::post("/notifications").json(notification)?)
            .await
    }

    pub async fn mark_read(&self, id: i64) -> Result<()> {
        self.client
            .call_empty(RequestDescriptor::put(format!("/notifications/{id}/read")))
            .await
    }

    pub async fn accept_friend_request(&self, id: i64) -> Result<()> {
        self.respond(id, "friend-request", "accept").await
    }

    pub async fn reject_friend_request(&self, id: i64) -> Result<()> {
        self.respond(id, "friend-request", "reject").await
    }

    /// Community join request.
    pub async fn accept_join_request(&self, id: i64) -> Result<()> {
        self.respond(id, "join-request", "accept").await
    }

    pub async fn reject_join_request(&self, id: i64) -> Result<()> {
        self.respond(id, "join-request", "reject").await
    }

    async fn respond(&self, id: i64, kind: &str, action: &str) -> Result<()> {
        self.client
            .call_empty(RequestDescriptor::post(format!(
                "/notifications/{id}/{kind}/{action}"
            )))
            .await
    }
}

/// Number of unread notifications.
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

/// Newest first; equal timestamps keep their order.
pub fn sort_newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CredentialPair;
    use crate::auth::store::MemoryTokenStorage;
    use crate::net::mock::{ScriptedTransport, json_response};
    use crate::net::request::RequestBody;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn notification(id: i64, is_read: bool, created_at: &str) -> serde_json::Value {
        json!({
            "id": id,
            "recipient_id": 1,
            "sender_id": null,
            "type": "friend_request",
            "message": "hi",
            "is_read": is_read,
            "created_at": created_at
        })
    }

    fn client(transport: Arc<ScriptedTransport>) -> WishflickClient {
        WishflickClient::builder()
            .transport(transport)
            .storage(Arc::new(MemoryTokenStorage::with_credentials(
                CredentialPair::new("a", "r").into(),
            )))
            .build()
            .unwrap()
    }

    #[test]
    fn test_timestamp_formats() {
        let naive: Notification =
            serde_json::from_value(notification(1, false, "2024-05-01T10:00:00.123456")).unwrap();
        let zoned: Notification =
            serde_json::from_value(notification(2, false, "2024-05-01T12:00:00+02:00")).unwrap();
        assert_eq!(naive.created_at.timestamp(), zoned.created_at.timestamp());
        assert!(serde_json::from_value::<Notification>(notification(3, false, "yesterday")).is_err());
    }

    #[test]
    fn test_unread_and_sort() {
        let mut list: Vec<Notification> = [
            notification(1, true, "2024-01-01T00:00:00"),
            notification(2, false, "2024-03-01T00:00:00"),
            notification(3, false, "2024-02-01T00:00:00"),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();

        assert_eq!(unread_count(&list), 2);
        sort_newest_first(&mut list);
        let ids: Vec<i64> = list.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_list_sends_only_set_filters() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = {
            let seen = seen.clone();
            Arc::new(ScriptedTransport::new(move |req, _| {
                seen.lock().unwrap().push(req.query.clone());
                Ok(json_response(200, json!([notification(1, false, "2024-01-01T00:00:00")])))
            }))
        };
        let client = client(transport);

        let list = client
            .notifications()
            .list(NotificationQuery::default())
            .await
            .unwrap();
        assert_eq!(list.len(), 1);
        client
            .notifications()
            .list(NotificationQuery {
                read_filter: Some(false),
                limit: Some(5),
            })
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen[0].is_empty());
        assert_eq!(
            seen[1],
            vec![
                ("read_filter".to_string(), "false".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_actions_hit_expected_paths() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = {
            let seen = seen.clone();
            Arc::new(ScriptedTransport::new(move |req, _| {
                seen.lock().unwrap().push((req.method.clone(), req.path.clone()));
                Ok(json_response(200, json!(null)))
            }))
        };
        let client = client(transport);
        let api = client.notifications();

        api.mark_read(4).await.unwrap();
        api.accept_friend_request(5).await.unwrap();
        api.reject_friend_request(6).await.unwrap();
        api.accept_join_request(7).await.unwrap();
        api.reject_join_request(8).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (Method::PUT, "/notifications/4/read".to_string()),
                (Method::POST, "/notifications/5/friend-request/accept".to_string()),
                (Method::POST, "/notifications/6/friend-request/reject".to_string()),
                (Method::POST, "/notifications/7/join-request/accept".to_string()),
                (Method::POST, "/notifications/8/join-request/reject".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_omits_unset_ids() {
        let transport = Arc::new(ScriptedTransport::new(|req, _| {
            assert_eq!(
                req.body,
                RequestBody::Json(json!({"recipient_id": 2, "type": "message", "message": "hey"}))
            );
            Ok(json_response(201, notification(9, false, "2024-01-01T00:00:00")))
        }));
        let client = client(transport);

        let created = client
            .notifications()
            .create(&NewNotification {
                recipient_id: 2,
                sender_id: None,
                community_id: None,
                kind: "message".into(),
                message: "hey".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, 9);
    }
}
