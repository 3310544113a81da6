//! Community chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::WishflickClient;
use crate::error::Result;
use crate::net::request::RequestDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: i64,
    pub community_id: i64,
    pub user_id: i64,
    pub message: String,
    #[serde(with = "super::timestamp")]
    pub sent_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    community_id: i64,
    message: &'a str,
}

pub struct CommunityChatApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> CommunityChatApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    /// Messages of a community, oldest first as the backend returns them.
    pub async fn messages(&self, community_id: i64) -> Result<Vec<ChatMessage>> {
        self.client
            .call(RequestDescriptor::get(format!("/community-chat/{community_id}")))
            .await
    }

    pub async fn send(&self, community_id: i64, message: &str) -> Result<ChatMessage> {
        let request = RequestDescriptor::post("/community-chat/").json(&OutgoingMessage {
            community_id,
            message,
        })?;
        self.client.call(request).await
    }

    pub async fn delete(&self, message_id: i64) -> Result<()> {
        self.client
            .call_empty(RequestDescriptor::delete(format!("/community-chat/{message_id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::CredentialPair;
    use crate::auth::store::MemoryTokenStorage;
    use crate::net::mock::{ScriptedTransport, json_response};
    use crate::net::request::RequestBody;
    use serde_json::json;
    use std::sync::Arc;

    fn message_json(id: i64, text: &str) -> serde_json::Value {
        json!({
            "id": id,
            "community_id": 4,
            "user_id": 1,
            "message": text,
            "sent_at": "2024-06-01T18:45:10.5"
        })
    }

    #[tokio::test]
    async fn test_chat_round() {
        let transport = Arc::new(ScriptedTransport::new(|req, _| {
            let (status, body) = match (req.method.as_str(), req.path.as_str()) {
                ("GET", "/community-chat/4") => {
                    (200, json!([message_json(1, "hello"), message_json(2, "hi")]))
                }
                ("POST", "/community-chat/") => {
                    assert_eq!(
                        req.body,
                        RequestBody::Json(json!({"community_id": 4, "message": "ride on sunday?"}))
                    );
                    (201, message_json(3, "ride on sunday?"))
                }
                ("DELETE", "/community-chat/3") => (204, json!(null)),
                (m, p) => panic!("unexpected {m} {p}"),
            };
            Ok(json_response(status, body))
        }));
        let client = WishflickClient::builder()
            .transport(transport.clone())
            .storage(Arc::new(MemoryTokenStorage::with_credentials(
                CredentialPair::new("a", "r").into(),
            )))
            .build()
            .unwrap();
        let chat = client.community_chat();

        let history = chat.messages(4).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sent_at.timestamp_subsec_millis(), 500);

        let sent = chat.send(4, "ride on sunday?").await.unwrap();
        assert_eq!(sent.id, 3);
        chat.delete(3).await.unwrap();

        assert!(transport.calls().iter().all(|(_, bearer)| bearer.as_deref() == Some("a")));
    }
}
