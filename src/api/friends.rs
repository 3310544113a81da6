//! Friend lists.

use serde::{Deserialize, Serialize};

use crate::client::WishflickClient;
use crate::error::Result;
use crate::net::request::RequestDescriptor;

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

pub struct FriendsApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> FriendsApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    /// Friends of the logged-in user.
    pub async fn mine(&self) -> Result<Vec<UserOut>> {
        self.client.call(RequestDescriptor::get("/friends")).await
    }

    pub async fn of_user(&self, user_id: i64) -> Result<Vec<UserOut>> {
        self.client
            .call(RequestDescriptor::get(format!("/users/{user_id}/friends")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStorage;
    use crate::net::mock::{ScriptedTransport, json_response};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_friend_lists() {
        let transport = Arc::new(ScriptedTransport::new(|req, _| {
            let body = match req.path.as_str() {
                "/friends" => json!([{"id": 2, "email": "b@example.com", "name": "Bea"}]),
                "/users/3/friends" => json!([{"id": 1, "email": "a@example.com", "avatar_url": null}]),
                other => panic!("unexpected path {other}"),
            };
            Ok(json_response(200, body))
        }));
        let client = WishflickClient::builder()
            .transport(transport)
            .storage(Arc::new(MemoryTokenStorage::new()))
            .build()
            .unwrap();

        let mine = client.friends().mine().await.unwrap();
        assert_eq!(mine[0].name.as_deref(), Some("Bea"));
        let theirs = client.friends().of_user(3).await.unwrap();
        assert_eq!(theirs[0], UserOut {
            id: 1,
            email: "a@example.com".into(),
            name: None,
            avatar_url: None,
        });
    }
}
