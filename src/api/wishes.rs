//! Wishes.

use serde::{Deserialize, Serialize};

use crate::client::WishflickClient;
use crate::error::Result;
use crate::net::request::RequestDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wish {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub goal: f64,
    pub raised: f64,
    pub owner_id: i64,
    pub is_public: bool,
}

impl Wish {
    /// Share of the goal raised so far, clamped to `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.goal <= 0.0 {
            return 0.0;
        }
        (self.raised / self.goal).clamp(0.0, 1.0)
    }
}

/// Fields for creating or updating a wish. Sent as `multipart/form-data`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWish {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub goal: f64,
    pub is_public: bool,
}

impl NewWish {
    fn parts(&self) -> Vec<(&'static str, String)> {
        let mut parts = vec![
            ("title", self.title.clone()),
            ("description", self.description.clone()),
            ("goal", self.goal.to_string()),
            ("is_public", self.is_public.to_string()),
        ];
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            parts.push(("image_url", url.to_string()));
        }
        parts
    }
}

pub struct WishesApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> WishesApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    /// Wishes of the logged-in user.
    pub async fn mine(&self) -> Result<Vec<Wish>> {
        self.client.call(RequestDescriptor::get("/wishes/")).await
    }

    pub async fn of_user(&self, user_id: i64) -> Result<Vec<Wish>> {
        self.client
            .call(RequestDescriptor::get(format!("/users/{user_id}/wishes")))
            .await
    }

    pub async fn get(&self, wish_id: i64) -> Result<Wish> {
        self.client
            .call(RequestDescriptor::get(format!("/wishes/{wish_id}")))
            .await
    }

    pub async fn create(&self, wish: &NewWish) -> Result<Wish> {
        self.client
            .call(RequestDescriptor::post("/wishes").multipart(wish.parts()))
            .await
    }

    pub async fn update(&self, wish_id: i64, wish: &NewWish) -> Result<Wish> {
        self.client
            .call(RequestDescriptor::put(format!("/wishes/{wish_id}")).multipart(wish.parts()))
            .await
    }

    pub async fn delete(&self, wish_id: i64) -> Result<()> {
        self.client
            .call_empty(RequestDescriptor::delete(format!("/wishes/{wish_id}")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemoryTokenStorage;
    use crate::net::mock::{ScriptedTransport, json_response};
    use crate::net::request::RequestBody;
    use serde_json::json;
    use std::sync::Arc;

    fn wish_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Bike",
            "description": null,
            "goal": 300,
            "raised": 75.5,
            "owner_id": 1,
            "is_public": true
        })
    }

    fn new_wish(image_url: Option<&str>) -> NewWish {
        NewWish {
            title: "Bike".into(),
            description: "Red one".into(),
            image_url: image_url.map(str::to_string),
            goal: 300.0,
            is_public: true,
        }
    }

    #[test]
    fn test_parts_skip_empty_image() {
        let parts = new_wish(Some("")).parts();
        assert_eq!(
            parts,
            vec![
                ("title", "Bike".to_string()),
                ("description", "Red one".to_string()),
                ("goal", "300".to_string()),
                ("is_public", "true".to_string()),
            ]
        );
        assert_eq!(new_wish(Some("https://img/x.png")).parts().len(), 5);
    }

    #[test]
    fn test_progress() {
        let wish: Wish = serde_json::from_value(wish_json(1)).unwrap();
        assert!((wish.progress() - 0.251_666).abs() < 1e-3);
        let free = Wish { goal: 0.0, ..wish };
        assert_eq!(free.progress(), 0.0);
    }

    #[tokio::test]
    async fn test_endpoints() {
        let transport = Arc::new(ScriptedTransport::new(|req, _| {
            let body = match (req.method.as_str(), req.path.as_str()) {
                ("GET", "/wishes/") | ("GET", "/users/2/wishes") => {
                    json!([wish_json(1)])
                }
                ("GET", "/wishes/1") => wish_json(1),
                ("POST", "/wishes") | ("PUT", "/wishes/1") => {
                    assert!(matches!(&req.body, RequestBody::Multipart { fields, .. } if fields.len() == 5));
                    wish_json(1)
                }
                ("DELETE", "/wishes/1") => json!(null),
                (m, p) => panic!("unexpected {m} {p}"),
            };
            Ok(json_response(200, body))
        }));
        let client = WishflickClient::builder()
            .transport(transport.clone())
            .storage(Arc::new(MemoryTokenStorage::new()))
            .build()
            .unwrap();
        let wishes = client.wishes();

        assert_eq!(wishes.mine().await.unwrap().len(), 1);
        assert_eq!(wishes.of_user(2).await.unwrap()[0].raised, 75.5);
        assert_eq!(wishes.get(1).await.unwrap().title, "Bike");
        let draft = new_wish(Some("https://img/x.png"));
        wishes.create(&draft).await.unwrap();
        wishes.update(1, &draft).await.unwrap();
        wishes.delete(1).await.unwrap();
        assert_eq!(transport.calls().len(), 6);
    }
}
