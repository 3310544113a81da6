//! `/communities` endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::WishflickClient;
use crate::error::Result;
use crate::net::request::{FilePart, RequestDescriptor};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rules: Option<String>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub members_count: Option<u32>,
    #[serde(default)]
    pub wishes_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// User id, sent as a string by the backend.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// `admin`, `moderator` or `member`.
    pub role: String,
    #[serde(rename = "isOnline")]
    pub is_online: bool,
    pub contributions: f64,
}

/// Fields of a community form. Unset fields are not sent, so the same
/// type serves for create and partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub rules: Option<String>,
    pub image_url: Option<String>,
    /// Uploaded as the `image_file` part.
    pub image: Option<FilePart>,
}

impl CommunityForm {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn into_request(self, request: RequestDescriptor) -> RequestDescriptor {
        let fields = [
            ("name", self.name),
            ("description", self.description),
            ("category", self.category),
            ("rules", self.rules),
            ("image_url", self.image_url),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)));

        let request = request.multipart(fields);
        match self.image {
            Some(image) => request.attach(FilePart {
                field: "image_file".into(),
                ..image
            }),
            None => request,
        }
    }
}

#[derive(Serialize)]
struct NewMember<'a> {
    user_id: i64,
    role: &'a str,
}

pub struct CommunitiesApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> CommunitiesApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Community>> {
        self.client.call(RequestDescriptor::get("/communities/")).await
    }

    pub async fn get(&self, community_id: i64) -> Result<Community> {
        self.client
            .call(RequestDescriptor::get(format!("/communities/{community_id}")))
            .await
    }

    /// Guests get a 403 here.
    pub async fn create(&self, form: CommunityForm) -> Result<Community> {
        let request = form.into_request(RequestDescriptor::post("/communities"));
        self.client.call(request).await
    }

    /// Admins only.
    pub async fn update(&self, community_id: i64, form: CommunityForm) -> Result<Community> {
        let request =
            form.into_request(RequestDescriptor::patch(format!("/communities/{community_id}")));
        self.client.call(request).await
    }

    /// Admins only.
    pub async fn delete(&self, community_id: i64) -> Result<()> {
        self.client
            .call_empty(RequestDescriptor::delete(format!("/communities/{community_id}")))
            .await
    }

    pub async fn members(&self, community_id: i64) -> Result<Vec<Member>> {
        self.client
            .call(RequestDescriptor::get(format!("/communities/{community_id}/members")))
            .await
    }

    /// Add `user_id` with `role` (`member` unless stated). A user who is
    /// already a member gets a 400.
    pub async fn add_member(&self, community_id: i64, user_id: i64, role: &str) -> Result<Member> {
        let request = RequestDescriptor::post(format!("/communities/{community_id}/members"))
            .json(&NewMember { user_id, role })?;
        self.client.call(request).await
    }

    pub async fn of_user(&self, user_id: i64) -> Result<Vec<Community>> {
        self.client
            .call(RequestDescriptor::get(format!("/users/{user_id}/communities")))
            .await
    }
}
