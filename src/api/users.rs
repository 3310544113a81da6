//! Users and the caller's own profile.

use serde::{Deserialize, Serialize};

use super::auth::Privacy;
use super::wishes::Wish;
use crate::client::WishflickClient;
use crate::error::Result;
use crate::net::request::{FilePart, RequestDescriptor};

/// The logged-in user, as returned by `/users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privacy: Privacy,
    #[serde(default)]
    pub social_facebook: Option<String>,
    #[serde(default)]
    pub social_twitter: Option<String>,
    #[serde(default)]
    pub social_instagram: Option<String>,
    #[serde(default)]
    pub is_guest: Option<bool>,
    #[serde(default)]
    pub wishes: Vec<Wish>,
}

/// Another user, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCard {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "mutualFriends")]
    pub mutual_friends: u32,
    #[serde(rename = "wishlistsCount")]
    pub wishlists_count: u32,
    #[serde(default)]
    pub is_guest: Option<bool>,
    /// Only present in the user list.
    #[serde(rename = "isFriend", default)]
    pub is_friend: bool,
}

/// Result of a profile update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatedProfile {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub privacy: Option<Privacy>,
    #[serde(default)]
    pub social_facebook: Option<String>,
    #[serde(default)]
    pub social_twitter: Option<String>,
    #[serde(default)]
    pub social_instagram: Option<String>,
    #[serde(default)]
    pub is_influencer: Option<bool>,
}

/// Profile form. Sent as `multipart/form-data`; unset fields are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub privacy: Option<Privacy>,
    /// An empty link clears it.
    pub social_facebook: Option<String>,
    pub social_twitter: Option<String>,
    pub social_instagram: Option<String>,
    pub is_influencer: Option<bool>,
}

impl ProfileUpdate {
    fn parts(&self) -> Vec<(&'static str, String)> {
        let privacy = self.privacy.map(|p| match p {
            Privacy::Public => "public".to_string(),
            Privacy::Friends => "friends".to_string(),
            Privacy::Private => "private".to_string(),
        });
        [
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("description", self.description.clone()),
            ("privacy", privacy),
            ("social_facebook", self.social_facebook.clone()),
            ("social_twitter", self.social_twitter.clone()),
            ("social_instagram", self.social_instagram.clone()),
            ("is_influencer", self.is_influencer.map(|b| b.to_string())),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
    }
}

pub struct UsersApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> Result<Profile> {
        self.client.call(RequestDescriptor::get("/users/me")).await
    }

    pub async fn get(&self, user_id: i64) -> Result<UserCard> {
        self.client
            .call(RequestDescriptor::get(format!("/users/{user_id}")))
            .await
    }

    /// Every user, with friendship flags relative to the caller.
    pub async fn list(&self) -> Result<Vec<UserCard>> {
        self.client.call(RequestDescriptor::get("/users/")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UpdatedProfile> {
        self.client
            .call(RequestDescriptor::put("/profile").multipart(update.parts()))
            .await
    }

    /// Replace the avatar. The file goes up as the `avatar` part.
    pub async fn upload_avatar(&self, image: FilePart) -> Result<UpdatedProfile> {
        let image = FilePart {
            field: "avatar".into(),
            ..image
        };
        self.client
            .call(RequestDescriptor::put("/profile/avatar").attach(image))
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

    fn card_json(id: i64, is_friend: Option<bool>) -> serde_json::Value {
        let mut card = json!({
            "id": id,
            "email": "bea@example.com",
            "name": "Bea",
            "avatar_url": null,
            "mutualFriends": 2,
            "wishlistsCount": 4
        });
        if let Some(flag) = is_friend {
            card["isFriend"] = json!(flag);
        }
        card
    }

    fn updated_json() -> serde_json::Value {
        json!({
            "id": 1,
            "name": "Ann",
            "email": "ann@example.com",
            "privacy": "friends",
            "avatar_url": "/uploads/avatars/1.png",
            "is_influencer": false
        })
    }

    #[test]
    fn test_profile_parts_skip_unset() {
        let update = ProfileUpdate {
            name: Some("Ann".into()),
            privacy: Some(Privacy::Friends),
            social_twitter: Some(String::new()),
            is_influencer: Some(true),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            update.parts(),
            vec![
                ("name", "Ann".to_string()),
                ("privacy", "friends".to_string()),
                ("social_twitter", String::new()),
                ("is_influencer", "true".to_string()),
            ]
        );
        assert!(ProfileUpdate::default().parts().is_empty());
    }

    #[tokio::test]
    async fn test_user_endpoints() {
        let transport = Arc::new(ScriptedTransport::new(|req, _| {
            let body = match (req.method.as_str(), req.path.as_str()) {
                ("GET", "/users/me") => json!({
                    "id": 1,
                    "email": "ann@example.com",
                    "privacy": "private",
                    "wishes": []
                }),
                ("GET", "/users/2") => card_json(2, None),
                ("GET", "/users/") => json!([card_json(2, Some(true))]),
                ("PUT", "/profile") => {
                    assert!(matches!(&req.body, RequestBody::Multipart { fields, files }
                        if fields.len() == 1 && files.is_empty()));
                    updated_json()
                }
                ("PUT", "/profile/avatar") => {
                    let RequestBody::Multipart { files, .. } = &req.body else {
                        panic!("expected multipart body");
                    };
                    assert_eq!(files[0].field, "avatar");
                    assert_eq!(files[0].file_name, "me.png");
                    updated_json()
                }
                (m, p) => panic!("unexpected {m} {p}"),
            };
            Ok(json_response(200, body))
        }));
        let client = WishflickClient::builder()
            .transport(transport.clone())
            .storage(Arc::new(MemoryTokenStorage::with_credentials(
                CredentialPair::new("a", "r").into(),
            )))
            .build()
            .unwrap();
        let users = client.users();

        let me = users.me().await.unwrap();
        assert_eq!(me.privacy, Privacy::Private);
        assert!(me.name.is_none());

        let card = users.get(2).await.unwrap();
        assert_eq!(card.mutual_friends, 2);
        assert!(!card.is_friend);
        assert!(users.list().await.unwrap()[0].is_friend);

        let update = ProfileUpdate {
            description: Some("Cyclist".into()),
            ..ProfileUpdate::default()
        };
        let updated = users.update_profile(&update).await.unwrap();
        assert_eq!(updated.privacy, Some(Privacy::Friends));

        let avatar = FilePart::new("file", "me.png", Vec::from("png")).mime("image/png");
        users.upload_avatar(avatar).await.unwrap();
        assert_eq!(transport.calls().len(), 5);
    }
}
