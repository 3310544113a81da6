//! Typed endpoint groups.
//!
//! Each group borrows the [`WishflickClient`](crate::WishflickClient) and
//! goes through its gateway, so every call shares the session's token
//! renewal. `/auth/*` calls are the exception: they are sent without
//! credentials.

mod auth;
mod communities;
mod community_chat;
mod friends;
mod likes;
mod notifications;
mod users;
mod wishes;

pub use auth::{AuthApi, Privacy, RegisterData};
pub use communities::{CommunitiesApi, Community, CommunityForm, Member};
pub use community_chat::{ChatMessage, CommunityChatApi};
pub use friends::{FriendsApi, UserOut};
pub use likes::LikesApi;
pub use notifications::{
    NewNotification, Notification, NotificationQuery, NotificationsApi, sort_newest_first,
    unread_count,
};
pub use users::{Profile, ProfileUpdate, UpdatedProfile, UserCard, UsersApi};
pub use wishes::{NewWish, Wish, WishesApi};

// The backend emits naive ISO timestamps; those are taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
