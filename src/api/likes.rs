//! Likes on wishes.

use serde::{Deserialize, Serialize};

use crate::client::WishflickClient;
use crate::error::Result;
use crate::net::request::RequestDescriptor;

#[derive(Serialize)]
struct LikeBody {
    wish_id: i64,
}

#[derive(Deserialize)]
struct LikeCount {
    count: u64,
}

pub struct LikesApi<'a> {
    client: &'a WishflickClient,
}

impl<'a> LikesApi<'a> {
    pub(crate) fn new(client: &'a WishflickClient) -> Self {
        Self { client }
    }

    /// Like a wish. Liking twice answers 400, guests get 403.
    pub async fn like(&self, wish_id: i64) -> Result<()> {
        self.client
            .call_empty(RequestDescriptor::post("/likes").json(&LikeBody { wish_id })?)
            .await
    }

    pub async fn unlike(&self, wish_id: i64) -> Result<()> {
        self.client
            .call_empty(RequestDescriptor::delete(format!("/likes/{wish_id}")))
            .await
    }

    /// Ids of the users who liked `wish_id`.
    pub async fn of_wish(&self, wish_id: i64) -> Result<Vec<i64>> {
        self.client
            .call(RequestDescriptor::get(format!("/likes/wish/{wish_id}")))
            .await
    }

    /// Ids of the wishes `user_id` liked.
    pub async fn of_user(&self, user_id: i64) -> Result<Vec<i64>> {
        self.client
            .call(RequestDescriptor::get(format!("/likes/user/{user_id}")))
            .await
    }

    pub async fn count(&self, wish_id: i64) -> Result<u64> {
        let body: LikeCount = self
            .client
            .call(RequestDescriptor::get(format!("/likes/wish/{wish_id}/count")))
            .await?;
        Ok(body.count)
    }
}
