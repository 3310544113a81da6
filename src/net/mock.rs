//! Scripted transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::error::ApiError;
use crate::net::request::{ApiResponse, RequestDescriptor};
use crate::net::transport::Transport;

type Handler =
    dyn Fn(&RequestDescriptor, Option<&str>) -> Result<ApiResponse, ApiError> + Send + Sync;

/// Answers every request with a closure and records `(path, bearer)`.
pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&RequestDescriptor, Option<&str>) -> Result<ApiResponse, ApiError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|(p, _)| p == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((request.path.clone(), bearer.map(str::to_string)));
        tokio::task::yield_now().await;
        (self.handler)(request, bearer)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Buffered JSON response with the given status.
pub(crate) fn json_response(status: u16, body: serde_json::Value) -> ApiResponse {
    ApiResponse::new(
        StatusCode::from_u16(status).unwrap(),
        HeaderMap::new(),
        Bytes::from(body.to_string()),
    )
}
