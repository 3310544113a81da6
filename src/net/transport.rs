//! Transport seam between the gateway and the wire.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use reqwest::multipart;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, Error, Result};
use crate::net::client::HttpClient;
use crate::net::request::{ApiResponse, RequestBody, RequestDescriptor};

/// Sends one request and buffers the response.
///
/// Implementations never interpret status codes: every response the
/// backend produces comes back as `Ok`. Only connection-level failures are
/// errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, attaching `Authorization: Bearer <bearer>` when given.
    async fn send(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> std::result::Result<ApiResponse, ApiError>;

    /// Name of this transport, for logs.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// Per-send id for correlating client and server logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// [`Transport`] over a configured reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: HttpClient,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport rooted at `base_url`.
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL '{base_url}': {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Config(format!("'{base_url}' cannot be used as a base URL")));
        }
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path. Trailing slashes on the path are kept,
    /// the backend distinguishes `/wishes/` from `/wishes`.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        bearer: Option<&str>,
    ) -> std::result::Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        let request_id = Uuid::new_v4().to_string();

        let mut headers = request.headers.clone();
        if !headers.contains_key(REQUEST_ID_HEADER) {
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
        }
        // The session's token replaces whatever the caller set.
        if let Some(token) = bearer {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Network(format!("unusable access token: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .client
            .inner()
            .request(request.method.clone(), &url)
            .headers(headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Multipart { fields, files } => {
                let mut form = fields.iter().fold(multipart::Form::new(), |form, (k, v)| {
                    form.text(k.clone(), v.clone())
                });
                for file in files {
                    let mut part =
                        multipart::Part::bytes(file.data.to_vec()).file_name(file.file_name.clone());
                    if let Some(mime) = &file.mime {
                        part = part.mime_str(mime).map_err(|e| {
                            ApiError::Network(format!("invalid content type '{mime}': {e}"))
                        })?;
                    }
                    form = form.part(file.field.clone(), part);
                }
                builder.multipart(form)
            }
        };

        debug!(
            method = %request.method,
            url = url.as_str(),
            request_id = request_id.as_str(),
            authenticated = bearer.is_some(),
            retried = request.is_retried(),
            "Dispatching request"
        );

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        debug!(status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(ApiResponse::new(status, headers, body))
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_cleanly() {
        let http = HttpClient::new().unwrap();
        let t = ReqwestTransport::new(http, "https://api.example/v1/").unwrap();
        assert_eq!(t.base_url(), "https://api.example/v1");
        assert_eq!(t.url_for("/wishes/"), "https://api.example/v1/wishes/");
        assert_eq!(t.url_for("friends"), "https://api.example/v1/friends");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let http = HttpClient::new().unwrap();
        assert!(ReqwestTransport::new(http.clone(), "not a url").is_err());
        assert!(ReqwestTransport::new(http, "mailto:me@example.com").is_err());
    }
}
