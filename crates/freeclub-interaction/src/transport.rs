//! HTTP transport seam.
//!
//! The gateway builds [`ApiRequest`]s and interprets [`ApiResponse`]s; the
//! transport only moves bytes. Tests substitute a scripted transport.

use async_trait::async_trait;
use freeclub_core::resource::Fields;
use freeclub_core::{ClubError, Result};
use reqwest::Client;
use reqwest::multipart::Form;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload, in the encoding the endpoint expects.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// `multipart/form-data` text fields.
    Multipart(Fields),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    pub query: Fields,
    pub body: RequestBody,
    pub bearer: Option<String>,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Fields::new(),
            body: RequestBody::Empty,
            bearer: None,
            timeout: None,
        }
    }

    pub fn with_query(mut self, query: Fields) -> Self {
        self.query = query;
        self
    }

    pub fn with_multipart(mut self, fields: Fields) -> Self {
        self.body = RequestBody::Multipart(fields);
        self
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves one request to the backend and returns the raw response.
///
/// Implementations report connection failures as [`ClubError::Transport`] and
/// expired waits as [`ClubError::Timeout`]; status codes are not interpreted.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// [`HttpTransport`] over `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Multipart(fields) => {
                let form = fields
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value));
                builder.multipart(form)
            }
            RequestBody::Json(value) => builder.json(&value),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClubError::timeout(
                    format!("{} {}", request.method, request.path),
                    request.timeout.unwrap_or_default(),
                )
            } else {
                ClubError::transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ClubError::transport(format!("failed to read response body: {e}")))?;

        Ok(ApiResponse { status, body })
    }
}
