/// Upstream client: the single point of contact with the remote origin.
///
/// No other module may issue HTTP requests to the backend directly.
/// Exactly one attempt is made per call; there are no retries and no timeout.
use async_trait::async_trait;
use axum::http::Method;
use bytes::Bytes;
use reqwest::{multipart, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::SessionToken;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unsupported method: {0}")]
    Method(String),
}

/// One part of a multipart form, buffered so it can be re-sent.
#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FormPart {
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// The part's content as text, if it is valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
}

/// The outbound request envelope: everything needed to re-issue a browser call.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub payload: Payload,
}

impl UpstreamRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            payload: Payload::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn bearer(mut self, token: &SessionToken) -> Self {
        self.bearer = Some(token.as_str().to_string());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.payload = Payload::Multipart(parts);
        self
    }
}

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Seam between the gateway and the remote origin.
///
/// Carried in `AppState` as `Arc<dyn Upstream>`.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}

/// reqwest-backed upstream bound to one remote origin.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: String,
}

impl HttpUpstream {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|_| UpstreamError::Method(request.method.to_string()))?;

        let mut builder = self.client.request(method, self.url_for(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(&body),
            Payload::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let content_type = header(reqwest::header::CONTENT_TYPE);
        let content_disposition = header(reqwest::header::CONTENT_DISPOSITION);
        let body = response.bytes().await?;

        if (200..300).contains(&status) {
            debug!("{} {} -> {}", request.method, request.path, status);
        } else {
            warn!("{} {} -> {}", request.method, request.path, status);
        }

        Ok(UpstreamResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}

fn build_form(parts: Vec<FormPart>) -> Result<multipart::Form, UpstreamError> {
    let mut form = multipart::Form::new();
    for part in parts {
        let mut body = multipart::Part::bytes(part.data.to_vec());
        if let Some(filename) = part.filename {
            body = body.file_name(filename);
        }
        if let Some(content_type) = part.content_type {
            body = body.mime_str(&content_type)?;
        }
        form = form.part(part.name, body);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let upstream = HttpUpstream::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(upstream.url_for("/api/v1/jobs"), "http://127.0.0.1:8000/api/v1/jobs");
    }

    #[test]
    fn test_success_range() {
        let response = |status| UpstreamResponse {
            status,
            content_type: None,
            content_disposition: None,
            body: Bytes::new(),
        };
        assert!(response(200).is_success());
        assert!(response(204).is_success());
        assert!(!response(302).is_success());
        assert!(!response(404).is_success());
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let upstream = HttpUpstream::new("http://127.0.0.1:9").unwrap();
        let result = upstream.send(UpstreamRequest::get("/api/v1/jobs")).await;
        assert!(matches!(result, Err(UpstreamError::Http(_))));
    }
}
