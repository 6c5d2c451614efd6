//! Router-level test helpers: a recording upstream double and request builders.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use jsonwebtoken::Algorithm;
use serde_json::Value;
use tower::ServiceExt;

use crate::config::{Config, Environment};
use crate::routes::build_router;
use crate::session::token::tests::{mint_token, TEST_SECRET};
use crate::session::{TokenVerifier, SESSION_COOKIE_NAME};
use crate::state::AppState;
use crate::upstream::{Upstream, UpstreamError, UpstreamRequest, UpstreamResponse};

/// Records every outbound request and answers from a queue of canned responses.
/// An empty queue answers `200 {}`.
#[derive(Default)]
pub(crate) struct MockUpstream {
    responses: Mutex<VecDeque<UpstreamResponse>>,
    calls: Mutex<Vec<UpstreamRequest>>,
}

impl MockUpstream {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, response: UpstreamResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub(crate) fn respond_json(&self, status: u16, body: Value) {
        self.respond(UpstreamResponse {
            status,
            content_type: Some("application/json".to_string()),
            content_disposition: None,
            body: Bytes::from(body.to_string()),
        });
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn last_call(&self) -> UpstreamRequest {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no upstream call was made")
    }
}

#[async_trait]
impl Upstream for MockUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        self.calls.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or(UpstreamResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            content_disposition: None,
            body: Bytes::from_static(b"{}"),
        }))
    }
}

pub(crate) fn test_config(environment: Environment) -> Config {
    Config {
        environment,
        upstream_url: "http://backend.test".to_string(),
        jwt_secret: Some(TEST_SECRET.to_string()),
        jwt_algorithm: Algorithm::HS256,
        port: 0,
        rust_log: "debug".to_string(),
    }
}

pub(crate) fn app_with(upstream: Arc<dyn Upstream>, environment: Environment) -> Router {
    let config = test_config(environment);
    let verifier = TokenVerifier::new(config.jwt_secret.as_deref(), config.jwt_algorithm);
    build_router(AppState {
        config,
        upstream,
        verifier: Arc::new(verifier),
    })
}

pub(crate) fn app(upstream: Arc<MockUpstream>) -> Router {
    app_with(upstream, Environment::Development)
}

pub(crate) fn valid_token() -> String {
    mint_token(TEST_SECRET, 3600)
}

pub(crate) fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE_NAME}={token}")
}

pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub(crate) fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

pub(crate) async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub(crate) fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, session_cookie(token));
    }
    builder.body(Body::empty()).unwrap()
}

pub(crate) fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, session_cookie(token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A part for `multipart_request`: (name, filename, content type, data).
pub(crate) type TestPart<'a> = (&'a str, Option<&'a str>, Option<&'a str>, &'a str);

const BOUNDARY: &str = "zume-test-boundary";

pub(crate) fn multipart_request(uri: &str, token: Option<&str>, parts: &[TestPart<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
            ),
        }
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, session_cookie(token));
    }
    builder.body(Body::from(body)).unwrap()
}
