use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Response,
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::proxy::{forward, Relay};
use crate::routes::segment;
use crate::session::SessionToken;
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get("/api/v1/jobs").bearer(&token);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Failed to fetch jobs").await
}

/// POST /api/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    token: SessionToken,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let request = UpstreamRequest::post("/api/v1/jobs").bearer(&token).json(body);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Failed to create job").await
}

/// PUT /api/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let request = UpstreamRequest::put(format!("/api/v1/jobs/{}", segment(&id)))
        .bearer(&token)
        .json(body);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Failed to update job").await
}

/// DELETE /api/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::delete(format!("/api/v1/jobs/{}", segment(&id))).bearer(&token);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Failed to delete job").await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use crate::upstream::{HttpUpstream, Payload};
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_update_without_cookie_is_401_and_never_forwarded() {
        let upstream = MockUpstream::new();
        let response = send(
            app(upstream.clone()),
            json_request("PUT", "/api/jobs/42", None, json!({"title": "Rust Engineer"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json(),
            json!({"status": "error", "message": "Not authenticated"})
        );
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn test_every_job_operation_requires_cookie() {
        let upstream = MockUpstream::new();
        let requests = vec![
            get("/api/jobs", None),
            json_request("POST", "/api/jobs", None, json!({})),
            json_request("DELETE", "/api/jobs/7", None, json!({})),
        ];
        for request in requests {
            let response = send(app(upstream.clone()), request).await;
            assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        }
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_forwards_body_and_bearer() {
        let upstream = MockUpstream::new();
        upstream.respond_json(200, json!({"id": "42", "title": "Rust Engineer"}));
        let token = valid_token();

        let response = send(
            app(upstream.clone()),
            json_request("PUT", "/api/jobs/42", Some(&token), json!({"title": "Rust Engineer"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), json!({"id": "42", "title": "Rust Engineer"}));

        let call = upstream.last_call();
        assert_eq!(call.method, Method::PUT);
        assert_eq!(call.path, "/api/v1/jobs/42");
        assert_eq!(call.bearer.as_deref(), Some(token.as_str()));
        match call.payload {
            Payload::Json(body) => assert_eq!(body, json!({"title": "Rust Engineer"})),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upstream_error_status_and_payload_surface() {
        let upstream = MockUpstream::new();
        upstream.respond_json(404, json!({"detail": "Job not found"}));

        let response = send(
            app(upstream),
            json_request("DELETE", "/api/jobs/99", Some(&valid_token()), json!({})),
        )
        .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        let body = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Job not found");
        assert_eq!(body["data"], json!({"detail": "Job not found"}));
    }

    #[tokio::test]
    async fn test_transport_failure_is_500_envelope() {
        let upstream = Arc::new(HttpUpstream::new("http://127.0.0.1:9").unwrap());
        let response = send(
            app_with(upstream, crate::config::Environment::Development),
            get("/api/jobs", Some(&valid_token())),
        )
        .await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json();
        assert_eq!(body["status"], "error");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Upstream request failed"));
    }

    #[tokio::test]
    async fn test_path_id_is_encoded() {
        let upstream = MockUpstream::new();
        send(
            app(upstream.clone()),
            json_request("DELETE", "/api/jobs/a%3Fb", Some(&valid_token()), json!({})),
        )
        .await;
        assert_eq!(upstream.last_call().path, "/api/v1/jobs/a%3Fb");
    }
}
