use axum::{extract::State, response::Response};

use crate::errors::AppError;
use crate::proxy::{forward, Relay};
use crate::session::SessionToken;
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// GET /api/trends
pub async fn handle_trends(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get("/api/v1/trends").bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::Envelope("Trends fetched successfully"),
        "Failed to fetch trends",
    )
    .await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_trends_are_enveloped() {
        let upstream = MockUpstream::new();
        upstream.respond_json(200, json!({"top_skills": ["Rust", "Go"]}));

        let response = send(app(upstream.clone()), get("/api/trends", Some(&valid_token()))).await;

        assert_eq!(response.status, StatusCode::OK);
        let body = response.json();
        assert_eq!(body["message"], "Trends fetched successfully");
        assert_eq!(body["data"]["top_skills"], json!(["Rust", "Go"]));
        assert_eq!(upstream.last_call().path, "/api/v1/trends");
    }

    #[tokio::test]
    async fn test_trends_upstream_failure_without_detail_uses_fallback() {
        let upstream = MockUpstream::new();
        upstream.respond_json(503, json!({}));

        let response = send(app(upstream), get("/api/trends", Some(&valid_token()))).await;

        assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json()["message"], "Failed to fetch trends");
    }
}
