use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::proxy::{forward, Relay};
use crate::session::SessionToken;
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get("/api/v1/profile/").bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::Envelope("Profile fetched successfully"),
        "Failed to fetch profile",
    )
    .await
}

/// PUT /api/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    token: SessionToken,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let request = UpstreamRequest::put("/api/v1/profile/").bearer(&token).json(body);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::Envelope("Profile updated successfully"),
        "Failed to update profile",
    )
    .await
}

/// GET /api/profile/completeness
pub async fn handle_profile_completeness(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get("/api/v1/profile/completeness").bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::Envelope("Completeness fetched successfully"),
        "Failed to fetch completeness",
    )
    .await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_profile_is_wrapped_in_envelope() {
        let upstream = MockUpstream::new();
        upstream.respond_json(200, json!({"full_name": "Ada Lovelace"}));

        let response = send(app(upstream.clone()), get("/api/profile", Some(&valid_token()))).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json(),
            json!({
                "status": "success",
                "message": "Profile fetched successfully",
                "data": {"full_name": "Ada Lovelace"}
            })
        );
        assert_eq!(upstream.last_call().path, "/api/v1/profile/");
    }

    #[tokio::test]
    async fn test_profile_update_failure_uses_detail() {
        let upstream = MockUpstream::new();
        upstream.respond_json(422, json!({"detail": "phone is invalid"}));

        let response = send(
            app(upstream),
            json_request("PUT", "/api/profile", Some(&valid_token()), json!({"phone": "x"})),
        )
        .await;

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json()["message"], "phone is invalid");
    }

    #[tokio::test]
    async fn test_completeness_is_wrapped_in_envelope() {
        let upstream = MockUpstream::new();
        upstream.respond_json(200, json!({"score": 75, "missing": ["phone"]}));

        let response = send(
            app(upstream.clone()),
            get("/api/profile/completeness", Some(&valid_token())),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json(),
            json!({
                "status": "success",
                "message": "Completeness fetched successfully",
                "data": {"score": 75, "missing": ["phone"]}
            })
        );
        assert_eq!(upstream.last_call().path, "/api/v1/profile/completeness");
    }

    #[tokio::test]
    async fn test_completeness_requires_cookie() {
        let upstream = MockUpstream::new();
        let response = send(app(upstream.clone()), get("/api/profile/completeness", None)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(upstream.call_count(), 0);
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_500() {
        let upstream = MockUpstream::new();
        upstream.respond(crate::upstream::UpstreamResponse {
            status: 200,
            content_type: Some("text/html".to_string()),
            content_disposition: None,
            body: bytes::Bytes::from_static(b"<html></html>"),
        });

        let response = send(app(upstream), get("/api/profile", Some(&valid_token()))).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.json()["status"], "error");
    }
}
