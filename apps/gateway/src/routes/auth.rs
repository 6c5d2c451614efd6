//! Session lifecycle routes: login, signup, OTP, logout, and token introspection.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::envelope::ApiResponse;
use crate::errors::AppError;
use crate::proxy::{forward, upstream_failure, Relay};
use crate::session::{cleared_cookie_headers, session_cookie_headers, AuthenticatedUser};
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: Option<String>,
    #[serde(default)]
    user_name: Value,
    #[serde(default)]
    role: Value,
}

/// POST /api/auth/login
///
/// The only route that writes the session cookie.
pub async fn handle_login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;

    let response = state
        .upstream
        .send(UpstreamRequest::post("/api/v1/auth/login").json(body))
        .await?;

    if !response.is_success() {
        return Err(upstream_failure(&response, "Login failed"));
    }

    let login: LoginResponse = serde_json::from_slice(&response.body)?;
    let token = login
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingAccessToken)?;

    let headers = session_cookie_headers(&token, state.secure_cookies())?;
    info!("Login succeeded; session cookie issued");

    Ok((
        StatusCode::OK,
        headers,
        Json(ApiResponse::success(
            "Login successful",
            Some(json!({ "user_name": login.user_name, "role": login.role })),
        )),
    )
        .into_response())
}

/// POST /api/auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let request = UpstreamRequest::post("/api/v1/auth/register").json(body);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Registration failed").await
}

/// POST /api/auth/otp
pub async fn handle_verify_otp(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    if !has_text(&body, "email") || !has_text(&body, "otp") {
        return Err(AppError::Validation("Missing email or otp".to_string()));
    }
    let request = UpstreamRequest::post("/api/v1/auth/verify-otp").json(body);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Verification failed").await
}

/// POST /api/auth/resend-otp
pub async fn handle_resend_otp(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    if !has_text(&body, "email") {
        return Err(AppError::Validation("Missing email".to_string()));
    }
    let request = UpstreamRequest::post("/api/v1/auth/resend-otp").json(body);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Failed to resend").await
}

/// POST /api/auth/logout
///
/// Always expires the cookie; there is nothing upstream to fail.
pub async fn handle_logout(State(state): State<AppState>) -> Result<Response, AppError> {
    let headers = cleared_cookie_headers(state.secure_cookies())?;
    Ok((
        StatusCode::OK,
        headers,
        Json(ApiResponse::success("Logged out successfully", None)),
    )
        .into_response())
}

/// GET /api/auth/me
pub async fn handle_me(user: AuthenticatedUser) -> Json<ApiResponse> {
    Json(ApiResponse::success(
        "Authenticated",
        Some(json!({
            "email": user.claims.sub,
            "user_id": user.claims.user_id,
            "role": user.claims.role,
        })),
    ))
}

fn has_text(body: &Value, key: &str) -> bool {
    body.get(key)
        .and_then(|v| v.as_str())
        .is_some_and(|v| !v.trim().is_empty())
}
