//! Gmail integration routes. The OAuth callback is the only unauthenticated one:
//! the browser lands there straight from Google's consent screen.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::proxy::{forward, Relay};
use crate::session::SessionToken;
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// GET /api/gmail/callback
pub async fn handle_callback(
    State(state): State<AppState>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let code = query.code.filter(|c| !c.is_empty());
    let oauth_state = query.state.filter(|s| !s.is_empty());
    let (Some(code), Some(oauth_state)) = (code, oauth_state) else {
        return Err(AppError::Validation(
            "Missing code or state parameter".to_string(),
        ));
    };

    let request = UpstreamRequest::get("/api/v1/gmail/callback")
        .query("code", code)
        .query("state", oauth_state);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to process callback",
    )
    .await
}

/// GET /api/gmail/status
pub async fn handle_status(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get("/api/v1/gmail/status").bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to fetch Gmail status",
    )
    .await
}

/// POST /api/gmail/disconnect
pub async fn handle_disconnect(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::post("/api/v1/gmail/disconnect").bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to disconnect Gmail",
    )
    .await
}

/// POST /api/gmail/scan-now
pub async fn handle_scan_now(
    State(state): State<AppState>,
    token: SessionToken,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = body?;
    let request = UpstreamRequest::post("/api/v1/gmail/scan-now")
        .bearer(&token)
        .json(body);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to start scan",
    )
    .await
}
