use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::proxy::{forward, Relay};
use crate::session::SessionToken;
use crate::state::AppState;
use crate::upstream::UpstreamRequest;

const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub days: Option<u32>,
}

/// GET /api/dashboard/recruiter
pub async fn handle_recruiter_dashboard(
    State(state): State<AppState>,
    token: SessionToken,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let request = UpstreamRequest::get("/api/v1/dashboard/recruiter")
        .bearer(&token)
        .query("days", query.days.unwrap_or(DEFAULT_WINDOW_DAYS));
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to fetch dashboard data",
    )
    .await
}
