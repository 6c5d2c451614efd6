//! Resume routes: analysis uploads, AI fixes, creation, history and downloads.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    response::Response,
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::proxy::{collect_form_parts, forward, Relay};
use crate::resume::models::ResumeData;
use crate::resume::transform::to_backend_payload;
use crate::resume::validation::validate_resume;
use crate::routes::segment;
use crate::session::{AuthenticatedUser, SessionToken};
use crate::state::AppState;
use crate::upstream::{FormPart, UpstreamRequest};

const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const ALLOWED_RESUME_TYPES: [&str; 3] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const CREATE_PATH: &str = "/api/v1/resume/resume-create/";

/// POST /api/resumes/analyze
///
/// Checks the upload locally before it costs a round trip: one `file` part,
/// PDF or Word, at most 5 MiB.
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;
    let mut parts = collect_form_parts(&mut multipart).await?;

    let file = take_part(&mut parts, "file")
        .filter(FormPart::is_file)
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    check_resume_file(&file)?;

    let mut forwarded = vec![file];
    for name in ["job_title", "job_description"] {
        if let Some(part) = take_part(&mut parts, name).filter(|p| has_text(p)) {
            forwarded.push(part);
        }
    }

    info!(user_id = %user.claims.user_id, "Forwarding resume for analysis");
    let request = UpstreamRequest::post("/api/v1/resume/analyze")
        .bearer(&user.token)
        .multipart(forwarded);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Failed to analyze resume").await
}

/// POST /api/resumes/analyze-bulk
pub async fn handle_analyze_bulk(
    State(state): State<AppState>,
    token: SessionToken,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;
    let parts = collect_form_parts(&mut multipart).await?;
    let request = UpstreamRequest::post("/api/v1/resume/analyze-bulk")
        .bearer(&token)
        .multipart(parts);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to analyze resumes",
    )
    .await
}

/// POST /api/resumes/apply-fix
pub async fn handle_apply_fix(
    State(state): State<AppState>,
    token: SessionToken,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;
    let mut parts = collect_form_parts(&mut multipart).await?;

    let cv_content = take_part(&mut parts, "cv_content").filter(|p| has_text(p));
    let fix_instruction = take_part(&mut parts, "fix_instruction").filter(|p| has_text(p));
    let (Some(cv_content), Some(fix_instruction)) = (cv_content, fix_instruction) else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    let mut forwarded = vec![cv_content, fix_instruction];
    if let Some(category) = take_part(&mut parts, "category") {
        forwarded.push(category);
    }
    if let Some(original) = take_part(&mut parts, "original_filename").filter(|p| has_text(p)) {
        forwarded.push(original);
    }
    if let Some(file) = take_part(&mut parts, "file").filter(FormPart::is_file) {
        forwarded.push(file);
    }

    let request = UpstreamRequest::post("/api/v1/resume/apply-fix")
        .bearer(&token)
        .multipart(forwarded);
    forward(state.upstream.as_ref(), request, Relay::PassThrough, "Failed to apply fix").await
}

/// POST /api/resumes/create
///
/// Accepts a payload already in the backend shape; `user_id` always comes from
/// the session claims, never from the client.
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(mut body) = body?;
    let Some(fields) = body.as_object_mut() else {
        return Err(AppError::Validation(
            "Resume payload must be a JSON object".to_string(),
        ));
    };
    fields.insert("user_id".to_string(), Value::String(user.claims.user_id.clone()));

    let request = UpstreamRequest::post(CREATE_PATH).bearer(&user.token).json(body);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::Created("Resume created successfully"),
        "Failed to create resume",
    )
    .await
}

/// POST /api/resumes/build
///
/// Accepts builder-shaped data, validates it, and submits the transformed
/// payload to the same endpoint as `create`.
pub async fn handle_build(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    body: Result<Json<ResumeData>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(data) = body?;
    let today = Utc::now().date_naive();

    let errors = validate_resume(&data, today.year());
    if !errors.is_empty() {
        return Err(AppError::InvalidResume(errors));
    }

    let mut payload = to_backend_payload(&data, today);
    payload.user_id = Some(user.claims.user_id.clone());

    let request = UpstreamRequest::post(CREATE_PATH)
        .bearer(&user.token)
        .json(serde_json::to_value(payload)?);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::Created("Resume created successfully"),
        "Failed to create resume",
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub skip: Option<u32>,
}

/// GET /api/resumes/history
pub async fn handle_history(
    State(state): State<AppState>,
    token: SessionToken,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let request = UpstreamRequest::get("/api/v1/resume/history")
        .bearer(&token)
        .query("limit", query.limit.unwrap_or(10))
        .query("skip", query.skip.unwrap_or(0));
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to fetch history",
    )
    .await
}

/// GET /api/resumes/history/:id
pub async fn handle_history_detail(
    State(state): State<AppState>,
    token: SessionToken,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let request =
        UpstreamRequest::get(format!("/api/v1/resume/history/{}", segment(&id))).bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to fetch analysis",
    )
    .await
}

/// GET /api/resumes/download/:filename
pub async fn handle_download(
    State(state): State<AppState>,
    token: SessionToken,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if filename.trim().is_empty() {
        return Err(AppError::Validation("Filename is required".to_string()));
    }
    let request = UpstreamRequest::get(format!(
        "/api/v1/resume/download/{}",
        segment(&filename)
    ))
    .bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::Binary { filename },
        "Failed to download file",
    )
    .await
}

/// Removes and returns the first part named `name`.
fn take_part(parts: &mut Vec<FormPart>, name: &str) -> Option<FormPart> {
    let index = parts.iter().position(|p| p.name == name)?;
    Some(parts.remove(index))
}

fn has_text(part: &FormPart) -> bool {
    part.as_text().is_some_and(|t| !t.trim().is_empty())
}

fn check_resume_file(file: &FormPart) -> Result<(), AppError> {
    let content_type = file.content_type.as_deref().unwrap_or_default();
    if !ALLOWED_RESUME_TYPES.contains(&content_type) {
        return Err(AppError::Validation(
            "Invalid file type. Please upload PDF or Word documents only.".to_string(),
        ));
    }
    if file.data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(format!(
            "File size exceeds 5MB limit. Your file is {:.2}MB",
            file.data.len() as f64 / (1024.0 * 1024.0)
        )));
    }
    Ok(())
}
