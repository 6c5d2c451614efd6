//! Proxy core: forward one request upstream and shape the answer for the browser.
//!
//! Every route is a thin configuration of `forward`: it builds an
//! `UpstreamRequest`, picks a `Relay`, and names the message used when the
//! remote fails without saying why.

use axum::{
    extract::Multipart,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::envelope::ApiResponse;
use crate::errors::AppError;
use crate::upstream::{FormPart, Upstream, UpstreamRequest, UpstreamResponse};

/// How a successful upstream response is handed back to the browser.
#[derive(Debug, Clone)]
pub enum Relay {
    /// Remote JSON payload and status relayed unchanged.
    PassThrough,
    /// Remote payload wrapped in a success envelope, status 200.
    Envelope(&'static str),
    /// Remote payload wrapped in a success envelope, status 201.
    Created(&'static str),
    /// Raw bytes relayed with content headers; `filename` backs a missing disposition.
    Binary { filename: String },
}

/// Sends `request` upstream and relays the response.
///
/// Non-2xx answers become `AppError::Upstream` carrying the remote status;
/// transport and parse failures surface as 500s through `AppError`.
pub async fn forward(
    upstream: &dyn Upstream,
    request: UpstreamRequest,
    relay: Relay,
    failure_message: &str,
) -> Result<Response, AppError> {
    let response = upstream.send(request).await?;

    if !response.is_success() {
        return Err(upstream_failure(&response, failure_message));
    }

    relay_success(response, relay)
}

fn relay_success(response: UpstreamResponse, relay: Relay) -> Result<Response, AppError> {
    match relay {
        Relay::PassThrough => {
            let status = status_code(response.status);
            if response.body.is_empty() {
                return Ok(status.into_response());
            }
            Ok((status, Json(response.json()?)).into_response())
        }
        Relay::Envelope(message) => {
            let data = response.json()?;
            Ok((StatusCode::OK, Json(ApiResponse::success(message, Some(data)))).into_response())
        }
        Relay::Created(message) => {
            let data = response.json()?;
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::success(message, Some(data))),
            )
                .into_response())
        }
        Relay::Binary { filename } => binary_response(response, &filename),
    }
}

fn binary_response(response: UpstreamResponse, filename: &str) -> Result<Response, AppError> {
    let content_type = response
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let disposition = response
        .content_disposition
        .unwrap_or_else(|| attachment_disposition(filename));

    let content_type = HeaderValue::from_str(&content_type)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid upstream content type: {e}")))?;
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid content disposition: {e}")))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        response.body,
    )
        .into_response())
}

/// `attachment; filename="..."` with `"` and `\` escaped so the name cannot
/// add parameters of its own.
fn attachment_disposition(filename: &str) -> String {
    let mut escaped = String::with_capacity(filename.len());
    for c in filename.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("attachment; filename=\"{escaped}\"")
}

/// Converts a non-2xx upstream response into an error that keeps the remote
/// status and surfaces the remote payload.
pub fn upstream_failure(response: &UpstreamResponse, fallback: &str) -> AppError {
    let payload = response.json().ok();
    let message = payload
        .as_ref()
        .and_then(extract_error_message)
        .unwrap_or_else(|| fallback.to_string());

    AppError::Upstream {
        status: response.status,
        message,
        payload,
    }
}

/// Pulls a human-readable message out of a backend error body.
///
/// Understands `detail` as a string or as a list of `{loc, msg}` validation
/// issues, then falls back to `message` and `error`.
pub fn extract_error_message(payload: &Value) -> Option<String> {
    match payload.get("detail") {
        Some(Value::String(detail)) => return Some(detail.clone()),
        Some(Value::Array(issues)) => {
            if let Some(issue) = issues.first() {
                let field = issue
                    .get("loc")
                    .and_then(|loc| loc.as_array())
                    .and_then(|loc| loc.last())
                    .map(|field| match field {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                let msg = issue.get("msg").and_then(|m| m.as_str());
                return match (field, msg) {
                    (Some(field), Some(msg)) => Some(format!("Validation Error: {field} - {msg}")),
                    _ => Some("Validation Error: Check your inputs.".to_string()),
                };
            }
        }
        _ => {}
    }

    ["message", "error"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(|v| v.as_str()))
        .map(String::from)
}

/// Buffers every named part of an inbound multipart body.
pub async fn collect_form_parts(multipart: &mut Multipart) -> Result<Vec<FormPart>, AppError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(String::from) else {
            continue;
        };
        let filename = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let data = field.bytes().await?;
        parts.push(FormPart {
            name,
            filename,
            content_type,
            data,
        });
    }
    Ok(parts)
}

/// Upstream statuses are relayed verbatim when axum can represent them.
fn status_code(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}
