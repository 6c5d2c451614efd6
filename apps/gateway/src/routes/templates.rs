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

#[derive(Debug, Default, Deserialize)]
pub struct TemplateFilter {
    pub category: Option<String>,
    pub is_premium: Option<String>,
}

/// GET /api/templates
///
/// Only filters the browser actually supplied are forwarded.
pub async fn handle_list_templates(
    State(state): State<AppState>,
    token: SessionToken,
    filter: Result<Query<TemplateFilter>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(filter) = filter?;

    let mut request = UpstreamRequest::get("/api/v1/templates").bearer(&token);
    for (key, value) in [("category", filter.category), ("is_premium", filter.is_premium)] {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            request = request.query(key, value);
        }
    }

    forward(
        state.upstream.as_ref(),
        request,
        Relay::Envelope("Templates fetched successfully"),
        "Failed to fetch templates",
    )
    .await
}

/// GET /api/templates/categories
pub async fn handle_template_categories(
    State(state): State<AppState>,
    token: SessionToken,
) -> Result<Response, AppError> {
    let request = UpstreamRequest::get("/api/v1/templates/categories/list").bearer(&token);
    forward(
        state.upstream.as_ref(),
        request,
        Relay::PassThrough,
        "Failed to fetch categories",
    )
    .await
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_only_supplied_filters_are_forwarded() {
        let upstream = MockUpstream::new();
        send(
            app(upstream.clone()),
            get("/api/templates?category=modern&is_premium=", Some(&valid_token())),
        )
        .await;

        let call = upstream.last_call();
        assert_eq!(call.path, "/api/v1/templates");
        assert_eq!(
            call.query,
            vec![("category".to_string(), "modern".to_string())]
        );
    }

    #[tokio::test]
    async fn test_no_filters_means_no_query() {
        let upstream = MockUpstream::new();
        upstream.respond_json(200, json!([{"id": "t1"}]));

        let response = send(app(upstream.clone()), get("/api/templates", Some(&valid_token()))).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.json(),
            json!({
                "status": "success",
                "message": "Templates fetched successfully",
                "data": [{"id": "t1"}]
            })
        );
        assert!(upstream.last_call().query.is_empty());
    }

    #[tokio::test]
    async fn test_categories_pass_through() {
        let upstream = MockUpstream::new();
        upstream.respond_json(200, json!(["modern", "classic"]));

        let response = send(
            app(upstream.clone()),
            get("/api/templates/categories", Some(&valid_token())),
        )
        .await;

        assert_eq!(response.json(), json!(["modern", "classic"]));
        assert_eq!(upstream.last_call().path, "/api/v1/templates/categories/list");
    }
}
