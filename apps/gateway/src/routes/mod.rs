pub mod auth;
pub mod dashboard;
pub mod gmail;
pub mod health;
pub mod jobs;
pub mod profile;
pub mod resumes;
pub mod templates;
pub mod trends;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// Large enough for a bulk upload of several 5 MiB resumes.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/signup", post(auth::handle_signup))
        .route("/api/auth/otp", post(auth::handle_verify_otp))
        .route("/api/auth/resend-otp", post(auth::handle_resend_otp))
        .route("/api/auth/logout", post(auth::handle_logout))
        .route("/api/auth/me", get(auth::handle_me))
        // Jobs
        .route(
            "/api/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route(
            "/api/jobs/:id",
            put(jobs::handle_update_job).delete(jobs::handle_delete_job),
        )
        // Profile
        .route(
            "/api/profile",
            get(profile::handle_get_profile).put(profile::handle_update_profile),
        )
        .route(
            "/api/profile/completeness",
            get(profile::handle_profile_completeness),
        )
        // Dashboard
        .route(
            "/api/dashboard/recruiter",
            get(dashboard::handle_recruiter_dashboard),
        )
        // Resumes
        .route("/api/resumes/analyze", post(resumes::handle_analyze))
        .route(
            "/api/resumes/analyze-bulk",
            post(resumes::handle_analyze_bulk),
        )
        .route("/api/resumes/apply-fix", post(resumes::handle_apply_fix))
        .route("/api/resumes/create", post(resumes::handle_create))
        .route("/api/resumes/build", post(resumes::handle_build))
        .route("/api/resumes/history", get(resumes::handle_history))
        .route(
            "/api/resumes/history/:id",
            get(resumes::handle_history_detail),
        )
        .route(
            "/api/resumes/download/:filename",
            get(resumes::handle_download),
        )
        // Templates & trends
        .route("/api/templates", get(templates::handle_list_templates))
        .route(
            "/api/templates/categories",
            get(templates::handle_template_categories),
        )
        .route("/api/trends", get(trends::handle_trends))
        // Gmail integration
        .route("/api/gmail/callback", get(gmail::handle_callback))
        .route("/api/gmail/status", get(gmail::handle_status))
        .route("/api/gmail/disconnect", post(gmail::handle_disconnect))
        .route("/api/gmail/scan-now", post(gmail::handle_scan_now))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Percent-encodes a value taken from the inbound path before it is placed in
/// an upstream path.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encodes_reserved_characters() {
        assert_eq!(segment("42"), "42");
        assert_eq!(segment("a b?c"), "a%20b%3Fc");
    }
}
