use axum::http::header::{HeaderMap, SET_COOKIE};

use crate::errors::AppError;

pub const SESSION_COOKIE_NAME: &str = "__ZUME__";
/// Seven days, in seconds.
pub const SESSION_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 7;

/// Builds the `Set-Cookie` headers that store a freshly issued session token.
pub fn session_cookie_headers(token: &str, secure: bool) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(&mut headers, token, SESSION_COOKIE_MAX_AGE, secure)?;
    Ok(headers)
}

/// Builds the `Set-Cookie` headers that expire the session cookie.
pub fn cleared_cookie_headers(secure: bool) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    header_set_cookie(&mut headers, "", 0, secure)?;
    Ok(headers)
}

fn header_set_cookie(
    headers: &mut HeaderMap,
    value: &str,
    max_age: i64,
    secure: bool,
) -> Result<(), AppError> {
    let secure_attr = if secure { " Secure;" } else { "" };
    let cookie = format!(
        "{SESSION_COOKIE_NAME}={value}; HttpOnly;{secure_attr} Path=/; SameSite=Lax; Max-Age={max_age}"
    );
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Session token is not a valid cookie value")))?,
    );
    Ok(())
}
