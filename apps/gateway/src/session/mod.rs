//! Session handling: the `__ZUME__` cookie and the token it carries.
//!
//! Handlers never touch cookies directly. They take a `SessionToken` (presence
//! only) or an `AuthenticatedUser` (presence plus verified claims) as an
//! extractor; both reject with 401 before the handler body runs, so no upstream
//! call can happen without a token.

pub mod cookie;
pub mod token;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::{headers, TypedHeader};

use crate::errors::AppError;
use crate::state::AppState;

pub use cookie::{cleared_cookie_headers, session_cookie_headers, SESSION_COOKIE_NAME};
pub use token::{Claims, TokenError, TokenVerifier};

/// The raw bearer credential read from the session cookie.
#[derive(Clone)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = TypedHeader::<headers::Cookie>::from_request_parts(parts, state)
            .await
            .ok();

        cookies
            .as_ref()
            .and_then(|TypedHeader(cookies)| cookies.get(SESSION_COOKIE_NAME))
            .filter(|value| !value.is_empty())
            .map(|value| SessionToken(value.to_string()))
            .ok_or(AppError::Unauthenticated)
    }
}

/// A session token whose claims decoded successfully.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub token: SessionToken,
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = SessionToken::from_request_parts(parts, state).await?;
        let claims = state.verifier.verify(token.as_str())?;
        Ok(AuthenticatedUser { token, claims })
    }
}
