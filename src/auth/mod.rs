//! Authentication for the end-user API.
//!
//! # Purpose
//! Validates provider-issued session JWTs and exposes the request-scoped
//! identity (`SessionClaims`) that handlers act on. Handlers call
//! [`authenticate`] at the top of each protected route rather than going
//! through middleware, keeping the 401 mapping next to the rest of the
//! handler's error handling.
mod session;

pub use session::{AuthError, SessionClaims, SessionValidator};

use crate::api::error::{api_unauthorized, ApiError};
use crate::app::AppState;
use axum::http::HeaderMap;

/// Pull the bearer token out of the Authorization header, if any.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Validate the request's bearer token and return its claims.
///
/// # Errors
/// - 401 when the header is missing or the token fails validation. The
///   response body never says which, so callers cannot probe.
pub async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<SessionClaims, ApiError> {
    let token = extract_bearer(headers).ok_or_else(|| api_unauthorized("missing bearer token"))?;
    state.session_validator.validate(token).await.map_err(|err| {
        tracing::debug!(error = ?err, "session token rejected");
        api_unauthorized("invalid token")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_requires_the_scheme_prefix() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Token abc".parse().expect("header"),
        );
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer abc.def.ghi".parse().expect("header"),
        );
        assert_eq!(extract_bearer(&headers), Some("abc.def.ghi"));
    }
}
