//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction to keep error shapes uniform
//! across endpoints.
//!
//! # Key invariants and assumptions
//! - Error responses carry a stable `code` and human-readable `message`.
//! - Internal errors log details server-side but return generic messages.
use crate::api::types::ErrorResponse;
use crate::service::ServiceError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Structured API error returned by handlers.
///
/// Couples an HTTP status code with a JSON error body; `status` must match
/// the semantics of `body.code`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build a 404 Not Found error.
pub fn api_not_found(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        body: ErrorResponse {
            code: "not_found".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 500 Internal Server Error, logging the underlying failure
/// server-side and returning a generic message.
pub fn api_internal<E: std::fmt::Debug>(message: &str, err: &E) -> ApiError {
    tracing::error!(error = ?err, "internal error");
    ApiError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ErrorResponse {
            code: "internal".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 401 Unauthorized error.
pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::UNAUTHORIZED,
        body: ErrorResponse {
            code: "unauthorized".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 400 Bad Request validation error.
pub fn api_validation_error(message: &str) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ErrorResponse {
            code: "validation_error".to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Translate a service failure into the boundary's HTTP mapping:
/// NotFound to 404, InvalidInput to 400, everything else to 500.
pub fn api_from_service(err: ServiceError) -> ApiError {
    match err {
        ServiceError::NotFound(what) => api_not_found(&format!("{what} not found")),
        ServiceError::InvalidInput(message) => api_validation_error(&message),
        ServiceError::Internal(err) => api_internal("internal error", &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_helpers_build_expected_codes() {
        let not_found = api_not_found("missing");
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.body.code, "not_found");

        let internal = api_internal("oops", &"boom");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.body.code, "internal");

        let unauthorized = api_unauthorized("nope");
        assert_eq!(unauthorized.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unauthorized.body.code, "unauthorized");

        let validation = api_validation_error("bad");
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.body.code, "validation_error");
    }

    #[test]
    fn service_errors_map_to_expected_statuses() {
        let not_found = api_from_service(ServiceError::NotFound("wish".to_string()));
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.body.message, "wish not found");

        let invalid = api_from_service(ServiceError::InvalidInput("title is required".into()));
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

        let internal = api_from_service(ServiceError::Internal(anyhow::anyhow!("boom")));
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.body.message, "internal error");
    }
}
