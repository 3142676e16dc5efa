//! Current-user API handlers.
use crate::api::current_user;
use crate::api::error::ApiError;
use crate::app::AppState;
use crate::auth::authenticate;
use crate::model::User;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/v1/me",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Missing or invalid token", body = crate::api::types::ErrorResponse)
    )
)]
/// Return the authenticated user's local record, provisioning it on first
/// contact.
pub(crate) async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>, ApiError> {
    let claims = authenticate(&state, &headers).await?;
    let user = current_user(&state, &claims).await?;
    Ok(Json(user))
}
