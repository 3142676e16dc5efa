//! Wish API handlers.
//!
//! # Purpose
//! Organization-scoped wish CRUD. Collection routes scope to the organization
//! named by the caller's session token; the by-organization listing takes an
//! internal ID for callers that already resolved one.
use crate::api::error::{api_from_service, api_validation_error, ApiError};
use crate::api::types::{
    WishCreateRequest, WishListResponse, WishOrderRequest, WishUpdateRequest,
};
use crate::app::AppState;
use crate::auth::{authenticate, SessionClaims};
use crate::model::Wish;
use crate::service::OrgSelector;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

/// The organization named by the session token, for callers acting "in" an
/// organization. Tokens without an active organization cannot use the
/// token-scoped wish routes.
fn token_org(claims: &SessionClaims) -> Result<OrgSelector, ApiError> {
    claims
        .org_external_id
        .clone()
        .map(OrgSelector::External)
        .ok_or_else(|| api_validation_error("no organization in token"))
}

#[utoipa::path(
    post,
    path = "/api/v1/wishes",
    tag = "wishes",
    request_body = WishCreateRequest,
    responses(
        (status = 201, description = "Wish created", body = Wish),
        (status = 400, description = "Missing title or no organization in token", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Organization not synced", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_wish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<WishCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = authenticate(&state, &headers).await?;
    let organization = token_org(&claims)?;
    let wish = state
        .wishes
        .create(organization, &body.title, &body.note, body.order_no)
        .await
        .map_err(api_from_service)?;
    Ok((StatusCode::CREATED, Json(wish)))
}

#[utoipa::path(
    get,
    path = "/api/v1/wishes",
    tag = "wishes",
    responses(
        (status = 200, description = "Active wishes for the token's organization", body = WishListResponse)
    )
)]
pub(crate) async fn list_wishes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<WishListResponse>, ApiError> {
    let claims = authenticate(&state, &headers).await?;
    let organization = token_org(&claims)?;
    let items = state
        .wishes
        .list(organization)
        .await
        .map_err(api_from_service)?;
    Ok(Json(WishListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/api/v1/organizations/{organization_id}/wishes",
    tag = "wishes",
    params(("organization_id" = Uuid, Path, description = "Internal organization ID")),
    responses(
        (status = 200, description = "Active wishes for the organization", body = WishListResponse),
        (status = 404, description = "No such organization", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_wishes_by_organization(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(organization_id): Path<Uuid>,
) -> Result<Json<WishListResponse>, ApiError> {
    authenticate(&state, &headers).await?;
    let items = state
        .wishes
        .list(OrgSelector::Internal(organization_id))
        .await
        .map_err(api_from_service)?;
    Ok(Json(WishListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/api/v1/wishes/{wish_id}",
    tag = "wishes",
    params(("wish_id" = Uuid, Path, description = "Wish ID")),
    responses(
        (status = 200, description = "The wish, soft-deleted or not", body = Wish),
        (status = 404, description = "No such wish", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_wish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
) -> Result<Json<Wish>, ApiError> {
    authenticate(&state, &headers).await?;
    let wish = state.wishes.get(wish_id).await.map_err(api_from_service)?;
    Ok(Json(wish))
}

#[utoipa::path(
    put,
    path = "/api/v1/wishes/{wish_id}",
    tag = "wishes",
    params(("wish_id" = Uuid, Path, description = "Wish ID")),
    request_body = WishUpdateRequest,
    responses(
        (status = 200, description = "Updated wish", body = Wish),
        (status = 400, description = "Missing title", body = crate::api::types::ErrorResponse),
        (status = 404, description = "No such wish", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_wish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
    Json(body): Json<WishUpdateRequest>,
) -> Result<Json<Wish>, ApiError> {
    authenticate(&state, &headers).await?;
    let wish = state
        .wishes
        .update(wish_id, &body.title, &body.note, body.order_no)
        .await
        .map_err(api_from_service)?;
    Ok(Json(wish))
}

#[utoipa::path(
    patch,
    path = "/api/v1/wishes/{wish_id}/order",
    tag = "wishes",
    params(("wish_id" = Uuid, Path, description = "Wish ID")),
    request_body = WishOrderRequest,
    responses(
        (status = 200, description = "Wish with new ordering key", body = Wish),
        (status = 404, description = "No such wish", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_wish_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
    Json(body): Json<WishOrderRequest>,
) -> Result<Json<Wish>, ApiError> {
    authenticate(&state, &headers).await?;
    let wish = state
        .wishes
        .update_order(wish_id, body.order_no)
        .await
        .map_err(api_from_service)?;
    Ok(Json(wish))
}

#[utoipa::path(
    post,
    path = "/api/v1/wishes/{wish_id}/soft-delete",
    tag = "wishes",
    params(("wish_id" = Uuid, Path, description = "Wish ID")),
    responses(
        (status = 204, description = "Wish soft-deleted"),
        (status = 400, description = "Wish already deleted", body = crate::api::types::ErrorResponse),
        (status = 404, description = "No such wish", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn soft_delete_wish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authenticate(&state, &headers).await?;
    state
        .wishes
        .soft_delete(wish_id)
        .await
        .map_err(api_from_service)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/wishes/{wish_id}/restore",
    tag = "wishes",
    params(("wish_id" = Uuid, Path, description = "Wish ID")),
    responses(
        (status = 204, description = "Wish restored"),
        (status = 400, description = "Wish is not deleted", body = crate::api::types::ErrorResponse),
        (status = 404, description = "No such wish", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn restore_wish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authenticate(&state, &headers).await?;
    state
        .wishes
        .restore(wish_id)
        .await
        .map_err(api_from_service)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/v1/wishes/{wish_id}",
    tag = "wishes",
    params(("wish_id" = Uuid, Path, description = "Wish ID")),
    responses(
        (status = 204, description = "Wish removed permanently"),
        (status = 404, description = "No such wish", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_wish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(wish_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authenticate(&state, &headers).await?;
    state
        .wishes
        .delete(wish_id)
        .await
        .map_err(api_from_service)?;
    Ok(StatusCode::NO_CONTENT)
}
