//! Tweet API handlers.
//!
//! # Purpose
//! User-scoped tweet CRUD. Mutations resolve the caller first and pass their
//! internal ID into the owner-scoped service operations, so responses for
//! foreign tweets are indistinguishable from missing ones.
use crate::api::current_user;
use crate::api::error::{api_from_service, ApiError};
use crate::api::types::{TweetCreateRequest, TweetListResponse, TweetUpdateRequest};
use crate::app::AppState;
use crate::auth::authenticate;
use crate::model::Tweet;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/api/v1/tweets",
    tag = "tweets",
    request_body = TweetCreateRequest,
    responses(
        (status = 201, description = "Tweet created", body = Tweet),
        (status = 400, description = "Empty content", body = crate::api::types::ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TweetCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = authenticate(&state, &headers).await?;
    let user = current_user(&state, &claims).await?;
    let tweet = state
        .tweets
        .create(user.id, &body.content)
        .await
        .map_err(api_from_service)?;
    Ok((StatusCode::CREATED, Json(tweet)))
}

#[utoipa::path(
    get,
    path = "/api/v1/tweets",
    tag = "tweets",
    responses(
        (status = 200, description = "All tweets, newest first", body = TweetListResponse)
    )
)]
pub(crate) async fn list_tweets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TweetListResponse>, ApiError> {
    authenticate(&state, &headers).await?;
    let items = state.tweets.list().await.map_err(api_from_service)?;
    Ok(Json(TweetListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/api/v1/tweets/my",
    tag = "tweets",
    responses(
        (status = 200, description = "The caller's tweets, newest first", body = TweetListResponse)
    )
)]
pub(crate) async fn list_my_tweets(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TweetListResponse>, ApiError> {
    let claims = authenticate(&state, &headers).await?;
    let user = current_user(&state, &claims).await?;
    let items = state
        .tweets
        .list_by_user(user.id)
        .await
        .map_err(api_from_service)?;
    Ok(Json(TweetListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/api/v1/tweets/{tweet_id}",
    tag = "tweets",
    params(("tweet_id" = Uuid, Path, description = "Tweet ID")),
    responses(
        (status = 200, description = "The tweet", body = Tweet),
        (status = 404, description = "No such tweet", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tweet_id): Path<Uuid>,
) -> Result<Json<Tweet>, ApiError> {
    authenticate(&state, &headers).await?;
    let tweet = state.tweets.get(tweet_id).await.map_err(api_from_service)?;
    Ok(Json(tweet))
}

#[utoipa::path(
    put,
    path = "/api/v1/tweets/{tweet_id}",
    tag = "tweets",
    params(("tweet_id" = Uuid, Path, description = "Tweet ID")),
    request_body = TweetUpdateRequest,
    responses(
        (status = 200, description = "Updated tweet", body = Tweet),
        (status = 404, description = "No such tweet (or not the caller's)", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tweet_id): Path<Uuid>,
    Json(body): Json<TweetUpdateRequest>,
) -> Result<Json<Tweet>, ApiError> {
    let claims = authenticate(&state, &headers).await?;
    let user = current_user(&state, &claims).await?;
    let tweet = state
        .tweets
        .update(tweet_id, user.id, &body.content)
        .await
        .map_err(api_from_service)?;
    Ok(Json(tweet))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tweets/{tweet_id}",
    tag = "tweets",
    params(("tweet_id" = Uuid, Path, description = "Tweet ID")),
    responses(
        (status = 204, description = "Tweet deleted"),
        (status = 404, description = "No such tweet (or not the caller's)", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_tweet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(tweet_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let claims = authenticate(&state, &headers).await?;
    let user = current_user(&state, &claims).await?;
    state
        .tweets
        .delete(tweet_id, user.id)
        .await
        .map_err(api_from_service)?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/test/tweets",
    tag = "tweets",
    responses(
        (status = 200, description = "All tweets without authentication", body = TweetListResponse)
    )
)]
/// Unauthenticated listing used by smoke tests and local tooling.
pub(crate) async fn list_tweets_unauthenticated(
    State(state): State<AppState>,
) -> Result<Json<TweetListResponse>, ApiError> {
    let items = state.tweets.list().await.map_err(api_from_service)?;
    Ok(Json(TweetListResponse { items }))
}
