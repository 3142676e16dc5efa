//! HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and
//! testable. The session validator and webhook verifier are plain state
//! fields, never process globals, so tests swap in fixed key material.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth::SessionValidator;
use crate::observability;
use crate::service::{TweetService, WishService};
use crate::store::AppStore;
use crate::sync::Reconciler;
use crate::webhook::WebhookVerifier;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

/// Provider deliveries are small; anything above this is either a mistake or
/// an attempt at resource exhaustion.
const WEBHOOK_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub api_version: String,
    pub store: Arc<dyn AppStore + Send + Sync>,
    pub session_validator: SessionValidator,
    pub webhook_verifier: WebhookVerifier,
    pub wishes: WishService,
    pub tweets: TweetService,
    pub reconciler: Arc<Reconciler>,
    pub cors_origin: Option<HeaderValue>,
}

impl AppState {
    /// Wire services and the reconciler over one shared store.
    pub fn new(
        store: Arc<dyn AppStore + Send + Sync>,
        session_validator: SessionValidator,
        webhook_verifier: WebhookVerifier,
    ) -> Self {
        Self {
            api_version: "v1".to_string(),
            session_validator,
            webhook_verifier,
            wishes: WishService::new(store.clone()),
            tweets: TweetService::new(store.clone()),
            reconciler: Arc::new(Reconciler::new(store.clone())),
            store,
            cors_origin: None,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    let cors = match &state.cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.clone())
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
        None => CorsLayer::permissive(),
    };

    Router::new()
        .route("/api/health", axum::routing::get(api::system::health))
        .route(
            "/api/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/api/test/tweets",
            axum::routing::get(api::tweets::list_tweets_unauthenticated),
        )
        .route(
            "/webhooks/clerk",
            axum::routing::post(api::webhooks::receive)
                .layer(DefaultBodyLimit::max(WEBHOOK_BODY_LIMIT)),
        )
        .route("/api/v1/me", axum::routing::get(api::users::me))
        .route(
            "/api/v1/tweets",
            axum::routing::get(api::tweets::list_tweets).post(api::tweets::create_tweet),
        )
        .route(
            "/api/v1/tweets/my",
            axum::routing::get(api::tweets::list_my_tweets),
        )
        .route(
            "/api/v1/tweets/:tweet_id",
            axum::routing::get(api::tweets::get_tweet)
                .put(api::tweets::update_tweet)
                .delete(api::tweets::delete_tweet),
        )
        .route(
            "/api/v1/wishes",
            axum::routing::get(api::wishes::list_wishes).post(api::wishes::create_wish),
        )
        .route(
            "/api/v1/wishes/:wish_id",
            axum::routing::get(api::wishes::get_wish)
                .put(api::wishes::update_wish)
                .delete(api::wishes::delete_wish),
        )
        .route(
            "/api/v1/wishes/:wish_id/order",
            axum::routing::patch(api::wishes::update_wish_order),
        )
        .route(
            "/api/v1/wishes/:wish_id/soft-delete",
            axum::routing::post(api::wishes::soft_delete_wish),
        )
        .route(
            "/api/v1/wishes/:wish_id/restore",
            axum::routing::post(api::wishes::restore_wish),
        )
        .route(
            "/api/v1/organizations/:organization_id/wishes",
            axum::routing::get(api::wishes::list_wishes_by_organization),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs")
                .url("/api/openapi.json", ApiDoc::openapi()),
        )
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}
