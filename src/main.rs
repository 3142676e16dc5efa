//! Identity-sync API service entry point.
//!
//! # Purpose
//! Wires configuration, storage, session validation, and the webhook verifier,
//! then starts the HTTP server and the metrics endpoint.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
mod api;
mod app;
mod auth;
mod config;
mod model;
mod observability;
mod service;
mod store;
mod sync;
mod webhook;

use anyhow::Context;
use app::{build_router, AppState};
use auth::SessionValidator;
use std::future::Future;
use std::sync::Arc;
use store::{memory::InMemoryStore, postgres::PostgresStore, AppStore};
use webhook::WebhookVerifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::ApiConfig::from_env_or_yaml().expect("api config");
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: config::ApiConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("taine-api");
    let state = build_state(config.clone()).await?;
    let backend_name = state.store.backend_name();
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state);

    let addr = config.bind_addr;
    tracing::info!(%addr, backend = backend_name, "api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

async fn build_state(config: config::ApiConfig) -> anyhow::Result<AppState> {
    let store: Arc<dyn AppStore + Send + Sync> = match config.storage {
        config::StorageBackend::Memory => Arc::new(InMemoryStore::new()),
        config::StorageBackend::Postgres => {
            let pg = config
                .postgres
                .as_ref()
                .context("postgres configuration missing")?;
            Arc::new(PostgresStore::connect(pg).await?)
        }
    };

    let session_validator = SessionValidator::new(&config.jwt_issuer, &config.jwks_url);
    let webhook_verifier =
        WebhookVerifier::new(&config.webhook_secret).context("webhook secret invalid")?;

    let mut state = AppState::new(store, session_validator, webhook_verifier);
    state.cors_origin = match &config.cors_origin {
        Some(origin) => Some(
            origin
                .parse()
                .with_context(|| "parse cors origin header value")?,
        ),
        None => None,
    };
    Ok(state)
}
