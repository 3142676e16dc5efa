//! Provider webhook receiver.
//!
//! # Purpose
//! Accepts signed identity lifecycle deliveries, verifies them, and hands the
//! parsed event to the reconciler.
//!
//! # Status mapping
//! - Bad signature, missing headers, malformed payloads: 400. Redelivery of
//!   an unverifiable or unparseable body will never succeed, so the provider
//!   should stop.
//! - Unknown event kinds: 204. Acknowledged no-ops prevent redelivery storms
//!   for kinds we do not handle.
//! - Reconciler failures: 500. The provider's redelivery is the retry
//!   mechanism, on purpose; a membership event whose entities have not synced
//!   yet converges on a later attempt.
use crate::api::error::{api_internal, api_validation_error, ApiError};
use crate::app::AppState;
use crate::sync::IdentityEvent;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;

pub(crate) const HEADER_MESSAGE_ID: &str = "svix-id";
pub(crate) const HEADER_TIMESTAMP: &str = "svix-timestamp";
pub(crate) const HEADER_SIGNATURE: &str = "svix-signature";

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    kind: String,
    data: serde_json::Value,
}

fn required_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| api_validation_error(&format!("missing header: {name}")))
}

#[utoipa::path(
    post,
    path = "/webhooks/clerk",
    tag = "webhooks",
    responses(
        (status = 204, description = "Event applied or acknowledged"),
        (status = 400, description = "Unverifiable or malformed delivery", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Processing failed; provider should redeliver", body = crate::api::types::ErrorResponse)
    )
)]
/// Receive one signed delivery from the identity provider.
pub(crate) async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let message_id = required_header(&headers, HEADER_MESSAGE_ID)?;
    let timestamp = required_header(&headers, HEADER_TIMESTAMP)?;
    let signature = required_header(&headers, HEADER_SIGNATURE)?;

    state
        .webhook_verifier
        .verify(message_id, timestamp, signature, &body)
        .map_err(|err| {
            tracing::warn!(error = %err, message_id, "webhook verification failed");
            api_validation_error("webhook verification failed")
        })?;

    let envelope: WebhookEnvelope = serde_json::from_slice(&body)
        .map_err(|_| api_validation_error("malformed webhook payload"))?;
    let event = IdentityEvent::from_envelope(&envelope.kind, &envelope.data)
        .map_err(|err| api_validation_error(&err.to_string()))?;

    tracing::info!(kind = %envelope.kind, message_id, "applying webhook event");
    state
        .reconciler
        .apply(event)
        .await
        .map_err(|err| api_internal("failed to apply webhook event", &err))?;
    Ok(StatusCode::NO_CONTENT)
}
