//! HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and the shared helper resolving the
//! authenticated caller to a local user row.
pub mod error;
pub mod openapi;
pub mod system;
pub mod tweets;
pub mod types;
pub mod users;
pub mod webhooks;
pub mod wishes;

use crate::api::error::{api_internal, ApiError};
use crate::app::AppState;
use crate::auth::SessionClaims;
use crate::model::{User, UserProfile};

/// Resolve the caller's local user row, provisioning a minimal one on first
/// contact. A user whose `user.created` webhook has not arrived yet can still
/// use the API; the later profile sync fills in name and avatar. An existing
/// row is returned untouched so a synced profile is never overwritten with
/// blanks.
pub(crate) async fn current_user(
    state: &AppState,
    claims: &SessionClaims,
) -> Result<User, ApiError> {
    match state.store.find_user_by_sub_id(&claims.sub_id).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => state
            .store
            .upsert_user_by_sub_id(&claims.sub_id, UserProfile::default())
            .await
            .map_err(|err| api_internal("failed to provision user", &err)),
        Err(err) => Err(api_internal("failed to load user", &err)),
    }
}
