//! Resource services.
//!
//! # Purpose
//! Business rules over the store: input validation, soft-delete/restore
//! preconditions, and organization scoping. Handlers translate
//! [`ServiceError`] into HTTP statuses at the boundary.
mod tweet;
mod wish;

pub use tweet::TweetService;
pub use wish::{OrgSelector, WishService};

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ServiceError::NotFound(what),
            other => ServiceError::Internal(other.into()),
        }
    }
}
