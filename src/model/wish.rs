//! Wish resource model.
//!
//! # Purpose
//! Defines the organization-scoped wish record with soft-delete and a display
//! ordering hint.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// `order_no` carries no uniqueness constraint; ties are fine and ordering is
/// a display hint only.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Wish {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub note: String,
    pub order_no: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Wish {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
