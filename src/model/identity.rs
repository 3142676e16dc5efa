//! Identity records mirrored from the external auth provider.
//!
//! # Purpose
//! Defines users, organizations, and the membership rows linking them. These
//! rows are written by the reconciler and read by the API layer.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Local mirror of a provider user. `sub_id` is the provider's stable subject
/// identifier; `id` is ours and never derived from provider input.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct User {
    pub id: Uuid,
    pub sub_id: String,
    pub name: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Mutable profile fields carried by user upserts.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub name: String,
    pub avatar_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Organization {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// At most one membership row exists per (user, organization) pair; upserts
/// replace the role in place.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: MembershipRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    Owner,
    Admin,
    Member,
}

impl MembershipRole {
    /// Parse a provider role string. Clerk-style roles arrive prefixed
    /// (`org:admin`); the prefix is stripped before matching. Unrecognized
    /// roles degrade to `Member` so a new provider role never fails a
    /// webhook delivery.
    pub fn from_provider(raw: &str) -> Self {
        match raw.strip_prefix("org:").unwrap_or(raw) {
            "owner" => MembershipRole::Owner,
            "admin" => MembershipRole::Admin,
            _ => MembershipRole::Member,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "owner",
            MembershipRole::Admin => "admin",
            MembershipRole::Member => "member",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_strips_provider_prefix() {
        assert_eq!(MembershipRole::from_provider("org:admin"), MembershipRole::Admin);
        assert_eq!(MembershipRole::from_provider("owner"), MembershipRole::Owner);
        assert_eq!(MembershipRole::from_provider("member"), MembershipRole::Member);
    }

    #[test]
    fn unknown_role_degrades_to_member() {
        assert_eq!(
            MembershipRole::from_provider("org:billing_manager"),
            MembershipRole::Member
        );
    }
}
