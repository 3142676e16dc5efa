use crate::model::{Membership, MembershipRole, Organization, Tweet, User, UserProfile, Wish};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields accepted when creating a wish. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct WishDraft {
    pub organization_id: Uuid,
    pub title: String,
    pub note: String,
    pub order_no: i32,
}

/// Full-update payload for a wish. Ordering is also mutable through the
/// narrower `update_wish_order`.
#[derive(Debug, Clone)]
pub struct WishUpdate {
    pub title: String,
    pub note: String,
    pub order_no: i32,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Atomic insert-or-update keyed by the provider subject ID. An existing
    /// row gets the new profile and its soft-delete marker cleared.
    async fn upsert_user_by_sub_id(&self, sub_id: &str, profile: UserProfile)
    -> StoreResult<User>;
    /// Active rows only; soft-deleted users are invisible here.
    async fn find_user_by_sub_id(&self, sub_id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// NotFound when no active row matches. Callers that want idempotent
    /// semantics swallow that case themselves.
    async fn soft_delete_user_by_sub_id(&self, sub_id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Atomic insert-or-update keyed by the provider organization ID. Revives
    /// a soft-deleted row rather than failing on the unique constraint.
    async fn upsert_organization_by_external_id(
        &self,
        external_id: &str,
        name: &str,
    ) -> StoreResult<Organization>;
    async fn find_organization_by_external_id(
        &self,
        external_id: &str,
    ) -> StoreResult<Option<Organization>>;
    async fn find_organization_by_id(&self, id: Uuid) -> StoreResult<Option<Organization>>;
    async fn soft_delete_organization_by_external_id(&self, external_id: &str)
    -> StoreResult<()>;
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Upsert on the (user, organization) pair: replaces the role and clears
    /// any soft-delete marker, so re-adding a member never duplicates rows.
    async fn upsert_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: MembershipRole,
    ) -> StoreResult<Membership>;
    /// Active rows only.
    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<Option<Membership>>;
    async fn soft_delete_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<()>;
}

#[async_trait]
pub trait WishStore: Send + Sync {
    async fn create_wish(&self, draft: WishDraft) -> StoreResult<Wish>;
    /// Includes soft-deleted rows; restore needs to see them.
    async fn find_wish(&self, id: Uuid) -> StoreResult<Option<Wish>>;
    /// Active rows only, ordered by order_no descending then created_at
    /// descending.
    async fn list_wishes_by_organization(&self, organization_id: Uuid) -> StoreResult<Vec<Wish>>;
    async fn update_wish(&self, id: Uuid, update: WishUpdate) -> StoreResult<Wish>;
    async fn update_wish_order(&self, id: Uuid, order_no: i32) -> StoreResult<Wish>;
    /// Marks an active row deleted; NotFound when no active row matches.
    async fn soft_delete_wish(&self, id: Uuid) -> StoreResult<()>;
    /// Clears the marker on a deleted row; NotFound when no deleted row
    /// matches.
    async fn restore_wish(&self, id: Uuid) -> StoreResult<()>;
    async fn delete_wish(&self, id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait TweetStore: Send + Sync {
    async fn create_tweet(&self, user_id: Uuid, content: &str) -> StoreResult<Tweet>;
    async fn find_tweet(&self, id: Uuid) -> StoreResult<Option<Tweet>>;
    async fn list_tweets(&self) -> StoreResult<Vec<Tweet>>;
    async fn list_tweets_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Tweet>>;
    /// Conditional update: the row must exist AND belong to `user_id`, in one
    /// operation. Zero rows is NotFound either way, so ownership mismatches
    /// are indistinguishable from missing tweets.
    async fn update_tweet_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> StoreResult<Tweet>;
    async fn delete_tweet_owned(&self, id: Uuid, user_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait AppStore:
    UserStore + OrganizationStore + MembershipStore + WishStore + TweetStore + Send + Sync
{
    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
