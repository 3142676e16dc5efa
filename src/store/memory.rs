//! In-memory implementation of the application store.
//!
//! # Purpose
//! This store implements the per-entity store traits entirely in memory using
//! `HashMap`s guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: write locks serialize mutations, so the
//!   upsert-by-external-key operations are atomic within one process the same
//!   way the Postgres `ON CONFLICT` path is atomic across processes.
//!
//! # Metrics
//! This store updates a small set of gauges/counters to keep observability
//! behavior consistent with durable backends.
use super::{
    AppStore, MembershipStore, OrganizationStore, StoreError, StoreResult, TweetStore, UserStore,
    WishDraft, WishStore, WishUpdate,
};
use crate::model::{Membership, MembershipRole, Organization, Tweet, User, UserProfile, Wish};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory application store.
///
/// Users are keyed by provider subject ID and organizations by provider
/// external ID, mirroring the unique indexes the Postgres backend relies on.
/// Memberships are keyed by the (user, organization) pair.
#[derive(Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    organizations: Arc<RwLock<HashMap<String, Organization>>>,
    memberships: Arc<RwLock<HashMap<(Uuid, Uuid), Membership>>>,
    wishes: Arc<RwLock<HashMap<Uuid, Wish>>>,
    tweets: Arc<RwLock<HashMap<Uuid, Tweet>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn upsert_user_by_sub_id(
        &self,
        sub_id: &str,
        profile: UserProfile,
    ) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let now = Utc::now();
        let user = users
            .entry(sub_id.to_string())
            .and_modify(|existing| {
                existing.name = profile.name.clone();
                existing.avatar_url = profile.avatar_url.clone();
                existing.updated_at = now;
                // Upserts revive soft-deleted rows.
                existing.deleted_at = None;
            })
            .or_insert_with(|| User {
                id: Uuid::new_v4(),
                sub_id: sub_id.to_string(),
                name: profile.name.clone(),
                avatar_url: profile.avatar_url.clone(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .clone();
        metrics::gauge!("taine_store_users").set(users.len() as f64);
        Ok(user)
    }

    async fn find_user_by_sub_id(&self, sub_id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .get(sub_id)
            .filter(|user| user.deleted_at.is_none())
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.id == id && user.deleted_at.is_none())
            .cloned())
    }

    async fn soft_delete_user_by_sub_id(&self, sub_id: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        match users.get_mut(sub_id) {
            Some(user) if user.deleted_at.is_none() => {
                let now = Utc::now();
                user.deleted_at = Some(now);
                user.updated_at = now;
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("user: {sub_id}"))),
        }
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn upsert_organization_by_external_id(
        &self,
        external_id: &str,
        name: &str,
    ) -> StoreResult<Organization> {
        let mut organizations = self.organizations.write().await;
        let now = Utc::now();
        let organization = organizations
            .entry(external_id.to_string())
            .and_modify(|existing| {
                existing.name = name.to_string();
                existing.updated_at = now;
                existing.deleted_at = None;
            })
            .or_insert_with(|| Organization {
                id: Uuid::new_v4(),
                external_id: external_id.to_string(),
                name: name.to_string(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .clone();
        metrics::gauge!("taine_store_organizations").set(organizations.len() as f64);
        Ok(organization)
    }

    async fn find_organization_by_external_id(
        &self,
        external_id: &str,
    ) -> StoreResult<Option<Organization>> {
        let organizations = self.organizations.read().await;
        Ok(organizations
            .get(external_id)
            .filter(|org| org.deleted_at.is_none())
            .cloned())
    }

    async fn find_organization_by_id(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        let organizations = self.organizations.read().await;
        Ok(organizations
            .values()
            .find(|org| org.id == id && org.deleted_at.is_none())
            .cloned())
    }

    async fn soft_delete_organization_by_external_id(&self, external_id: &str) -> StoreResult<()> {
        let mut organizations = self.organizations.write().await;
        match organizations.get_mut(external_id) {
            Some(org) if org.deleted_at.is_none() => {
                let now = Utc::now();
                org.deleted_at = Some(now);
                org.updated_at = now;
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("organization: {external_id}"))),
        }
    }
}

#[async_trait]
impl MembershipStore for InMemoryStore {
    async fn upsert_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: MembershipRole,
    ) -> StoreResult<Membership> {
        let mut memberships = self.memberships.write().await;
        let now = Utc::now();
        let membership = memberships
            .entry((user_id, organization_id))
            .and_modify(|existing| {
                existing.role = role;
                existing.updated_at = now;
                existing.deleted_at = None;
            })
            .or_insert_with(|| Membership {
                id: Uuid::new_v4(),
                user_id,
                organization_id,
                role,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .clone();
        Ok(membership)
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let memberships = self.memberships.read().await;
        Ok(memberships
            .get(&(user_id, organization_id))
            .filter(|membership| membership.deleted_at.is_none())
            .cloned())
    }

    async fn soft_delete_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<()> {
        let mut memberships = self.memberships.write().await;
        match memberships.get_mut(&(user_id, organization_id)) {
            Some(membership) if membership.deleted_at.is_none() => {
                let now = Utc::now();
                membership.deleted_at = Some(now);
                membership.updated_at = now;
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!(
                "membership: {user_id}/{organization_id}"
            ))),
        }
    }
}

#[async_trait]
impl WishStore for InMemoryStore {
    async fn create_wish(&self, draft: WishDraft) -> StoreResult<Wish> {
        let mut wishes = self.wishes.write().await;
        let now = Utc::now();
        let wish = Wish {
            id: Uuid::new_v4(),
            organization_id: draft.organization_id,
            title: draft.title,
            note: draft.note,
            order_no: draft.order_no,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        wishes.insert(wish.id, wish.clone());
        metrics::counter!("taine_store_wishes_created").increment(1);
        Ok(wish)
    }

    async fn find_wish(&self, id: Uuid) -> StoreResult<Option<Wish>> {
        // Soft-deleted rows are visible here; restore depends on that.
        let wishes = self.wishes.read().await;
        Ok(wishes.get(&id).cloned())
    }

    async fn list_wishes_by_organization(&self, organization_id: Uuid) -> StoreResult<Vec<Wish>> {
        let wishes = self.wishes.read().await;
        let mut items: Vec<Wish> = wishes
            .values()
            .filter(|wish| wish.organization_id == organization_id && wish.deleted_at.is_none())
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.order_no
                .cmp(&a.order_no)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn update_wish(&self, id: Uuid, update: WishUpdate) -> StoreResult<Wish> {
        let mut wishes = self.wishes.write().await;
        let wish = wishes
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("wish: {id}")))?;
        wish.title = update.title;
        wish.note = update.note;
        wish.order_no = update.order_no;
        wish.updated_at = Utc::now();
        Ok(wish.clone())
    }

    async fn update_wish_order(&self, id: Uuid, order_no: i32) -> StoreResult<Wish> {
        let mut wishes = self.wishes.write().await;
        let wish = wishes
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("wish: {id}")))?;
        wish.order_no = order_no;
        wish.updated_at = Utc::now();
        Ok(wish.clone())
    }

    async fn soft_delete_wish(&self, id: Uuid) -> StoreResult<()> {
        let mut wishes = self.wishes.write().await;
        match wishes.get_mut(&id) {
            Some(wish) if wish.deleted_at.is_none() => {
                let now = Utc::now();
                wish.deleted_at = Some(now);
                wish.updated_at = now;
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("wish: {id}"))),
        }
    }

    async fn restore_wish(&self, id: Uuid) -> StoreResult<()> {
        let mut wishes = self.wishes.write().await;
        match wishes.get_mut(&id) {
            Some(wish) if wish.deleted_at.is_some() => {
                wish.deleted_at = None;
                wish.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("wish: {id}"))),
        }
    }

    async fn delete_wish(&self, id: Uuid) -> StoreResult<()> {
        let mut wishes = self.wishes.write().await;
        wishes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("wish: {id}")))
    }
}

#[async_trait]
impl TweetStore for InMemoryStore {
    async fn create_tweet(&self, user_id: Uuid, content: &str) -> StoreResult<Tweet> {
        let mut tweets = self.tweets.write().await;
        let now = Utc::now();
        let tweet = Tweet {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        tweets.insert(tweet.id, tweet.clone());
        metrics::counter!("taine_store_tweets_created").increment(1);
        Ok(tweet)
    }

    async fn find_tweet(&self, id: Uuid) -> StoreResult<Option<Tweet>> {
        let tweets = self.tweets.read().await;
        Ok(tweets.get(&id).cloned())
    }

    async fn list_tweets(&self) -> StoreResult<Vec<Tweet>> {
        let tweets = self.tweets.read().await;
        let mut items: Vec<Tweet> = tweets.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_tweets_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Tweet>> {
        let tweets = self.tweets.read().await;
        let mut items: Vec<Tweet> = tweets
            .values()
            .filter(|tweet| tweet.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn update_tweet_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> StoreResult<Tweet> {
        let mut tweets = self.tweets.write().await;
        // Ownership is part of the match condition, so a mismatch is the same
        // NotFound as a missing row.
        match tweets.get_mut(&id) {
            Some(tweet) if tweet.user_id == user_id => {
                tweet.content = content.to_string();
                tweet.updated_at = Utc::now();
                Ok(tweet.clone())
            }
            _ => Err(StoreError::NotFound(format!("tweet: {id}"))),
        }
    }

    async fn delete_tweet_owned(&self, id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut tweets = self.tweets.write().await;
        match tweets.get(&id) {
            Some(tweet) if tweet.user_id == user_id => {
                tweets.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("tweet: {id}"))),
        }
    }
}

#[async_trait]
impl AppStore for InMemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
