//! Postgres-backed implementation of the application store.
//!
//! # What this module is
//! Implements the per-entity store traits using Postgres (via `sqlx`) as the
//! durable backing store for identity mirrors (users, organizations,
//! memberships) and the wish/tweet resources.
//!
//! # Key invariants
//! - `users.sub_id` and `organizations.external_id` are unique; upserts use
//!   `INSERT ... ON CONFLICT ... DO UPDATE ... RETURNING` so two redelivered
//!   webhooks for the same key resolve to one row without racing. The unique
//!   index is the enforcement point; there is no read-then-write.
//! - `organization_memberships` is unique on (user_id, organization_id); the
//!   upsert replaces the role and clears `deleted_at`.
//! - Soft deletes are `UPDATE ... SET deleted_at = now()` guarded on
//!   `deleted_at IS NULL`; zero affected rows maps to NotFound.
//! - Tweet mutations carry ownership in the WHERE clause, so a non-owner
//!   gets the same NotFound as a missing row.
//!
//! # Operational notes
//! - Migrations run at startup via `sqlx::migrate!("./migrations")` so
//!   handlers can assume the schema exists.
//! - Connection pooling and acquire timeouts are explicit; hanging forever on
//!   DB failures is unacceptable for a webhook receiver that the provider
//!   times out and redelivers.
//! - Database URLs may contain credentials; avoid logging them.
use super::{
    AppStore, MembershipStore, OrganizationStore, StoreError, StoreResult, TweetStore, UserStore,
    WishDraft, WishStore, WishUpdate,
};
use crate::config::PostgresConfig;
use crate::model::{Membership, MembershipRole, Organization, Tweet, User, UserProfile, Wish};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Durable application store backed by Postgres.
pub struct PostgresStore {
    pool: PgPool,
}

// DB-facing row structs are kept separate from domain types so schema changes
// stay localized to this module.
#[derive(Debug, Clone, FromRow)]
struct DbUser {
    id: Uuid,
    sub_id: String,
    name: String,
    avatar_url: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
struct DbOrganization {
    id: Uuid,
    external_id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
struct DbMembership {
    id: Uuid,
    user_id: Uuid,
    organization_id: Uuid,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
struct DbWish {
    id: Uuid,
    organization_id: Uuid,
    title: String,
    note: String,
    order_no: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
struct DbTweet {
    id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DbUser> for User {
    fn from(row: DbUser) -> Self {
        User {
            id: row.id,
            sub_id: row.sub_id,
            name: row.name,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<DbOrganization> for Organization {
    fn from(row: DbOrganization) -> Self {
        Organization {
            id: row.id,
            external_id: row.external_id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<DbMembership> for Membership {
    fn from(row: DbMembership) -> Self {
        Membership {
            id: row.id,
            user_id: row.user_id,
            organization_id: row.organization_id,
            role: MembershipRole::from_provider(&row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<DbWish> for Wish {
    fn from(row: DbWish) -> Self {
        Wish {
            id: row.id,
            organization_id: row.organization_id,
            title: row.title,
            note: row.note,
            order_no: row.order_no,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

impl From<DbTweet> for Tweet {
    fn from(row: DbTweet) -> Self {
        Tweet {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostgresStore {
    /// Open a connection pool and run migrations.
    ///
    /// # Errors
    /// - Connection, migration, or pool setup failures.
    pub async fn connect(pg: &PostgresConfig) -> StoreResult<Self> {
        Self::connect_internal(pg, true).await
    }

    /// Connect without running migrations. Intended for tests that manage the
    /// schema externally.
    #[cfg(any(test, feature = "pg-tests"))]
    pub async fn connect_without_migrations(pg: &PostgresConfig) -> StoreResult<Self> {
        Self::connect_internal(pg, false).await
    }

    async fn connect_internal(pg: &PostgresConfig, run_migrations: bool) -> StoreResult<Self> {
        // `max_connections` caps concurrent DB work; `acquire_timeout` bounds
        // how long a request waits for a pooled connection before failing
        // fast. Avoid logging `pg.url`, it may contain credentials.
        let connect_options = PgConnectOptions::from_str(&pg.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(pg.max_connections)
            .acquire_timeout(Duration::from_millis(pg.acquire_timeout_ms))
            .connect_with(connect_options)
            .await?;

        if run_migrations {
            // Migrations run before serving requests; a failure here fails
            // startup rather than serving against a missing schema.
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|err| StoreError::Unexpected(err.into()))?;
        }

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn upsert_user_by_sub_id(
        &self,
        sub_id: &str,
        profile: UserProfile,
    ) -> StoreResult<User> {
        // Single atomic merge; the unique index on sub_id resolves concurrent
        // redeliveries of the same subject.
        let row = sqlx::query_as::<_, DbUser>(
            r#"INSERT INTO users (sub_id, name, avatar_url)
               VALUES ($1, $2, $3)
               ON CONFLICT (sub_id) DO UPDATE
               SET name = EXCLUDED.name,
                   avatar_url = EXCLUDED.avatar_url,
                   updated_at = now(),
                   deleted_at = NULL
               RETURNING id, sub_id, name, avatar_url, created_at, updated_at, deleted_at"#,
        )
        .bind(sub_id)
        .bind(&profile.name)
        .bind(&profile.avatar_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_user_by_sub_id(&self, sub_id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, DbUser>(
            r#"SELECT id, sub_id, name, avatar_url, created_at, updated_at, deleted_at
               FROM users WHERE sub_id = $1 AND deleted_at IS NULL"#,
        )
        .bind(sub_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, DbUser>(
            r#"SELECT id, sub_id, name, avatar_url, created_at, updated_at, deleted_at
               FROM users WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn soft_delete_user_by_sub_id(&self, sub_id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"UPDATE users SET deleted_at = now(), updated_at = now()
               WHERE sub_id = $1 AND deleted_at IS NULL"#,
        )
        .bind(sub_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user: {sub_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl OrganizationStore for PostgresStore {
    async fn upsert_organization_by_external_id(
        &self,
        external_id: &str,
        name: &str,
    ) -> StoreResult<Organization> {
        // Clearing deleted_at here is what makes delete-then-recreate with
        // the same external ID revive the row instead of tripping the unique
        // index.
        let row = sqlx::query_as::<_, DbOrganization>(
            r#"INSERT INTO organizations (external_id, name)
               VALUES ($1, $2)
               ON CONFLICT (external_id) DO UPDATE
               SET name = EXCLUDED.name,
                   updated_at = now(),
                   deleted_at = NULL
               RETURNING id, external_id, name, created_at, updated_at, deleted_at"#,
        )
        .bind(external_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_organization_by_external_id(
        &self,
        external_id: &str,
    ) -> StoreResult<Option<Organization>> {
        let row = sqlx::query_as::<_, DbOrganization>(
            r#"SELECT id, external_id, name, created_at, updated_at, deleted_at
               FROM organizations WHERE external_id = $1 AND deleted_at IS NULL"#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_organization_by_id(&self, id: Uuid) -> StoreResult<Option<Organization>> {
        let row = sqlx::query_as::<_, DbOrganization>(
            r#"SELECT id, external_id, name, created_at, updated_at, deleted_at
               FROM organizations WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn soft_delete_organization_by_external_id(&self, external_id: &str) -> StoreResult<()> {
        let result = sqlx::query(
            r#"UPDATE organizations SET deleted_at = now(), updated_at = now()
               WHERE external_id = $1 AND deleted_at IS NULL"#,
        )
        .bind(external_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("organization: {external_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl MembershipStore for PostgresStore {
    async fn upsert_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        role: MembershipRole,
    ) -> StoreResult<Membership> {
        let row = sqlx::query_as::<_, DbMembership>(
            r#"INSERT INTO organization_memberships (user_id, organization_id, role)
               VALUES ($1, $2, $3)
               ON CONFLICT (user_id, organization_id) DO UPDATE
               SET role = EXCLUDED.role,
                   updated_at = now(),
                   deleted_at = NULL
               RETURNING id, user_id, organization_id, role, created_at, updated_at, deleted_at"#,
        )
        .bind(user_id)
        .bind(organization_id)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<Option<Membership>> {
        let row = sqlx::query_as::<_, DbMembership>(
            r#"SELECT id, user_id, organization_id, role, created_at, updated_at, deleted_at
               FROM organization_memberships
               WHERE user_id = $1 AND organization_id = $2 AND deleted_at IS NULL"#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn soft_delete_membership(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            r#"UPDATE organization_memberships SET deleted_at = now(), updated_at = now()
               WHERE user_id = $1 AND organization_id = $2 AND deleted_at IS NULL"#,
        )
        .bind(user_id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "membership: {user_id}/{organization_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl WishStore for PostgresStore {
    async fn create_wish(&self, draft: WishDraft) -> StoreResult<Wish> {
        let row = sqlx::query_as::<_, DbWish>(
            r#"INSERT INTO wishes (organization_id, title, note, order_no)
               VALUES ($1, $2, $3, $4)
               RETURNING id, organization_id, title, note, order_no, created_at, updated_at, deleted_at"#,
        )
        .bind(draft.organization_id)
        .bind(&draft.title)
        .bind(&draft.note)
        .bind(draft.order_no)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_wish(&self, id: Uuid) -> StoreResult<Option<Wish>> {
        // Intentionally no deleted_at filter; restore reads deleted rows.
        let row = sqlx::query_as::<_, DbWish>(
            r#"SELECT id, organization_id, title, note, order_no, created_at, updated_at, deleted_at
               FROM wishes WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_wishes_by_organization(&self, organization_id: Uuid) -> StoreResult<Vec<Wish>> {
        let rows = sqlx::query_as::<_, DbWish>(
            r#"SELECT id, organization_id, title, note, order_no, created_at, updated_at, deleted_at
               FROM wishes
               WHERE organization_id = $1 AND deleted_at IS NULL
               ORDER BY order_no DESC, created_at DESC"#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_wish(&self, id: Uuid, update: WishUpdate) -> StoreResult<Wish> {
        let row = sqlx::query_as::<_, DbWish>(
            r#"UPDATE wishes
               SET title = $2, note = $3, order_no = $4, updated_at = now()
               WHERE id = $1
               RETURNING id, organization_id, title, note, order_no, created_at, updated_at, deleted_at"#,
        )
        .bind(id)
        .bind(&update.title)
        .bind(&update.note)
        .bind(update.order_no)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Into::into)
            .ok_or_else(|| StoreError::NotFound(format!("wish: {id}")))
    }

    async fn update_wish_order(&self, id: Uuid, order_no: i32) -> StoreResult<Wish> {
        let row = sqlx::query_as::<_, DbWish>(
            r#"UPDATE wishes SET order_no = $2, updated_at = now()
               WHERE id = $1
               RETURNING id, organization_id, title, note, order_no, created_at, updated_at, deleted_at"#,
        )
        .bind(id)
        .bind(order_no)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Into::into)
            .ok_or_else(|| StoreError::NotFound(format!("wish: {id}")))
    }

    async fn soft_delete_wish(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query(
            r#"UPDATE wishes SET deleted_at = now(), updated_at = now()
               WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("wish: {id}")));
        }
        Ok(())
    }

    async fn restore_wish(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query(
            r#"UPDATE wishes SET deleted_at = NULL, updated_at = now()
               WHERE id = $1 AND deleted_at IS NOT NULL"#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("wish: {id}")));
        }
        Ok(())
    }

    async fn delete_wish(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM wishes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("wish: {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl TweetStore for PostgresStore {
    async fn create_tweet(&self, user_id: Uuid, content: &str) -> StoreResult<Tweet> {
        let row = sqlx::query_as::<_, DbTweet>(
            r#"INSERT INTO tweets (user_id, content)
               VALUES ($1, $2)
               RETURNING id, user_id, content, created_at, updated_at"#,
        )
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_tweet(&self, id: Uuid) -> StoreResult<Option<Tweet>> {
        let row = sqlx::query_as::<_, DbTweet>(
            r#"SELECT id, user_id, content, created_at, updated_at
               FROM tweets WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_tweets(&self) -> StoreResult<Vec<Tweet>> {
        let rows = sqlx::query_as::<_, DbTweet>(
            r#"SELECT id, user_id, content, created_at, updated_at
               FROM tweets ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_tweets_by_user(&self, user_id: Uuid) -> StoreResult<Vec<Tweet>> {
        let rows = sqlx::query_as::<_, DbTweet>(
            r#"SELECT id, user_id, content, created_at, updated_at
               FROM tweets WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_tweet_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> StoreResult<Tweet> {
        // Ownership lives in the WHERE clause: one conditional statement, no
        // load-then-compare, and a mismatch is indistinguishable from a
        // missing row.
        let row = sqlx::query_as::<_, DbTweet>(
            r#"UPDATE tweets SET content = $3, updated_at = now()
               WHERE id = $1 AND user_id = $2
               RETURNING id, user_id, content, created_at, updated_at"#,
        )
        .bind(id)
        .bind(user_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Into::into)
            .ok_or_else(|| StoreError::NotFound(format!("tweet: {id}")))
    }

    async fn delete_tweet_owned(&self, id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tweets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("tweet: {id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl AppStore for PostgresStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
