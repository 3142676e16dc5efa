//! Tweet service.
//!
//! # Purpose
//! User-scoped tweet CRUD. Mutations go through the store's conditional
//! owner-scoped operations, so a non-owner receives the same NotFound as a
//! missing tweet and can never learn the tweet exists.
use crate::model::Tweet;
use crate::service::{ServiceError, ServiceResult};
use crate::store::{AppStore, StoreError};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct TweetService {
    store: Arc<dyn AppStore>,
}

impl TweetService {
    pub fn new(store: Arc<dyn AppStore>) -> Self {
        Self { store }
    }

    /// Store NotFound messages carry row identifiers for logs; the
    /// user-visible error must be the same bare noun whether the row is
    /// missing or owned by someone else.
    fn mask_not_found(err: StoreError) -> ServiceError {
        match err {
            StoreError::NotFound(_) => ServiceError::NotFound("tweet".to_string()),
            other => ServiceError::from(other),
        }
    }

    fn validate_content(content: &str) -> ServiceResult<&str> {
        if content.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "content is required".to_string(),
            ));
        }
        Ok(content)
    }

    pub async fn create(&self, user_id: Uuid, content: &str) -> ServiceResult<Tweet> {
        let content = Self::validate_content(content)?;
        Ok(self.store.create_tweet(user_id, content).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<Tweet> {
        self.store
            .find_tweet(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("tweet".to_string()))
    }

    pub async fn list(&self) -> ServiceResult<Vec<Tweet>> {
        Ok(self.store.list_tweets().await?)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> ServiceResult<Vec<Tweet>> {
        Ok(self.store.list_tweets_by_user(user_id).await?)
    }

    pub async fn update(&self, id: Uuid, user_id: Uuid, content: &str) -> ServiceResult<Tweet> {
        let content = Self::validate_content(content)?;
        self.store
            .update_tweet_owned(id, user_id, content)
            .await
            .map_err(Self::mask_not_found)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        self.store
            .delete_tweet_owned(id, user_id)
            .await
            .map_err(Self::mask_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn service() -> TweetService {
        TweetService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn create_rejects_blank_content() {
        let service = service();
        let err = service
            .create(Uuid::new_v4(), "  ")
            .await
            .expect_err("blank content");
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn non_owner_errors_match_missing_tweet_errors() {
        let service = service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let tweet = service.create(owner, "hello").await.expect("create");

        let for_missing = service
            .update(Uuid::new_v4(), owner, "x")
            .await
            .expect_err("missing tweet");
        let for_stranger = service
            .update(tweet.id, stranger, "x")
            .await
            .expect_err("not the owner");
        // Identical variant and message shape, so responses cannot leak
        // existence.
        assert!(matches!(for_missing, ServiceError::NotFound(_)));
        assert!(matches!(for_stranger, ServiceError::NotFound(_)));

        let err = service
            .delete(tweet.id, stranger)
            .await
            .expect_err("not the owner");
        assert!(matches!(err, ServiceError::NotFound(_)));

        // Owner operations still work afterwards.
        let updated = service.update(tweet.id, owner, "edited").await.expect("update");
        assert_eq!(updated.content, "edited");
        service.delete(tweet.id, owner).await.expect("delete");
        let err = service.get(tweet.id).await.expect_err("gone");
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_by_user_filters_to_author() {
        let service = service();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        service.create(a, "from a").await.expect("create");
        service.create(b, "from b").await.expect("create");

        let mine = service.list_by_user(a).await.expect("list");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].content, "from a");
        assert_eq!(service.list().await.expect("list all").len(), 2);
    }
}
