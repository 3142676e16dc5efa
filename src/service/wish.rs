//! Wish service.
//!
//! # Purpose
//! Organization-scoped wish CRUD with explicit soft-delete/restore
//! preconditions. Callers address the organization either by internal ID or
//! by the provider external ID carried in their session token.
use crate::model::{Organization, Wish};
use crate::service::{ServiceError, ServiceResult};
use crate::store::{AppStore, StoreError, WishDraft, WishUpdate};
use std::sync::Arc;
use uuid::Uuid;

/// How the caller names the owning organization.
#[derive(Debug, Clone)]
pub enum OrgSelector {
    Internal(Uuid),
    External(String),
}

#[derive(Clone)]
pub struct WishService {
    store: Arc<dyn AppStore>,
}

impl WishService {
    pub fn new(store: Arc<dyn AppStore>) -> Self {
        Self { store }
    }

    async fn resolve_organization(&self, selector: &OrgSelector) -> ServiceResult<Organization> {
        let organization = match selector {
            OrgSelector::Internal(id) => self.store.find_organization_by_id(*id).await?,
            OrgSelector::External(external_id) => {
                self.store
                    .find_organization_by_external_id(external_id)
                    .await?
            }
        };
        organization.ok_or_else(|| ServiceError::NotFound("organization".to_string()))
    }

    /// Store NotFound messages carry row identifiers for logs; the
    /// user-visible error is always the bare noun.
    fn mask_not_found(err: StoreError) -> ServiceError {
        match err {
            StoreError::NotFound(_) => ServiceError::NotFound("wish".to_string()),
            other => ServiceError::from(other),
        }
    }

    fn validate_title(title: &str) -> ServiceResult<String> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidInput("title is required".to_string()));
        }
        Ok(trimmed.to_string())
    }

    pub async fn create(
        &self,
        organization: OrgSelector,
        title: &str,
        note: &str,
        order_no: i32,
    ) -> ServiceResult<Wish> {
        let title = Self::validate_title(title)?;
        let organization = self.resolve_organization(&organization).await?;
        let wish = self
            .store
            .create_wish(WishDraft {
                organization_id: organization.id,
                title,
                note: note.to_string(),
                order_no,
            })
            .await?;
        Ok(wish)
    }

    /// Returns the wish whether or not it is soft-deleted; clients need to
    /// see deleted wishes to offer restore.
    pub async fn get(&self, id: Uuid) -> ServiceResult<Wish> {
        self.store
            .find_wish(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("wish".to_string()))
    }

    pub async fn list(&self, organization: OrgSelector) -> ServiceResult<Vec<Wish>> {
        let organization = self.resolve_organization(&organization).await?;
        Ok(self
            .store
            .list_wishes_by_organization(organization.id)
            .await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        title: &str,
        note: &str,
        order_no: i32,
    ) -> ServiceResult<Wish> {
        let title = Self::validate_title(title)?;
        self.store
            .update_wish(
                id,
                WishUpdate {
                    title,
                    note: note.to_string(),
                    order_no,
                },
            )
            .await
            .map_err(Self::mask_not_found)
    }

    /// Narrow single-field mutation so drag-reorder does not round-trip the
    /// whole record.
    pub async fn update_order(&self, id: Uuid, order_no: i32) -> ServiceResult<Wish> {
        self.store
            .update_wish_order(id, order_no)
            .await
            .map_err(Self::mask_not_found)
    }

    pub async fn soft_delete(&self, id: Uuid) -> ServiceResult<()> {
        let wish = self.get(id).await?;
        if wish.is_deleted() {
            return Err(ServiceError::InvalidInput(
                "wish is already deleted".to_string(),
            ));
        }
        self.store
            .soft_delete_wish(id)
            .await
            .map_err(Self::mask_not_found)
    }

    pub async fn restore(&self, id: Uuid) -> ServiceResult<()> {
        let wish = self.get(id).await?;
        if !wish.is_deleted() {
            return Err(ServiceError::InvalidInput(
                "wish is not deleted".to_string(),
            ));
        }
        self.store
            .restore_wish(id)
            .await
            .map_err(Self::mask_not_found)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.store
            .delete_wish(id)
            .await
            .map_err(Self::mask_not_found)
    }
}
