//! Identity reconciler.
//!
//! # Purpose
//! Applies provider lifecycle events to the store so local state converges
//! with the provider, tolerating redelivery and out-of-order arrival.
//!
//! # Key invariants
//! - Every operation is idempotent: re-applying an event leaves the store in
//!   the same state.
//! - No ordering is assumed. A membership event whose user or organization
//!   has not synced yet fails with NotFound and writes nothing; the provider's
//!   redelivery retries it after the referenced entity arrives.
//! - Deletes treat an absent target as already-satisfied. Surfacing NotFound
//!   there would make the webhook boundary return 500 and invite pointless
//!   redelivery for a state we already converged to.
use crate::model::{MembershipRole, UserProfile};
use crate::store::{AppStore, StoreError, StoreResult};
use crate::sync::IdentityEvent;
use std::sync::Arc;

pub struct Reconciler {
    store: Arc<dyn AppStore>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn AppStore>) -> Self {
        Self { store }
    }

    /// Apply one event. Errors here surface as HTTP 500 at the webhook
    /// boundary, which is the transport-level retry mechanism.
    pub async fn apply(&self, event: IdentityEvent) -> StoreResult<()> {
        match event {
            IdentityEvent::UserUpserted {
                sub_id,
                name,
                avatar_url,
            } => {
                metrics::counter!("taine_sync_events_total", "entity" => "user", "op" => "upsert")
                    .increment(1);
                self.store
                    .upsert_user_by_sub_id(&sub_id, UserProfile { name, avatar_url })
                    .await?;
                Ok(())
            }
            IdentityEvent::UserDeleted { sub_id } => {
                metrics::counter!("taine_sync_events_total", "entity" => "user", "op" => "delete")
                    .increment(1);
                already_satisfied_on_absent(self.store.soft_delete_user_by_sub_id(&sub_id).await)
            }
            IdentityEvent::OrganizationUpserted {
                external_id,
                name,
                created_by,
            } => {
                metrics::counter!("taine_sync_events_total", "entity" => "organization", "op" => "upsert")
                    .increment(1);
                let organization = self
                    .store
                    .upsert_organization_by_external_id(&external_id, &name)
                    .await?;
                if let Some(creator_sub_id) = created_by {
                    // Synthesize the owner membership only when the creator
                    // has already synced. Otherwise skip silently; the
                    // provider's own membership event converges it later.
                    match self.store.find_user_by_sub_id(&creator_sub_id).await? {
                        Some(creator) => {
                            self.store
                                .upsert_membership(
                                    creator.id,
                                    organization.id,
                                    MembershipRole::Owner,
                                )
                                .await?;
                        }
                        None => {
                            tracing::debug!(
                                organization = %external_id,
                                creator = %creator_sub_id,
                                "creator not synced yet, skipping owner membership"
                            );
                        }
                    }
                }
                Ok(())
            }
            IdentityEvent::OrganizationDeleted { external_id } => {
                metrics::counter!("taine_sync_events_total", "entity" => "organization", "op" => "delete")
                    .increment(1);
                already_satisfied_on_absent(
                    self.store
                        .soft_delete_organization_by_external_id(&external_id)
                        .await,
                )
            }
            IdentityEvent::MembershipUpserted {
                user_sub_id,
                organization_external_id,
                role,
            } => {
                metrics::counter!("taine_sync_events_total", "entity" => "membership", "op" => "upsert")
                    .increment(1);
                let (user_id, organization_id) = self
                    .resolve_membership_refs(&user_sub_id, &organization_external_id)
                    .await?;
                self.store
                    .upsert_membership(user_id, organization_id, MembershipRole::from_provider(&role))
                    .await?;
                Ok(())
            }
            IdentityEvent::MembershipDeleted {
                user_sub_id,
                organization_external_id,
            } => {
                metrics::counter!("taine_sync_events_total", "entity" => "membership", "op" => "delete")
                    .increment(1);
                let (user_id, organization_id) = self
                    .resolve_membership_refs(&user_sub_id, &organization_external_id)
                    .await?;
                already_satisfied_on_absent(
                    self.store
                        .soft_delete_membership(user_id, organization_id)
                        .await,
                )
            }
            IdentityEvent::Unhandled { kind } => {
                metrics::counter!("taine_sync_events_total", "entity" => "other", "op" => "ignored")
                    .increment(1);
                tracing::debug!(kind = %kind, "ignoring unhandled event kind");
                Ok(())
            }
        }
    }

    /// Resolve both sides of a membership event to internal IDs. Either side
    /// missing fails the whole event before anything is written, so no
    /// partial membership rows can appear.
    async fn resolve_membership_refs(
        &self,
        user_sub_id: &str,
        organization_external_id: &str,
    ) -> StoreResult<(uuid::Uuid, uuid::Uuid)> {
        let user = self
            .store
            .find_user_by_sub_id(user_sub_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user: {user_sub_id}")))?;
        let organization = self
            .store
            .find_organization_by_external_id(organization_external_id)
            .await?
            .ok_or_else(|| {
                StoreError::NotFound(format!("organization: {organization_external_id}"))
            })?;
        Ok((user.id, organization.id))
    }
}

fn already_satisfied_on_absent(result: StoreResult<()>) -> StoreResult<()> {
    match result {
        Err(StoreError::NotFound(_)) => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use crate::store::{MembershipStore, OrganizationStore, UserStore};

    fn reconciler() -> (Reconciler, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (Reconciler::new(store.clone()), store)
    }

    fn user_upserted(sub_id: &str, name: &str) -> IdentityEvent {
        IdentityEvent::UserUpserted {
            sub_id: sub_id.to_string(),
            name: name.to_string(),
            avatar_url: String::new(),
        }
    }

    #[tokio::test]
    async fn duplicate_user_events_yield_one_row_with_final_fields() {
        let (reconciler, store) = reconciler();
        reconciler
            .apply(user_upserted("user_1", "Ada"))
            .await
            .expect("apply");
        reconciler
            .apply(user_upserted("user_1", "Ada Lovelace"))
            .await
            .expect("apply again");

        let user = store
            .find_user_by_sub_id("user_1")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(user.name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn user_delete_is_replay_safe() {
        let (reconciler, store) = reconciler();
        reconciler
            .apply(user_upserted("user_1", "Ada"))
            .await
            .expect("apply");
        let delete = IdentityEvent::UserDeleted {
            sub_id: "user_1".to_string(),
        };
        reconciler.apply(delete.clone()).await.expect("first delete");
        // Redelivery of the same delete must not fail.
        reconciler.apply(delete).await.expect("redelivered delete");
        // Nor must a delete for a subject we never saw.
        reconciler
            .apply(IdentityEvent::UserDeleted {
                sub_id: "user_never_seen".to_string(),
            })
            .await
            .expect("unknown delete");
        assert!(store
            .find_user_by_sub_id("user_1")
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn membership_before_organization_fails_without_orphan_rows() {
        let (reconciler, store) = reconciler();
        reconciler
            .apply(user_upserted("user_1", "Ada"))
            .await
            .expect("apply");

        let membership = IdentityEvent::MembershipUpserted {
            user_sub_id: "user_1".to_string(),
            organization_external_id: "org_1".to_string(),
            role: "org:admin".to_string(),
        };
        let err = reconciler
            .apply(membership.clone())
            .await
            .expect_err("organization not synced yet");
        assert!(matches!(err, StoreError::NotFound(_)));

        // After the organization syncs, redelivery of the same event succeeds.
        reconciler
            .apply(IdentityEvent::OrganizationUpserted {
                external_id: "org_1".to_string(),
                name: "Acme".to_string(),
                created_by: None,
            })
            .await
            .expect("org sync");
        reconciler.apply(membership).await.expect("redelivery");

        let user = store
            .find_user_by_sub_id("user_1")
            .await
            .expect("find")
            .expect("present");
        let organization = store
            .find_organization_by_external_id("org_1")
            .await
            .expect("find")
            .expect("present");
        let row = store
            .find_membership(user.id, organization.id)
            .await
            .expect("find")
            .expect("converged after redelivery");
        assert_eq!(row.role, MembershipRole::Admin);
    }

    #[tokio::test]
    async fn organization_created_synthesizes_owner_for_known_creator() {
        let (reconciler, store) = reconciler();
        reconciler
            .apply(user_upserted("u1", "Ada"))
            .await
            .expect("user sync");
        reconciler
            .apply(IdentityEvent::OrganizationUpserted {
                external_id: "org_1".to_string(),
                name: "Acme".to_string(),
                created_by: Some("u1".to_string()),
            })
            .await
            .expect("org created");

        let user = store
            .find_user_by_sub_id("u1")
            .await
            .expect("find")
            .expect("present");
        let organization = store
            .find_organization_by_external_id("org_1")
            .await
            .expect("find")
            .expect("present");
        let membership = store
            .find_membership(user.id, organization.id)
            .await
            .expect("find")
            .expect("membership synthesized");
        assert_eq!(membership.role, MembershipRole::Owner);
    }

    #[tokio::test]
    async fn organization_created_with_unknown_creator_skips_membership() {
        let (reconciler, store) = reconciler();
        reconciler
            .apply(IdentityEvent::OrganizationUpserted {
                external_id: "org_1".to_string(),
                name: "Acme".to_string(),
                created_by: Some("u_unknown".to_string()),
            })
            .await
            .expect("org created despite unknown creator");
        assert!(store
            .find_organization_by_external_id("org_1")
            .await
            .expect("find")
            .is_some());
    }

    #[tokio::test]
    async fn organization_recreate_after_delete_revives() {
        let (reconciler, store) = reconciler();
        reconciler
            .apply(IdentityEvent::OrganizationUpserted {
                external_id: "org_1".to_string(),
                name: "Acme".to_string(),
                created_by: None,
            })
            .await
            .expect("create");
        reconciler
            .apply(IdentityEvent::OrganizationDeleted {
                external_id: "org_1".to_string(),
            })
            .await
            .expect("delete");
        reconciler
            .apply(IdentityEvent::OrganizationUpserted {
                external_id: "org_1".to_string(),
                name: "Acme Reborn".to_string(),
                created_by: None,
            })
            .await
            .expect("recreate");

        let organization = store
            .find_organization_by_external_id("org_1")
            .await
            .expect("find")
            .expect("active again");
        assert_eq!(organization.name, "Acme Reborn");
        assert!(organization.deleted_at.is_none());
    }

    #[tokio::test]
    async fn membership_delete_tolerates_missing_row() {
        let (reconciler, _store) = reconciler();
        reconciler
            .apply(user_upserted("u1", "Ada"))
            .await
            .expect("user sync");
        reconciler
            .apply(IdentityEvent::OrganizationUpserted {
                external_id: "org_1".to_string(),
                name: "Acme".to_string(),
                created_by: None,
            })
            .await
            .expect("org sync");
        // Both sides resolve but no membership row exists; still fine.
        reconciler
            .apply(IdentityEvent::MembershipDeleted {
                user_sub_id: "u1".to_string(),
                organization_external_id: "org_1".to_string(),
            })
            .await
            .expect("no membership row is fine");
    }

    #[tokio::test]
    async fn unhandled_events_are_acknowledged() {
        let (reconciler, _store) = reconciler();
        reconciler
            .apply(IdentityEvent::Unhandled {
                kind: "session.created".to_string(),
            })
            .await
            .expect("no-op");
    }
}
