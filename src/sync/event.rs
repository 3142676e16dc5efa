//! Provider lifecycle events.
//!
//! # Purpose
//! Maps the webhook envelope (`{"type": "...", "data": {...}}`) onto a typed
//! event the reconciler can apply. Create and update variants of the same
//! entity collapse into a single upsert event on purpose: the provider
//! redelivers and reorders, so both must mean "make it look like this".
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A single provider lifecycle event, already reduced to upsert/delete form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityEvent {
    UserUpserted {
        sub_id: String,
        name: String,
        avatar_url: String,
    },
    UserDeleted {
        sub_id: String,
    },
    OrganizationUpserted {
        external_id: String,
        name: String,
        /// Subject of the creating user; present only on creation events.
        /// Drives owner-membership synthesis.
        created_by: Option<String>,
    },
    OrganizationDeleted {
        external_id: String,
    },
    MembershipUpserted {
        user_sub_id: String,
        organization_external_id: String,
        role: String,
    },
    MembershipDeleted {
        user_sub_id: String,
        organization_external_id: String,
    },
    /// Anything we do not handle. Acknowledged as a no-op so the provider
    /// does not endlessly redeliver unsupported kinds.
    Unhandled {
        kind: String,
    },
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeletedObjectPayload {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OrganizationPayload {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MembershipPayload {
    #[serde(default)]
    role: Option<String>,
    organization: OrganizationRef,
    public_user_data: PublicUserData,
}

#[derive(Debug, Deserialize)]
struct OrganizationRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PublicUserData {
    user_id: String,
}

fn display_name(first: Option<String>, last: Option<String>) -> String {
    let first = first.unwrap_or_default();
    let last = last.unwrap_or_default();
    format!("{first} {last}").trim().to_string()
}

impl IdentityEvent {
    /// Parse one envelope. Unknown kinds succeed as [`IdentityEvent::Unhandled`];
    /// only a known kind with an undecodable payload is an error, because no
    /// amount of redelivery will fix a malformed body.
    pub fn from_envelope(kind: &str, data: &serde_json::Value) -> Result<Self, EventParseError> {
        let malformed = |source| EventParseError::MalformedPayload {
            kind: kind.to_string(),
            source,
        };
        match kind {
            "user.created" | "user.updated" => {
                let payload: UserPayload =
                    serde_json::from_value(data.clone()).map_err(malformed)?;
                Ok(IdentityEvent::UserUpserted {
                    sub_id: payload.id,
                    name: display_name(payload.first_name, payload.last_name),
                    avatar_url: payload.image_url.unwrap_or_default(),
                })
            }
            "user.deleted" => {
                let payload: DeletedObjectPayload =
                    serde_json::from_value(data.clone()).map_err(malformed)?;
                Ok(IdentityEvent::UserDeleted {
                    sub_id: payload.id,
                })
            }
            "organization.created" => {
                let payload: OrganizationPayload =
                    serde_json::from_value(data.clone()).map_err(malformed)?;
                Ok(IdentityEvent::OrganizationUpserted {
                    external_id: payload.id,
                    name: payload.name.unwrap_or_default(),
                    created_by: payload.created_by,
                })
            }
            "organization.updated" => {
                let payload: OrganizationPayload =
                    serde_json::from_value(data.clone()).map_err(malformed)?;
                // Updates never synthesize memberships, even if the provider
                // echoes created_by back.
                Ok(IdentityEvent::OrganizationUpserted {
                    external_id: payload.id,
                    name: payload.name.unwrap_or_default(),
                    created_by: None,
                })
            }
            "organization.deleted" => {
                let payload: DeletedObjectPayload =
                    serde_json::from_value(data.clone()).map_err(malformed)?;
                Ok(IdentityEvent::OrganizationDeleted {
                    external_id: payload.id,
                })
            }
            "organizationMembership.created" | "organizationMembership.updated" => {
                let payload: MembershipPayload =
                    serde_json::from_value(data.clone()).map_err(malformed)?;
                Ok(IdentityEvent::MembershipUpserted {
                    user_sub_id: payload.public_user_data.user_id,
                    organization_external_id: payload.organization.id,
                    role: payload.role.unwrap_or_default(),
                })
            }
            "organizationMembership.deleted" => {
                let payload: MembershipPayload =
                    serde_json::from_value(data.clone()).map_err(malformed)?;
                Ok(IdentityEvent::MembershipDeleted {
                    user_sub_id: payload.public_user_data.user_id,
                    organization_external_id: payload.organization.id,
                })
            }
            other => Ok(IdentityEvent::Unhandled {
                kind: other.to_string(),
            }),
        }
    }
}
