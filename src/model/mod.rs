//! Domain data model module.
//!
//! # Purpose
//! Re-exports the identity records synced from the external provider and the
//! wish/tweet resources served by the API.
mod identity;
mod tweet;
mod wish;

pub use identity::{Membership, MembershipRole, Organization, User, UserProfile};
pub use tweet::Tweet;
pub use wish::Wish;
