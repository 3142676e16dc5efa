//! Identity synchronization.
//!
//! # Purpose
//! Parses provider webhook payloads into [`IdentityEvent`]s and converges
//! local user/organization/membership state through the [`Reconciler`].
mod event;
mod reconciler;

pub use event::{EventParseError, IdentityEvent};
pub use reconciler::Reconciler;
