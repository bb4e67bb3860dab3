//! Core domain types and host abstractions for the safar data layer.
//!
//! This crate holds the pieces every other crate agrees on:
//!
//! - **`identity`**: the authenticated principal, role, and branch types,
//!   plus the `IdentityProvider` boundary to the auth layer.
//! - **`time`**: the injected `Clock` used for every TTL decision, with a
//!   manually driven implementation for tests.
//! - **`lifecycle`**: start/foreground signals from the hosting shell,
//!   abstracted so background maintenance can be tested without a real
//!   host environment.

pub mod identity;
pub mod lifecycle;
pub mod time;

pub use self::{
    identity::{BranchId, IdentityProvider, Principal, Role, StaticIdentity, UserId},
    lifecycle::{LifecycleEvent, LifecycleEvents, LifecycleSource},
    time::{Clock, ManualClock, SystemClock},
};
