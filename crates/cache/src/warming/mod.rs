//! Proactive cache population.
//!
//! Once identity is known, a fixed catalog of dashboard entries is
//! pre-fetched into the session-scoped store so first paint serves from
//! cache. Entries warm concurrently and individual failures never abort
//! the batch.

mod types;
mod warmer;

pub use types::{BoxError, WarmEntry, WarmOutcome, WarmPolicy, WarmReport};
pub use warmer::CacheWarmer;
