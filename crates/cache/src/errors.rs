//! Error types for the cache subsystem.
//!
//! Very little here ever reaches a caller: corrupted entries and quota
//! failures are recovered locally and reported through [`WriteOutcome`]
//! rather than raised. The variants below cover the few constructor-time
//! and backend-boundary failures that need a real error type.
//!
//! [`WriteOutcome`]: crate::store::WriteOutcome

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Errors raised at the edges of the cache subsystem.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A namespace that would break key round-tripping.
    #[error("invalid namespace `{namespace}`: {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: &'static str,
    },

    /// The backing store refused a write for lack of space.
    #[error("storage quota exceeded while writing `{key}`")]
    QuotaExceeded { key: String },

    /// A payload that could not be serialized for storage.
    #[error("failed to serialize payload for `{key}`")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}
