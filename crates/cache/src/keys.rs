//! Cache key composition and the structured invalidation matcher.
//!
//! Every key this subsystem writes is `<prefix><namespace>_<identifier>`.
//! The fixed prefix lets bulk scans tell our entries apart from anything
//! else living in the same physical storage; the namespace/identifier
//! split is what invalidation and the per-store index operate on.

use crate::errors::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed application-level marker on every managed key.
pub const KEY_PREFIX: &str = "safar_cache_";

/// Separator between namespace and identifier.
const SEPARATOR: char = '_';

/// A fully composed cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated key namespace.
///
/// Namespaces may not contain the separator; identifiers may, which keeps
/// `build` injective and `parse` its exact inverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if namespace.is_empty() {
            return Err(CacheError::InvalidNamespace {
                namespace,
                reason: "namespace must not be empty",
            });
        }
        if namespace.contains(SEPARATOR) {
            return Err(CacheError::InvalidNamespace {
                namespace,
                reason: "namespace must not contain `_`",
            });
        }
        Ok(Self(namespace))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds and parses managed cache keys.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    prefix: String,
}

impl KeyCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Compose a key. Pure; distinct `(namespace, identifier)` pairs always
    /// produce distinct keys.
    pub fn build(&self, namespace: &Namespace, identifier: &str) -> CacheKey {
        CacheKey(format!(
            "{}{}{}{}",
            self.prefix,
            namespace.as_str(),
            SEPARATOR,
            identifier
        ))
    }

    /// Split a raw storage key back into `(namespace, identifier)`.
    ///
    /// Returns `None` for keys outside our prefix, which is how scans skip
    /// unrelated entries sharing the physical store.
    pub fn parse<'a>(&self, raw: &'a str) -> Option<(&'a str, &'a str)> {
        let rest = raw.strip_prefix(self.prefix.as_str())?;
        let split = rest.find(SEPARATOR)?;
        let (namespace, identifier) = rest.split_at(split);
        Some((namespace, &identifier[1..]))
    }

    pub fn is_managed(&self, raw: &str) -> bool {
        raw.starts_with(self.prefix.as_str())
    }
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new(KEY_PREFIX)
    }
}

/// Structured matcher for bulk invalidation.
///
/// Matches a whole namespace, or the subset of its identifiers containing
/// a fragment. This replaces substring scans over raw keys while keeping
/// the same observable behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    namespace: Namespace,
    fragment: Option<String>,
}

impl KeyPattern {
    /// Match every key in `namespace`.
    pub fn namespace(namespace: Namespace) -> Self {
        Self {
            namespace,
            fragment: None,
        }
    }

    /// Match keys in `namespace` whose identifier contains `fragment`.
    pub fn containing(namespace: Namespace, fragment: impl Into<String>) -> Self {
        Self {
            namespace,
            fragment: Some(fragment.into()),
        }
    }

    pub fn namespace_str(&self) -> &str {
        self.namespace.as_str()
    }

    pub fn matches(&self, namespace: &str, identifier: &str) -> bool {
        if namespace != self.namespace.as_str() {
            return false;
        }
        match &self.fragment {
            Some(fragment) => identifier.contains(fragment.as_str()),
            None => true,
        }
    }
}
