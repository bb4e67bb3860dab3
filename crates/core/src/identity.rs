//! Authenticated principal types and the identity boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a sales branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(String);

impl BranchId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role attached to an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Sees unscoped, company-wide data.
    ///
    /// Accounts without an explicit role in their auth metadata resolve to
    /// this, matching how the upstream auth service provisions admins.
    #[default]
    SuperAdmin,
    /// Sees data scoped to the branch they belong to.
    BranchStaff,
}

/// An authenticated user as seen by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Source of the currently authenticated principal.
///
/// Implemented by the auth layer. `None` means no session is active yet;
/// callers that need identity (cache warming, scoped queries) skip their
/// work rather than guess.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current(&self) -> Option<Principal>;
}

/// Fixed identity, for tests and local tooling.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Option<Principal>);

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn current(&self) -> Option<Principal> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_role_defaults_to_super_admin() {
        assert_eq!(Role::default(), Role::SuperAdmin);
    }

    #[tokio::test]
    async fn static_identity_returns_configured_principal() {
        let principal = Principal::new(UserId::new("u-1"), Role::BranchStaff);
        let provider = StaticIdentity(Some(principal.clone()));
        assert_eq!(provider.current().await, Some(principal));

        let anonymous = StaticIdentity(None);
        assert_eq!(anonymous.current().await, None);
    }
}
