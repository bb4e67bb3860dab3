//! Resolution of the data scope a principal may see.

use crate::fetchers::DashboardFetchers;
use safar_core::{BranchId, Principal, Role};
use serde::{Deserialize, Serialize};

/// Which slice of data a query should cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataScope {
    /// Company-wide, unscoped data.
    Global,
    /// Data restricted to one branch.
    Branch(BranchId),
}

/// Resolve the scope for `principal`.
///
/// Branch staff whose branch lookup fails or comes back empty fall back
/// to the global scope rather than an empty dashboard.
pub async fn resolve_scope(principal: &Principal, fetchers: &dyn DashboardFetchers) -> DataScope {
    match principal.role {
        Role::SuperAdmin => DataScope::Global,
        Role::BranchStaff => match fetchers.branch_for_user(&principal.user_id).await {
            Ok(Some(branch)) => DataScope::Branch(branch),
            Ok(None) => {
                tracing::debug!(user = %principal.user_id, "no branch on record; using global scope");
                DataScope::Global
            }
            Err(error) => {
                tracing::warn!(user = %principal.user_id, %error, "branch lookup failed; using global scope");
                DataScope::Global
            }
        },
    }
}
