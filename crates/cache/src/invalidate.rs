//! Bulk invalidation across both cache tiers.

use crate::keys::KeyPattern;
use crate::store::{DurableStore, EphemeralStore};

/// Coarse-grained eviction used when data changes and the exact key set
/// affected is not tracked: "all leads data", "all dashboard data".
///
/// Deletions are independent and idempotent; there is no ordering
/// guarantee between keys.
#[derive(Clone)]
pub struct Invalidator {
    durable: DurableStore,
    ephemeral: EphemeralStore,
}

impl Invalidator {
    pub fn new(durable: DurableStore, ephemeral: EphemeralStore) -> Self {
        Self { durable, ephemeral }
    }

    /// Delete every entry matching `pattern` in both stores; returns how
    /// many were removed.
    pub fn invalidate(&self, pattern: &KeyPattern) -> usize {
        let removed = self.durable.invalidate_matching(pattern)
            + self.ephemeral.invalidate_matching(pattern);
        if removed > 0 {
            tracing::debug!(
                namespace = pattern.namespace_str(),
                removed,
                "invalidated cache entries"
            );
        }
        removed
    }

    /// Delete every managed entry in both stores.
    pub fn clear_all(&self) -> usize {
        let removed = self.durable.clear_all() + self.ephemeral.clear_all();
        tracing::debug!(removed, "cleared all cache entries");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyCodec, Namespace};
    use crate::store::MemoryBackend;
    use safar_core::ManualClock;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn fixture() -> (Invalidator, DurableStore, EphemeralStore) {
        let clock = Arc::new(ManualClock::new(0));
        let durable = DurableStore::new(
            Arc::new(MemoryBackend::new()),
            KeyCodec::default(),
            clock.clone(),
            Duration::from_secs(600),
        );
        let ephemeral = EphemeralStore::new(
            Arc::new(MemoryBackend::new()),
            KeyCodec::default(),
            clock,
            Duration::from_secs(86_400),
        );
        (
            Invalidator::new(durable.clone(), ephemeral.clone()),
            durable,
            ephemeral,
        )
    }

    #[test]
    fn fragment_pattern_removes_exactly_the_matching_keys() {
        let (invalidator, durable, _) = fixture();
        let ns = Namespace::new("ns").unwrap();
        let codec = durable.codec().clone();

        durable.write(&codec.build(&ns, "a_1"), &json!(1), None);
        durable.write(&codec.build(&ns, "a_2"), &json!(2), None);
        durable.write(&codec.build(&ns, "b_1"), &json!(3), None);

        let removed = invalidator.invalidate(&KeyPattern::containing(ns.clone(), "a"));
        assert_eq!(removed, 2);
        assert_eq!(durable.read::<i64>(&codec.build(&ns, "a_1")), None);
        assert_eq!(durable.read::<i64>(&codec.build(&ns, "a_2")), None);
        assert_eq!(durable.read::<i64>(&codec.build(&ns, "b_1")), Some(3));
    }

    #[test]
    fn namespace_pattern_spans_both_stores() {
        let (invalidator, durable, ephemeral) = fixture();
        let dashboard = Namespace::new("dashboard").unwrap();
        let leads = Namespace::new("leads").unwrap();

        durable.write(&durable.codec().build(&dashboard, "stats"), &json!(1), None);
        ephemeral.write(
            &ephemeral.codec().build(&dashboard, "top_packages"),
            &json!([1]),
            None,
        );
        ephemeral.write(&ephemeral.codec().build(&leads, "all"), &json!([2]), None);

        let removed = invalidator.invalidate(&KeyPattern::namespace(dashboard));
        assert_eq!(removed, 2);
        assert_eq!(
            ephemeral.read::<serde_json::Value>(&ephemeral.codec().build(&leads, "all")),
            Some(json!([2]))
        );
    }

    #[test]
    fn invalidating_again_is_a_no_op() {
        let (invalidator, durable, _) = fixture();
        let ns = Namespace::new("leads").unwrap();
        durable.write(&durable.codec().build(&ns, "all"), &json!(1), None);

        assert_eq!(invalidator.invalidate(&KeyPattern::namespace(ns.clone())), 1);
        assert_eq!(invalidator.invalidate(&KeyPattern::namespace(ns)), 0);
    }

    #[test]
    fn clear_all_removes_only_managed_entries() {
        let (invalidator, durable, ephemeral) = fixture();
        let ns = Namespace::new("umrah").unwrap();
        durable.write(&durable.codec().build(&ns, "seasons"), &json!([1]), None);
        let token = ephemeral.session_id();

        assert_eq!(invalidator.clear_all(), 1);
        // The session token lives outside the managed prefix and survives.
        assert_eq!(ephemeral.session_id(), token);
    }
}
