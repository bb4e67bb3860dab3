//! Scan-based cache statistics.

use serde::Serialize;

/// Point-in-time picture of one store's managed entries.
///
/// Computed by a full prefixed scan, so it is a debugging aid rather than
/// a hot-path counter. Corrupted entries count as expired; the next sweep
/// will take them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub valid_entries: u64,
    pub expired_entries: u64,
    pub total_size_bytes: u64,
}

impl CacheStats {
    /// Combine statistics from both tiers.
    pub fn merged(self, other: CacheStats) -> CacheStats {
        CacheStats {
            total_entries: self.total_entries + other.total_entries,
            valid_entries: self.valid_entries + other.valid_entries,
            expired_entries: self.expired_entries + other.expired_entries,
            total_size_bytes: self.total_size_bytes + other.total_size_bytes,
        }
    }
}
