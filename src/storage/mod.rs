//! Storage abstractions for catalog persistence.
//!
//! ## Files
//!
//! ```text
//! ships_cache.json          # Full catalog snapshot, id -> record
//! run_stats.json            # Counters of the last partition run
//! tiers/
//! ├── tier_1.json           # ShipSummary arrays, one per tier
//! └── tier_10.json
//! images/
//! └── ship_{id}.{ext}       # Mirrored images, never overwritten
//! ships_data/
//! └── {name}.json           # Per-ship detail records
//! ```

pub mod cache;
pub mod local;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::TierBuckets;

// Re-export for convenience
pub use cache::{CacheState, CatalogCache};
pub use local::LocalStorage;

/// Metadata about a tier write operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierWriteSummary {
    /// Number of tier files written (always ten)
    pub files_written: usize,
    /// Ships across all files
    pub ship_count: usize,
}

/// Trait for tier file backends.
#[async_trait]
pub trait TierStorage: Send + Sync {
    /// Persist every bucket, empty ones included.
    async fn write_tiers(&self, buckets: &TierBuckets) -> Result<TierWriteSummary>;

    /// Raw contents of one tier file, `None` when absent.
    async fn load_tier(&self, tier: u8) -> Result<Option<Value>>;
}
