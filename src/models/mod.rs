// src/models/mod.rs

//! Domain models for the catalog fetcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod summary;

// Re-export all public types
pub use config::{ApiConfig, Config, PLACEHOLDER_APPLICATION_ID, PathsConfig};
pub use record::{Catalog, CatalogRecord, ID_KEY, is_truthy};
pub use summary::{PartitionStats, ShipSummary, TIERS, TierBuckets};

/// One page of the listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct CatalogPage {
    pub records: Vec<(String, CatalogRecord)>,
    pub page_total: u32,
}

/// Result of the detail archive step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailStats {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}
