// src/pipeline/partition.rs

//! Tier partitioning: catalog in, ten tier files and an image mirror out.

use std::time::Duration;

use crate::error::Result;
use crate::models::{Catalog, CatalogRecord, Config, PartitionStats, ShipSummary, TierBuckets};
use crate::services::{AssetMirror, MirrorOutcome, is_eligible, resolve_image_url};
use crate::storage::{LocalStorage, TierStorage, local};
use crate::utils::http::pace;
use crate::utils::url::image_file_name;

/// Buckets plus the counters collected while filling them.
#[derive(Debug, Clone)]
pub struct Partition {
    pub buckets: TierBuckets,
    pub stats: PartitionStats,
}

/// Project a record onto its summary, without image fields.
pub fn summarize(id: &str, record: &CatalogRecord, tier: u8) -> ShipSummary {
    ShipSummary {
        ship_id: record.ship_id().unwrap_or_else(|| id.to_string()),
        name: record.name(),
        tier,
        ship_type: record.ship_type(),
        image_url: None,
        image: None,
    }
}

/// Sort every in-scope record into its tier bucket.
///
/// Records without a usable tier in 1..=10, or that are not eligible, are
/// skipped. With a mirror, each resolved image is copied locally; a failed
/// copy drops the image fields but keeps the ship. `delay` follows every
/// ship whose image step used the network.
pub async fn partition(
    catalog: &Catalog,
    mirror: Option<&AssetMirror>,
    delay: Duration,
) -> Partition {
    let mut buckets = TierBuckets::new();
    let mut stats = PartitionStats::started();

    for (id, record) in catalog.iter() {
        stats.records_seen += 1;

        let Some(tier) = record.tier().and_then(TierBuckets::accepts) else {
            stats.skipped_tier += 1;
            continue;
        };
        if !is_eligible(record) {
            stats.skipped_ineligible += 1;
            continue;
        }

        let mut summary = summarize(id, record, tier);

        match resolve_image_url(record) {
            Some(url) => {
                let file_name = image_file_name(&summary.ship_id, &url);

                if let Some(mirror) = mirror {
                    let outcome = mirror.mirror(&url, &mirror.path_for(&file_name)).await;
                    match outcome {
                        MirrorOutcome::Downloaded(_) => stats.images_downloaded += 1,
                        MirrorOutcome::AlreadyPresent => stats.images_present += 1,
                        MirrorOutcome::Failed => stats.images_failed += 1,
                    }

                    if outcome.is_available() {
                        summary.image_url = Some(url);
                        summary.image = Some(file_name);
                    }
                    if outcome.touched_network() {
                        pace(delay).await;
                    }
                } else {
                    summary.image_url = Some(url);
                    summary.image = Some(file_name);
                }
            }
            None => stats.images_unresolved += 1,
        }

        buckets.push(summary);
        stats.included += 1;
    }

    stats.finish();
    Partition { buckets, stats }
}

/// Partition the catalog, then persist tier files and run statistics.
pub async fn run_partition(
    config: &Config,
    catalog: &Catalog,
    mirror: Option<&AssetMirror>,
) -> Result<Partition> {
    log::info!("Classifying {} ships by tier...", catalog.len());

    let result = partition(catalog, mirror, config.api.ship_delay()).await;

    let storage = LocalStorage::new(&config.paths.tiers_dir);
    let written = storage.write_tiers(&result.buckets).await?;
    local::write_json(&config.paths.stats_file, &result.stats).await?;

    let stats = &result.stats;
    log::info!(
        "Wrote {} tier files with {} ships ({} skipped for tier, {} ineligible)",
        written.files_written,
        written.ship_count,
        stats.skipped_tier,
        stats.skipped_ineligible
    );
    log::info!(
        "Images: {} downloaded, {} already present, {} failed, {} without URL",
        stats.images_downloaded,
        stats.images_present,
        stats.images_failed,
        stats.images_unresolved
    );
    if stats.images_failed > 0 {
        log::warn!(
            "{} ships were written without an image; re-run to retry",
            stats.images_failed
        );
    }

    Ok(result)
}
