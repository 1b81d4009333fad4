// src/pipeline/pipeline.rs

use crate::error::Result;
use crate::models::{Catalog, Config, DetailStats};
use crate::services::{AssetMirror, CatalogApi};
use crate::storage::{CatalogCache, LocalStorage};

use super::details::run_details;
use super::partition::{Partition, run_partition};

/// Switches for a full run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Rebuild the cache even when it is valid
    pub force_refresh: bool,
    /// Archive per-ship details after partitioning
    pub with_details: bool,
}

/// What a full run produced.
#[derive(Debug)]
pub struct PipelineReport {
    pub catalog_size: usize,
    pub partition: Partition,
    pub details: Option<DetailStats>,
}

/// Load the cache, rebuilding it when missing, malformed or forced.
pub async fn run_cache(config: &Config, api: &dyn CatalogApi, force: bool) -> Result<Catalog> {
    let cache = CatalogCache::new(&config.paths.cache_file);
    cache
        .load_or_rebuild(api, config.api.request_delay(), force)
        .await
}

/// Run the full pipeline: cache, partition and mirror, optionally details.
///
/// Without a mirror, tier files still name the image but nothing is downloaded.
pub async fn run_pipeline(
    config: &Config,
    api: &dyn CatalogApi,
    mirror: Option<&AssetMirror>,
    options: PipelineOptions,
) -> Result<PipelineReport> {
    let total_steps = if options.with_details { 3 } else { 2 };

    log::info!("Step 1/{}: Loading catalog cache...", total_steps);
    let catalog = run_cache(config, api, options.force_refresh).await?;

    log::info!("Step 2/{}: Building tier files and mirroring images...", total_steps);
    let partition = run_partition(config, &catalog, mirror).await?;

    let details = if options.with_details {
        log::info!("Step 3/{}: Archiving ship details...", total_steps);
        let storage = LocalStorage::new(&config.paths.tiers_dir);
        Some(
            run_details(
                api,
                &storage,
                &config.paths.details_dir,
                config.api.detail_delay(),
            )
            .await?,
        )
    } else {
        None
    };

    log::info!("Pipeline complete!");

    Ok(PipelineReport {
        catalog_size: catalog.len(),
        partition,
        details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeCatalogApi, FakeFetcher, page, record};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.api.application_id = "test".into();
        config.api.request_delay_ms = 0;
        config.api.ship_delay_ms = 0;
        config.api.detail_delay_ms = 0;
        config.paths.cache_file = dir.join("ships_cache.json");
        config.paths.tiers_dir = dir.join("tiers");
        config.paths.images_dir = dir.join("images");
        config.paths.details_dir = dir.join("ships_data");
        config.paths.stats_file = dir.join("run_stats.json");
        config
    }

    fn api() -> FakeCatalogApi {
        let mut api = FakeCatalogApi::with_pages(vec![
            page(2, vec![(
                "1",
                json!({"ship_id": 1, "name": "Hashidate", "tier": 1, "is_researchable": true,
                       "images": {"small": "https://cdn/1.png"}}),
            )]),
            page(2, vec![(
                "2",
                json!({"ship_id": 2, "name": "Atago", "tier": 8, "is_premium": true,
                       "price": {"gold": 12000}}),
            )]),
        ]);
        api.details.insert(
            "1".to_string(),
            record(json!({"ship_id": 1, "name": "Hashidate", "description": "..."})),
        );
        api
    }

    #[tokio::test]
    async fn test_full_run_then_rerun_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        let api = api();
        let fetcher = Arc::new(FakeFetcher::default());
        let mirror = AssetMirror::new(fetcher.clone(), &config.paths.images_dir);
        let options = PipelineOptions {
            force_refresh: false,
            with_details: true,
        };

        let report = run_pipeline(&config, &api, Some(&mirror), options)
            .await
            .unwrap();

        assert_eq!(report.catalog_size, 2);
        assert_eq!(report.partition.buckets.total(), 1);
        assert_eq!(report.details.unwrap().saved, 1);
        assert!(config.paths.images_dir.join("ship_1.png").exists());
        assert!(config.paths.details_dir.join("Hashidate.json").exists());
        assert_eq!(api.page_call_count(), 2);

        let again = run_pipeline(&config, &api, Some(&mirror), options)
            .await
            .unwrap();
        assert_eq!(again.partition.buckets, report.partition.buckets);
        assert_eq!(again.details.unwrap().skipped, 1);
        assert_eq!(api.page_call_count(), 2);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_error_aborts_run() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        let mut api = api();
        api.failing_pages = vec![1];

        let err = run_pipeline(&config, &api, None, PipelineOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::AppError::Remote { .. }));
        assert!(!config.paths.tiers_dir.exists());
    }
}
