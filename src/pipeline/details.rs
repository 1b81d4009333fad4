// src/pipeline/details.rs

//! Per-ship detail archive built from the tier files.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::error::Result;
use crate::models::{DetailStats, TIERS};
use crate::services::CatalogApi;
use crate::storage::{TierStorage, local};
use crate::utils::http::pace;
use crate::utils::url::sanitize_file_stem;

/// Extract `(name, ship_id)` pairs from one tier document.
///
/// Understands the summary array written by the partitioner and the older
/// `{"data": {id: {name, ship_id}}}` wrapper. Entries lacking either field
/// are ignored.
pub fn ships_in_tier(document: &Value) -> Vec<(String, String)> {
    let entries: Vec<&Value> = match document {
        Value::Array(items) => items.iter().collect(),
        Value::Object(root) => match root.get("data") {
            Some(Value::Object(data)) => data.values().collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.get("name")?.as_str().filter(|n| !n.is_empty())?;
            let ship_id = match entry.get("ship_id")? {
                Value::String(s) if !s.is_empty() => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            Some((name.to_string(), ship_id))
        })
        .collect()
}

/// Gather every listed ship across the ten tier files, keyed by name.
pub async fn collect_ships(storage: &dyn TierStorage) -> BTreeMap<String, String> {
    let mut ships = BTreeMap::new();

    for tier in TIERS {
        match storage.load_tier(tier).await {
            Ok(Some(document)) => ships.extend(ships_in_tier(&document)),
            Ok(None) => log::warn!("tier_{}.json not found; skipping", tier),
            Err(e) => log::warn!("tier_{}.json unreadable: {}; skipping", tier, e),
        }
    }

    ships
}

/// Fetch and store the detail record of each ship not yet archived.
///
/// A failed fetch is logged and counted; it does not stop the run.
pub async fn fetch_details(
    api: &dyn CatalogApi,
    ships: &BTreeMap<String, String>,
    details_dir: &Path,
    delay: Duration,
) -> Result<DetailStats> {
    let mut stats = DetailStats::default();
    tokio::fs::create_dir_all(details_dir).await?;

    for (name, ship_id) in ships {
        let path = details_dir.join(format!("{}.json", sanitize_file_stem(name)));

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            log::debug!("{} already archived; skipping", name);
            stats.skipped += 1;
            continue;
        }

        match api.fetch_detail(ship_id).await {
            Ok(record) => {
                local::write_json(&path, &record).await?;
                log::info!("Saved {}", path.display());
                stats.saved += 1;
                pace(delay).await;
            }
            Err(e) => {
                log::warn!("Failed to fetch {} ({}): {}", name, ship_id, e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Archive details for every ship in the tier files.
pub async fn run_details(
    api: &dyn CatalogApi,
    storage: &dyn TierStorage,
    details_dir: &Path,
    delay: Duration,
) -> Result<DetailStats> {
    log::info!("Reading ship list from tier files...");
    let ships = collect_ships(storage).await;
    log::info!("Found {} ships", ships.len());

    let stats = fetch_details(api, &ships, details_dir, delay).await?;
    log::info!(
        "Details: {} saved, {} already present, {} failed",
        stats.saved,
        stats.skipped,
        stats.failed
    );
    Ok(stats)
}
