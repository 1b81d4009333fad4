// src/storage/cache.rs

//! Catalog cache: the full ship listing persisted as one JSON object.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Catalog, CatalogRecord};
use crate::services::CatalogApi;
use crate::storage::local;
use crate::utils::http::pace;

/// Outcome of reading the cache file.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheState {
    /// No cache file on disk.
    Missing,
    /// Structurally sound cache.
    Valid(Catalog),
    /// Cache exists but cannot be trusted; the reason is kept for logging.
    Invalid(String),
}

impl CacheState {
    /// Convert to a catalog, turning the two failure branches into errors.
    pub fn into_catalog(self) -> Result<Catalog> {
        match self {
            Self::Valid(catalog) => Ok(catalog),
            Self::Invalid(reason) => Err(AppError::malformed_cache(reason)),
            Self::Missing => Err(AppError::config("catalog cache not found")),
        }
    }
}

/// Check the shape of a parsed cache document.
///
/// Accepted: a non-empty object whose every value is an object carrying
/// `ship_id`.
pub fn validate(document: Value) -> CacheState {
    let Value::Object(entries) = document else {
        return CacheState::Invalid("top level is not an object".to_string());
    };
    if entries.is_empty() {
        return CacheState::Invalid("cache is empty".to_string());
    }

    let mut catalog = Catalog::new();
    for (id, value) in entries {
        let Some(record) = CatalogRecord::from_value(value) else {
            return CacheState::Invalid(format!("entry {id} is not an object"));
        };
        if !record.has_ship_id() {
            return CacheState::Invalid(format!("entry {id} has no ship_id"));
        }
        catalog.insert(id, record);
    }

    CacheState::Valid(catalog)
}

/// Page through the listing from page 1 and merge every record.
///
/// Stops once the current page reaches the reported page total. `delay` is
/// slept between page requests, not after the last one. Any page failure
/// aborts the rebuild.
pub async fn rebuild(api: &dyn CatalogApi, delay: Duration) -> Result<Catalog> {
    log::info!("Fetching the full ship listing from the API...");
    let mut catalog = Catalog::new();
    let mut page = 1u32;

    loop {
        let listing = api.list_page(page).await?;
        let page_total = listing.page_total.max(1);
        catalog.merge(listing.records);

        log::info!(
            "Fetched page {}/{} (collected {} ships so far)",
            page,
            page_total,
            catalog.len()
        );

        if page >= page_total {
            break;
        }
        page += 1;
        pace(delay).await;
    }

    Ok(catalog)
}

/// On-disk catalog snapshot.
#[derive(Debug, Clone)]
pub struct CatalogCache {
    path: PathBuf,
}

impl CatalogCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate the cache file.
    pub async fn load(&self) -> Result<CacheState> {
        let Some(bytes) = local::read_bytes(&self.path).await? else {
            return Ok(CacheState::Missing);
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(document) => Ok(validate(document)),
            Err(e) => Ok(CacheState::Invalid(format!("not valid JSON: {e}"))),
        }
    }

    /// Persist the catalog as indented JSON.
    pub async fn save(&self, catalog: &Catalog) -> Result<()> {
        local::write_json(&self.path, catalog).await?;
        log::info!(
            "Saved catalog cache: {} ({} ships)",
            self.path.display(),
            catalog.len()
        );
        Ok(())
    }

    /// Use the cache when it is valid, otherwise rebuild and save it.
    pub async fn load_or_rebuild(
        &self,
        api: &dyn CatalogApi,
        delay: Duration,
        force: bool,
    ) -> Result<Catalog> {
        if !force {
            match self.load().await? {
                CacheState::Valid(catalog) => {
                    log::info!(
                        "Loaded catalog cache {} ({} ships)",
                        self.path.display(),
                        catalog.len()
                    );
                    return Ok(catalog);
                }
                CacheState::Invalid(reason) => {
                    log::warn!("{}; rebuilding", AppError::malformed_cache(reason));
                }
                CacheState::Missing => {
                    log::info!("No catalog cache at {}", self.path.display());
                }
            }
        }

        let catalog = rebuild(api, delay).await?;
        self.save(&catalog).await?;
        Ok(catalog)
    }
}
