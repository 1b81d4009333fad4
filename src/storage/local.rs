//! Local filesystem storage.
//!
//! ## Storage Layout
//!
//! ```text
//! {tiers_dir}/
//! ├── tier_1.json           # ShipSummary array, always written
//! ├── ...
//! └── tier_10.json
//! ```
//!
//! All writes go to a temporary sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{TIERS, TierBuckets};
use crate::storage::{TierStorage, TierWriteSummary};

/// Write bytes atomically (write to temp, then rename).
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

/// Write indented JSON; non-ASCII text is kept literal.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, &bytes).await
}

/// Read bytes, returning None if the file doesn't exist.
pub async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Read JSON data, returning None if the file doesn't exist.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match read_bytes(path).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Tier files on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Key of a tier file.
    pub fn tier_key(tier: u8) -> String {
        format!("tier_{}.json", tier)
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }
}

#[async_trait]
impl TierStorage for LocalStorage {
    async fn write_tiers(&self, buckets: &TierBuckets) -> Result<TierWriteSummary> {
        let mut summary = TierWriteSummary::default();

        for (tier, ships) in buckets.iter() {
            let path = self.path(&Self::tier_key(tier));
            write_json(&path, ships).await?;
            log::info!("Saved {} ({} ships)", path.display(), ships.len());

            summary.files_written += 1;
            summary.ship_count += ships.len();
        }

        Ok(summary)
    }

    async fn load_tier(&self, tier: u8) -> Result<Option<Value>> {
        if !TIERS.contains(&tier) {
            return Err(AppError::validation(format!("tier {tier} is out of range")));
        }
        read_json(&self.path(&Self::tier_key(tier))).await
    }
}
