// src/services/assets.rs

//! Ship image resolution and mirroring.
//!
//! Images are mirrored once: a file already on disk is never fetched or
//! overwritten again. A failed download never aborts the caller.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::CatalogRecord;

/// Variant keys of the nested `images` mapping, most preferred first.
const IMAGE_VARIANT_KEYS: &[&str] = &["large", "big", "small", "preview", "contour_icon"];

/// Flat single-URL fields.
const FLAT_IMAGE_KEYS: &[&str] = &["image", "picture", "preview"];

/// Alternately named flat fields, checked last.
const ALTERNATE_IMAGE_KEYS: &[&str] = &["image_small", "image_large", "icon", "contour_image"];

/// Find the best image URL a record offers.
pub fn resolve_image_url(record: &CatalogRecord) -> Option<String> {
    if let Some(Value::Object(images)) = record.get("images") {
        let preferred = IMAGE_VARIANT_KEYS
            .iter()
            .filter_map(|key| images.get(*key))
            .filter_map(Value::as_str)
            .find(|url| !url.is_empty());
        if let Some(url) = preferred {
            return Some(url.to_string());
        }

        if let Some(url) = images.values().filter_map(Value::as_str).find(|u| looks_like_url(u)) {
            return Some(url.to_string());
        }
    }

    FLAT_IMAGE_KEYS
        .iter()
        .chain(ALTERNATE_IMAGE_KEYS)
        .filter_map(|key| record.get(key))
        .filter_map(Value::as_str)
        .find(|url| looks_like_url(url))
        .map(str::to_string)
}

fn looks_like_url(value: &str) -> bool {
    value.starts_with("http")
}

/// Downloads a remote asset into a local file.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Stream `url` into `dest`, returning the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Streams image bodies with reqwest.
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn stream_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut response = self.client.get(url).send().await?.error_for_status()?;
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.stream_to_file(url, dest)
            .await
            .map_err(|e| AppError::asset_fetch(url, e))
    }
}

/// What happened to one mirrored asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The file already existed; no network call was made.
    AlreadyPresent,
    /// The file was downloaded (byte count).
    Downloaded(u64),
    /// The download failed; nothing was written.
    Failed,
}

impl MirrorOutcome {
    /// Whether the local file can be referenced.
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    /// Whether the network was used.
    pub fn touched_network(&self) -> bool {
        !matches!(self, Self::AlreadyPresent)
    }
}

/// Idempotent local copy of remote images.
#[derive(Clone)]
pub struct AssetMirror {
    fetcher: Arc<dyn AssetFetcher>,
    images_dir: PathBuf,
}

impl AssetMirror {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            images_dir: images_dir.into(),
        }
    }

    /// Mirror backed by reqwest.
    pub fn http(client: Client, images_dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(HttpAssetFetcher::new(client)), images_dir)
    }

    /// Full path of an image file name.
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.images_dir.join(file_name)
    }

    /// Copy `url` to `out_path` unless the file already exists.
    ///
    /// The body is written to a sibling `.part` file and renamed on success,
    /// so an interrupted download never leaves a file that later runs would
    /// mistake for a finished one.
    pub async fn mirror(&self, url: &str, out_path: &Path) -> MirrorOutcome {
        if tokio::fs::try_exists(out_path).await.unwrap_or(false) {
            log::debug!("Image already present: {}", out_path.display());
            return MirrorOutcome::AlreadyPresent;
        }

        match self.fetch_into(url, out_path).await {
            Ok(bytes) => {
                log::info!("Downloaded {} ({} bytes)", out_path.display(), bytes);
                MirrorOutcome::Downloaded(bytes)
            }
            Err(e) => {
                let level = if e.is_recoverable() {
                    log::Level::Warn
                } else {
                    log::Level::Error
                };
                log::log!(level, "Image download failed: {} -> {}", url, e);
                MirrorOutcome::Failed
            }
        }
    }

    async fn fetch_into(&self, url: &str, out_path: &Path) -> Result<u64> {
        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = partial_path(out_path);
        match self.fetcher.download(url, &tmp).await {
            Ok(bytes) => {
                tokio::fs::rename(&tmp, out_path).await?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&tmp).await;
                Err(e)
            }
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
