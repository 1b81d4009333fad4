//! Service layer for the catalog fetcher.
//!
//! This module contains the business logic for:
//! - Encyclopedia API access (`CatalogClient`)
//! - Eligibility classification (`is_eligible`)
//! - Image resolution and mirroring (`AssetMirror`)

mod assets;
mod classifier;
mod client;

pub use assets::{AssetFetcher, AssetMirror, HttpAssetFetcher, MirrorOutcome, resolve_image_url};
pub use classifier::is_eligible;
pub use client::{CatalogApi, CatalogClient, SHIPS_ENDPOINT, parse_detail, parse_page};
