//! Fakes shared by unit tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::error::{AppError, Result};
use crate::models::{CatalogPage, CatalogRecord};
use crate::services::{AssetFetcher, CatalogApi};

pub fn record(value: Value) -> CatalogRecord {
    CatalogRecord::from(value)
}

/// Build a listing page from `(id, record)` pairs.
pub fn page(page_total: u32, records: Vec<(&str, Value)>) -> CatalogPage {
    CatalogPage {
        records: records
            .into_iter()
            .map(|(id, value)| (id.to_string(), record(value)))
            .collect(),
        page_total,
    }
}

/// In-memory encyclopedia recording every call.
#[derive(Default)]
pub struct FakeCatalogApi {
    pub pages: Vec<CatalogPage>,
    pub details: HashMap<String, CatalogRecord>,
    /// Pages that answer with a remote error
    pub failing_pages: Vec<u32>,
    pub page_calls: Mutex<Vec<(u32, Instant)>>,
    pub detail_calls: Mutex<Vec<String>>,
}

impl FakeCatalogApi {
    pub fn with_pages(pages: Vec<CatalogPage>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    pub fn with_details(details: Vec<(&str, Value)>) -> Self {
        Self {
            details: details
                .into_iter()
                .map(|(id, value)| (id.to_string(), record(value)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn page_call_count(&self) -> usize {
        self.page_calls.lock().unwrap().len()
    }

    pub fn detail_call_ids(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogApi for FakeCatalogApi {
    async fn list_page(&self, page: u32) -> Result<CatalogPage> {
        self.page_calls.lock().unwrap().push((page, Instant::now()));
        if self.failing_pages.contains(&page) {
            return Err(AppError::remote(format!("ship listing page {page}"), "REQUEST_LIMIT_EXCEEDED"));
        }
        let index = usize::try_from(page).unwrap() - 1;
        self.pages
            .get(index)
            .cloned()
            .ok_or_else(|| AppError::remote(format!("ship listing page {page}"), "PAGE_NO_NOT_FOUND"))
    }

    async fn fetch_detail(&self, ship_id: &str) -> Result<CatalogRecord> {
        self.detail_calls.lock().unwrap().push(ship_id.to_string());
        self.details
            .get(ship_id)
            .cloned()
            .ok_or_else(|| AppError::remote(format!("ship {ship_id}"), "no record returned"))
    }
}

/// Writes a fixed body and counts calls; URLs containing "broken" fail.
#[derive(Default)]
pub struct FakeFetcher {
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for FakeFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("broken") {
            return Err(AppError::asset_fetch(url, "HTTP status server error (503)"));
        }
        tokio::fs::write(dest, b"IMG").await?;
        Ok(3)
    }
}

/// Answer every connection with a fixed status and body.
///
/// Returns the base URL of the listener.
pub async fn serve(status: u16, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{addr}")
}

/// HTTP client that ignores proxy settings from the environment.
pub fn local_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
