// src/services/client.rs

//! Encyclopedia API client.
//!
//! Wraps the two calls the pipeline needs: one page of the ship listing and
//! the detail record of a single ship. No retries happen here.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, CatalogPage, CatalogRecord};
use crate::utils::http;

/// Path of the ships encyclopedia endpoint below the regional host.
pub const SHIPS_ENDPOINT: &str = "/wows/encyclopedia/ships/";

/// Source of catalog records.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch one page of the listing (pages start at 1).
    async fn list_page(&self, page: u32) -> Result<CatalogPage>;

    /// Fetch the full record of a single ship.
    async fn fetch_detail(&self, ship_id: &str) -> Result<CatalogRecord>;
}

/// reqwest-backed client for the encyclopedia API.
pub struct CatalogClient {
    client: Client,
    endpoint: Url,
    application_id: String,
    language: String,
    fields: Vec<String>,
}

impl CatalogClient {
    /// Create a client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = http::create_client(config)?;
        Self::with_client(client, config)
    }

    /// Create a client around an existing HTTP client.
    pub fn with_client(client: Client, config: &ApiConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim_end_matches('/'))?;
        let endpoint = base.join(SHIPS_ENDPOINT)?;

        Ok(Self {
            client,
            endpoint,
            application_id: config.application_id.clone(),
            language: config.language.clone(),
            fields: config.fields.clone(),
        })
    }

    /// Listing URL for a page.
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_query();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page_no", &page.to_string());
            if !self.fields.is_empty() {
                query.append_pair("fields", &self.fields.join(","));
            }
        }
        url
    }

    /// Detail URL for a ship.
    pub fn detail_url(&self, ship_id: &str) -> Url {
        let mut url = self.base_query();
        url.query_pairs_mut().append_pair("ship_id", ship_id);
        url
    }

    fn base_query(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("application_id", &self.application_id)
            .append_pair("language", &self.language);
        url
    }

    async fn get_json(&self, url: Url) -> Result<Value> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_page(&self, page: u32) -> Result<CatalogPage> {
        log::debug!("Requesting ship listing page {}", page);
        let payload = self.get_json(self.page_url(page)).await?;
        parse_page(payload, page)
    }

    async fn fetch_detail(&self, ship_id: &str) -> Result<CatalogRecord> {
        log::debug!("Requesting ship detail {}", ship_id);
        let payload = self.get_json(self.detail_url(ship_id)).await?;
        parse_detail(payload, ship_id)
    }
}

/// Unwrap the `{status, data, meta}` envelope, failing on non-"ok" status.
fn check_status(payload: &Value, context: &str) -> Result<()> {
    match payload.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(()),
        _ => {
            let message = payload
                .get("error")
                .map(describe_remote_error)
                .unwrap_or_else(|| payload.to_string());
            Err(AppError::remote(context, message))
        }
    }
}

fn describe_remote_error(error: &Value) -> String {
    let message = error.get("message").and_then(Value::as_str);
    let code = error.get("code").map(Value::to_string);
    let field = error.get("field").and_then(Value::as_str);

    match (message, code, field) {
        (Some(m), Some(c), Some(f)) => format!("{m} (code {c}, field {f})"),
        (Some(m), Some(c), None) => format!("{m} (code {c})"),
        (Some(m), None, _) => m.to_string(),
        _ => error.to_string(),
    }
}

/// Parse a listing response.
pub fn parse_page(payload: Value, page: u32) -> Result<CatalogPage> {
    let context = format!("ship listing page {page}");
    check_status(&payload, &context)?;

    let page_total = payload
        .pointer("/meta/page_total")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(1);

    let records = match payload.get("data") {
        Some(Value::Object(data)) => data
            .iter()
            .filter_map(|(id, value)| match CatalogRecord::from_value(value.clone()) {
                Some(record) => Some((id.clone(), record)),
                None => {
                    log::debug!("Skipping non-object record {} on page {}", id, page);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(CatalogPage {
        records,
        page_total,
    })
}

/// Parse a detail response (`data` keyed by the requested id).
pub fn parse_detail(payload: Value, ship_id: &str) -> Result<CatalogRecord> {
    let context = format!("ship {ship_id}");
    check_status(&payload, &context)?;

    payload
        .get("data")
        .and_then(|data| data.get(ship_id))
        .cloned()
        .and_then(CatalogRecord::from_value)
        .ok_or_else(|| AppError::remote(context, "no record returned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{local_client, serve};
    use serde_json::json;

    fn client() -> CatalogClient {
        let config = ApiConfig {
            application_id: "demo".to_string(),
            language: "en".to_string(),
            base_url: "https://api.example.test/".to_string(),
            ..ApiConfig::default()
        };
        CatalogClient::with_client(Client::new(), &config).unwrap()
    }

    #[test]
    fn test_page_url_carries_credentials_and_page() {
        let url = client().page_url(3);
        assert_eq!(url.path(), "/wows/encyclopedia/ships/");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("application_id".into(), "demo".into()),
                ("language".into(), "en".into()),
                ("page_no".into(), "3".into()),
            ]
        );
    }

    #[test]
    fn test_page_url_with_fields() {
        let config = ApiConfig {
            application_id: "demo".to_string(),
            fields: vec!["name".into(), "tier".into()],
            ..ApiConfig::default()
        };
        let client = CatalogClient::with_client(Client::new(), &config).unwrap();
        let url = client.page_url(1);
        assert!(url.query_pairs().any(|(k, v)| k == "fields" && v == "name,tier"));
    }

    #[test]
    fn test_detail_url() {
        let url = client().detail_url("4179605488");
        assert!(url.query_pairs().any(|(k, v)| k == "ship_id" && v == "4179605488"));
    }

    #[test]
    fn test_parse_page() {
        let payload = json!({
            "status": "ok",
            "meta": {"count": 2, "page_total": 4, "page": 1},
            "data": {
                "1": {"ship_id": 1, "name": "Hashidate"},
                "2": null,
                "3": {"ship_id": 3, "name": "Chikuma"}
            }
        });

        let page = parse_page(payload, 1).unwrap();
        assert_eq!(page.page_total, 4);
        let ids: Vec<_> = page.records.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_parse_page_without_meta_defaults_to_single_page() {
        let page = parse_page(json!({"status": "ok", "data": {}}), 1).unwrap();
        assert_eq!(page.page_total, 1);
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_parse_page_error_status() {
        let payload = json!({
            "status": "error",
            "error": {"code": 407, "message": "INVALID_APPLICATION_ID", "field": "application_id"}
        });

        match parse_page(payload, 2) {
            Err(AppError::Remote { context, message }) => {
                assert_eq!(context, "ship listing page 2");
                assert!(message.contains("INVALID_APPLICATION_ID"));
                assert!(message.contains("407"));
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_detail() {
        let payload = json!({
            "status": "ok",
            "data": {"3751786480": {"ship_id": 3751786480u64, "name": "Shimakaze"}}
        });
        let record = parse_detail(payload, "3751786480").unwrap();
        assert_eq!(record.name(), Some("Shimakaze".into()));
    }

    #[tokio::test]
    async fn test_list_page_http_error_is_transport() {
        let config = ApiConfig {
            application_id: "demo".to_string(),
            base_url: serve(500, "upstream down").await,
            ..ApiConfig::default()
        };
        let client = CatalogClient::with_client(local_client(), &config).unwrap();

        match client.list_page(1).await {
            Err(AppError::Transport(e)) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_page_over_http() {
        let config = ApiConfig {
            application_id: "demo".to_string(),
            base_url: serve(
                200,
                r#"{"status":"ok","meta":{"page_total":2},"data":{"5":{"ship_id":5,"tier":2}}}"#,
            )
            .await,
            ..ApiConfig::default()
        };
        let client = CatalogClient::with_client(local_client(), &config).unwrap();

        let page = client.list_page(1).await.unwrap();
        assert_eq!(page.page_total, 2);
        assert_eq!(page.records[0].1.tier(), Some(2));
    }

    #[test]
    fn test_parse_detail_null_record() {
        let payload = json!({"status": "ok", "data": {"42": null}});
        assert!(matches!(
            parse_detail(payload, "42"),
            Err(AppError::Remote { .. })
        ));
    }
}
