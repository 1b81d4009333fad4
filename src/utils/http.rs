// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::ApiConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Sleep for `delay` unless it is zero.
pub async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
