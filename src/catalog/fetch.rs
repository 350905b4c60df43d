//! One-shot catalog retrieval from models.dev.
//!
//! Retrieval never fails the command: any transport, status or parse problem
//! is logged and degrades to an empty catalog.

use std::time::{Duration, Instant};

use reqwest::Client;

use super::{Catalog, CatalogError};
use crate::config::CatalogConfig;

/// Build the HTTP client used for the catalog request.
pub fn build_http_client(config: &CatalogConfig) -> Result<Client, CatalogError> {
    Client::builder()
        .user_agent(concat!("aidex/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(CatalogError::Transport)
}

/// Fetch and normalize the catalog, returning an empty catalog on any failure.
pub async fn fetch_catalog(client: &Client, config: &CatalogConfig) -> Catalog {
    let start = Instant::now();

    match try_fetch_catalog(client, config).await {
        Ok(catalog) => {
            tracing::debug!(
                model_count = catalog.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                api_url = %config.api_url,
                "Model catalog loaded"
            );
            catalog
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                api_url = %config.api_url,
                "Model catalog unavailable, continuing with an empty catalog"
            );
            Catalog::new()
        }
    }
}

/// Fetch and normalize the catalog, surfacing the failure reason.
pub async fn try_fetch_catalog(
    client: &Client,
    config: &CatalogConfig,
) -> Result<Catalog, CatalogError> {
    let response = client
        .get(&config.api_url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    Catalog::from_json(&body)
}
