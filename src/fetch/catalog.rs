// src/fetch/catalog.rs

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::catalog::CatalogSource;
use crate::table::TableSnapshot;

/// Body of an ERDDAP `index.json` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErddapResponse {
    pub table: ErddapTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErddapTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// GET `url` and decode the catalog table. Transport errors, non-2xx
/// statuses and malformed bodies all come back as `Err`.
pub async fn fetch_catalog(client: &Client, url: &Url) -> Result<ErddapResponse> {
    debug!(%url, "fetching catalog");
    client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .json::<ErddapResponse>()
        .await
        .with_context(|| format!("Decoding catalog JSON from {}", url))
}

/// Fetch and normalize one snapshot.
pub async fn load_snapshot(client: &Client, source: &CatalogSource) -> Result<TableSnapshot> {
    let resp = fetch_catalog(client, &source.url).await?;
    TableSnapshot::new(resp.table.column_names, resp.table.rows)
        .with_context(|| format!("Building {} snapshot", source.catalog))
}

/// Single failure boundary for acquisition: every error is logged and
/// collapses into `None`.
#[instrument(level = "info", skip(client, source), fields(catalog = %source.catalog))]
pub async fn acquire_snapshot(client: &Client, source: &CatalogSource) -> Option<TableSnapshot> {
    match load_snapshot(client, source).await {
        Ok(snapshot) => {
            info!(
                rows = snapshot.rows().len(),
                columns = snapshot.columns().len(),
                "catalog pulled"
            );
            Some(snapshot)
        }
        Err(e) => {
            let cause = format!("{:#}", e);
            error!(url = %source.url, error = %cause, "Error fetching ERDDAP data");
            None
        }
    }
}
