// src/fetch/mod.rs

use bytes::Bytes;
use reqwest::{blocking::Client, header::HeaderMap};
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::config::EnigmaConfig;
use crate::error::{FetchError, Result};
use crate::parse::{parse_csv, ParseOptions, Table};

pub mod metadata;
pub mod urls;

pub use metadata::{DatasetId, DatasetMetadata, SnapshotId, SnapshotRef};
pub use urls::{DEFAULT_ROW_LIMIT, SNAPSHOT_ROW_LIMIT};

/// Blocking client for the Enigma public API.
///
/// Every call is independent: `export` re-resolves the snapshot each time, so
/// two exports of the same dataset can land on different snapshots if the
/// dataset is republished in between.
#[derive(Debug, Clone)]
pub struct EnigmaClient {
    http: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl EnigmaClient {
    /// Client sending `authorization: Bearer {key}` from `config`.
    pub fn new(config: &EnigmaConfig) -> Result<Self> {
        let headers = config.default_headers()?;
        Self::with_headers(config, headers)
    }

    /// Client sending `headers` instead of the config's bearer token.
    pub fn with_headers(config: &EnigmaConfig, headers: HeaderMap) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                FetchError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url().clone(),
            headers,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Dataset metadata plus up to `row_limit` rows.
    #[instrument(level = "debug", skip(self))]
    pub fn dataset(&self, dataset_id: &str, row_limit: u32) -> Result<DatasetMetadata> {
        let url = urls::dataset_url(&self.base_url, dataset_id, row_limit)?;
        let body = self.get_bytes(&url)?;
        DatasetMetadata::from_slice(&body)
    }

    /// Id of the dataset's current snapshot.
    #[instrument(level = "debug", skip(self))]
    pub fn snapshot_id(&self, dataset_id: &str) -> Result<SnapshotId> {
        self.dataset(dataset_id, SNAPSHOT_ROW_LIMIT)?
            .current_snapshot_id(dataset_id)
    }

    /// Raw CSV export of one snapshot. Failures are logged here and returned.
    #[instrument(level = "debug", skip(self, snapshot_id), fields(snapshot = %snapshot_id))]
    pub fn retrieve(&self, snapshot_id: &SnapshotId) -> Result<Bytes> {
        let url = urls::export_url(&self.base_url, snapshot_id)?;
        info!(%url, "making request to API");
        let start = Instant::now();

        match self.get_bytes(&url) {
            Ok(body) => {
                info!(bytes = body.len(), elapsed = ?start.elapsed(), "response received");
                Ok(body)
            }
            Err(e) => {
                error!(%url, error = %e, "export request failed");
                Err(e)
            }
        }
    }

    /// Resolve the current snapshot, download its export, and parse it.
    #[instrument(level = "info", skip(self, options))]
    pub fn export(&self, dataset_id: &str, options: &ParseOptions) -> Result<Table> {
        let snapshot_id = self.snapshot_id(dataset_id)?;
        info!(snapshot = %snapshot_id, "retrieved snapshot ID");

        let body = self.retrieve(&snapshot_id)?;
        let table = parse_csv(&body, options)?;
        info!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            "finished export"
        );
        Ok(table)
    }

    fn get_bytes(&self, url: &Url) -> Result<Bytes> {
        debug!(%url, "GET");
        self.http
            .get(url.clone())
            .headers(self.headers.clone())
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(|e| FetchError::transport(url.as_str(), e))
    }
}

