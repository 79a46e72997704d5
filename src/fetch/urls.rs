// src/fetch/urls.rs
use url::Url;

use crate::error::Result;
use crate::fetch::metadata::SnapshotId;

/// Row limit used by [`crate::EnigmaClient::dataset`] when the caller has no preference.
pub const DEFAULT_ROW_LIMIT: u32 = 100;

/// Metadata only; resolving a snapshot needs no rows.
pub const SNAPSHOT_ROW_LIMIT: u32 = 1;

/// `{base}datasets/{dataset_id}?&row_limit={n}`
pub fn dataset_url(base: &Url, dataset_id: &str, row_limit: u32) -> Result<Url> {
    let mut url = base.join("datasets/")?.join(&escape_segment(dataset_id))?;
    // The API has always been called with a leading `&`; keep the exact query shape.
    url.set_query(Some(&format!("&row_limit={}", row_limit)));
    Ok(url)
}

/// `{base}export/{snapshot_id}`
pub fn export_url(base: &Url, snapshot_id: &SnapshotId) -> Result<Url> {
    Ok(base
        .join("export/")?
        .join(&escape_segment(snapshot_id.as_str()))?)
}

// Identifiers are opaque; keep them inside a single path segment.
fn escape_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
