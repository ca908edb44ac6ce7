//! Static Input Datasets
//!
//! Loaders for the two kinds of pre-captured input: the analytics reference
//! series (ground-truth totalPooled per block) and event datasets (compound /
//! batch-unlock records) whose block numbers form the target set.
//!
//! Reference amounts are parsed at load time so malformed data fails the run
//! immediately rather than mid-reconciliation.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::amount::parse_amount;
use crate::models::ReferenceRecord;

/// Top-level shape of the analytics export: `{ "data": { "analytics": [...] } }`.
#[derive(Debug, Deserialize)]
struct AnalyticsFile {
    data: AnalyticsData,
}

#[derive(Debug, Deserialize)]
struct AnalyticsData {
    analytics: Vec<AnalyticsRow>,
}

#[derive(Debug, Deserialize)]
struct AnalyticsRow {
    block: u64,
    #[serde(rename = "totalPooled")]
    total_pooled: String,
}

/// An event record; only the block number matters here, all other fields of
/// the source dataset are ignored.
#[derive(Debug, Deserialize)]
struct EventRow {
    block: u64,
}

/// Load the reference series from an analytics JSON export.
pub fn load_reference_series(path: impl AsRef<Path>) -> Result<Vec<ReferenceRecord>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read analytics file: {:?}", path))?;
    let file: AnalyticsFile = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse analytics file: {:?}", path))?;

    let mut series = Vec::with_capacity(file.data.analytics.len());
    for row in file.data.analytics {
        let total_pooled = parse_amount(&row.total_pooled)
            .with_context(|| format!("bad totalPooled at block {}", row.block))?;
        series.push(ReferenceRecord {
            block: row.block,
            total_pooled,
        });
    }

    info!(records = series.len(), path = ?path, "loaded reference series");
    Ok(series)
}

/// Load the block numbers of an event dataset (a JSON array of records
/// carrying a `block` field).
pub fn load_event_blocks(path: impl AsRef<Path>) -> Result<Vec<u64>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read event dataset: {:?}", path))?;
    let rows: Vec<EventRow> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event dataset: {:?}", path))?;

    info!(events = rows.len(), path = ?path, "loaded event dataset");
    Ok(rows.into_iter().map(|r| r.block).collect())
}
