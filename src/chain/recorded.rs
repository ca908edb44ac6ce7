//! Recorded Chain State
//!
//! Offline implementation of the chain boundary: replays state captured into
//! a JSON fixture instead of querying a live node. This is what makes the
//! audit a pure offline job: the fixture is recorded once and every rerun
//! is hermetic and reproducible.
//!
//! Fixture shape:
//!
//! ```json
//! {
//!   "block_hashes": { "69558413": "0x6d72..." },
//!   "states": {
//!     "0x6d72...": {
//!       "pools": { "167": "10,522,124,629,456,843" },
//!       "ledgers": { "5Ctw...": { "total": "1,000", "active": "900" } }
//!     }
//!   }
//! }
//! ```
//!
//! `block_hashes` is optional; when present it lets a run resolve block
//! hashes without the block-explorer lookup.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::chain::{ChainClient, LedgerRecord, StateSnapshot};
use crate::models::PoolId;

/// Everything captured at one state identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedState {
    /// Pool id → points balance (human-readable string).
    #[serde(default)]
    pub pools: BTreeMap<PoolId, String>,
    /// Account address → staking ledger.
    #[serde(default)]
    pub ledgers: BTreeMap<String, LedgerRecord>,
}

/// On-disk fixture format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordedFixture {
    #[serde(default)]
    pub block_hashes: BTreeMap<u64, String>,
    #[serde(default)]
    pub states: BTreeMap<String, RecordedState>,
}

/// Chain client backed by a recorded fixture.
pub struct RecordedStateClient {
    fixture: RecordedFixture,
}

impl RecordedStateClient {
    pub fn new(fixture: RecordedFixture) -> Self {
        Self { fixture }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state fixture: {:?}", path))?;
        let fixture: RecordedFixture = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse state fixture: {:?}", path))?;
        debug!(
            states = fixture.states.len(),
            block_hashes = fixture.block_hashes.len(),
            "loaded recorded state fixture"
        );
        Ok(Self { fixture })
    }

    /// Locally recorded hash for a block, if the capture included one.
    pub fn block_hash(&self, block: u64) -> Option<&str> {
        self.fixture.block_hashes.get(&block).map(String::as_str)
    }

    pub fn state_ids(&self) -> impl Iterator<Item = &str> {
        self.fixture.states.keys().map(String::as_str)
    }

    pub fn fixture(&self) -> &RecordedFixture {
        &self.fixture
    }
}

struct RecordedSnapshot {
    state: RecordedState,
}

#[async_trait]
impl StateSnapshot for RecordedSnapshot {
    async fn pool_points(&self, pool_id: PoolId) -> Result<Option<String>> {
        Ok(self.state.pools.get(&pool_id).cloned())
    }

    async fn staking_ledger(&self, account: &str) -> Result<Option<LedgerRecord>> {
        Ok(self.state.ledgers.get(account).cloned())
    }
}

#[async_trait]
impl ChainClient for RecordedStateClient {
    async fn at(&self, state_id: &str) -> Result<Arc<dyn StateSnapshot>> {
        let state = self
            .fixture
            .states
            .get(state_id)
            .cloned()
            .with_context(|| format!("no recorded state for {}", state_id))?;
        Ok(Arc::new(RecordedSnapshot { state }))
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "block_hashes": { "100": "0xaaa", "200": "0xbbb" },
        "states": {
            "0xaaa": {
                "pools": { "167": "300", "168": "200" },
                "ledgers": { "5Alice": { "total": "1,000", "active": "900" } }
            },
            "0xbbb": {
                "pools": { "167": "450", "168": "250" }
            }
        }
    }"#;

    fn client() -> RecordedStateClient {
        RecordedStateClient::new(serde_json::from_str(FIXTURE).unwrap())
    }

    #[tokio::test]
    async fn test_pool_points_lookup() {
        let client = client();
        let snap = client.at("0xaaa").await.unwrap();
        assert_eq!(snap.pool_points(167).await.unwrap().as_deref(), Some("300"));
        assert_eq!(snap.pool_points(169).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_staking_ledger_lookup() {
        let client = client();
        let snap = client.at("0xaaa").await.unwrap();
        let ledger = snap.staking_ledger("5Alice").await.unwrap().unwrap();
        assert_eq!(ledger.total, "1,000");
        assert_eq!(ledger.active, "900");
        assert!(snap.staking_ledger("5Bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_ledgers_section_defaults_empty() {
        let client = client();
        let snap = client.at("0xbbb").await.unwrap();
        assert!(snap.staking_ledger("5Alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_state_is_an_error() {
        let client = client();
        assert!(client.at("0xdead").await.is_err());
    }

    #[test]
    fn test_block_hash_lookup() {
        let client = client();
        assert_eq!(client.block_hash(100), Some("0xaaa"));
        assert_eq!(client.block_hash(999), None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let client = RecordedStateClient::from_file(&path).unwrap();
        assert_eq!(client.state_ids().count(), 2);
    }

    #[test]
    fn test_from_file_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(RecordedStateClient::from_file(&path).is_err());
    }
}
