//! Chain State Query Boundary
//!
//! The audit never talks to a live node directly; it consumes historical
//! state through this trait pair: a connection handle that opens read-only
//! snapshots at a given state identifier, and per-snapshot queries for the
//! two bookkeeping subsystems (nomination-pool points, staking ledger).
//!
//! Query results are the chain's human-readable records: decimal strings
//! with thousands separators, parsed downstream by the amount codec.
//! `Ok(None)` means the pool/account has no record at that height; the
//! caller's zero-default policy applies, not an error.

pub mod recorded;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::PoolId;

pub use recorded::RecordedStateClient;

/// A staking-ledger record for one account: total locked and currently
/// active stake, as human-readable amount strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub total: String,
    pub active: String,
}

/// Read-only view of on-chain storage as of one specific past block.
#[async_trait]
pub trait StateSnapshot: Send + Sync {
    /// Points balance of a nomination pool, `None` if the pool did not
    /// exist at this height.
    async fn pool_points(&self, pool_id: PoolId) -> Result<Option<String>>;

    /// Staking ledger of an account, `None` if the account had no ledger
    /// at this height.
    async fn staking_ledger(&self, account: &str) -> Result<Option<LedgerRecord>>;
}

/// Handle to the chain's historical-state mechanism.
///
/// Acquired once at startup and released once via [`ChainClient::disconnect`]
/// on both the normal and the error path.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Open a snapshot at the given state identifier.
    async fn at(&self, state_id: &str) -> Result<Arc<dyn StateSnapshot>>;

    /// Release the connection.
    async fn disconnect(&self) -> Result<()>;
}
