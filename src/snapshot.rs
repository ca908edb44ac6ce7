//! Historical Snapshot Reader
//!
//! Queries every tracked quantity (pool points by pool id, ledger
//! total/active by stash account) at one resolved historical state and
//! merges the results into a [`SnapshotRecord`].
//!
//! Failure policy, per quantity and by design: a pool or account with no
//! record at a given height had no stake yet and contributes zero. An
//! unresolved or unavailable state degrades the whole snapshot to zeros so
//! delta arithmetic stays total. Each degradation is logged so an operator
//! can tell "truly zero" from "unresolvable" during audit. Malformed amount
//! strings are the one fatal case: they abort the run instead of poisoning
//! the numbers.

use anyhow::{Context, Result};
use num_bigint::BigInt;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::amount::parse_amount;
use crate::chain::{ChainClient, StateSnapshot};
use crate::models::{PoolId, PoolQuantities, SnapshotRecord};

pub struct SnapshotReader<'a> {
    chain: &'a dyn ChainClient,
    pool_ids: &'a [PoolId],
    stash_accounts: &'a BTreeMap<PoolId, String>,
}

impl<'a> SnapshotReader<'a> {
    pub fn new(
        chain: &'a dyn ChainClient,
        pool_ids: &'a [PoolId],
        stash_accounts: &'a BTreeMap<PoolId, String>,
    ) -> Self {
        Self {
            chain,
            pool_ids,
            stash_accounts,
        }
    }

    /// Read all tracked quantities at one reference-series position.
    pub async fn read_snapshot(
        &self,
        index: usize,
        block: u64,
        state_id: Option<String>,
        total_pooled: BigInt,
    ) -> Result<SnapshotRecord> {
        let snapshot = match &state_id {
            Some(id) => match self.chain.at(id).await {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(block, state_id = %id, error = %e, "historical state unavailable, quantities default to zero");
                    None
                }
            },
            None => {
                warn!(block, "block hash unresolved, quantities default to zero");
                None
            }
        };

        let mut pools = BTreeMap::new();
        for &pool_id in self.pool_ids {
            let quantities = match &snapshot {
                Some(snapshot) => self.read_pool(snapshot.as_ref(), block, pool_id).await?,
                None => PoolQuantities::default(),
            };
            pools.insert(pool_id, quantities);
        }

        info!(block, index, resolved = snapshot.is_some(), "snapshot read");
        Ok(SnapshotRecord {
            index,
            block,
            state_id,
            pools,
            total_pooled,
        })
    }

    async fn read_pool(
        &self,
        snapshot: &dyn StateSnapshot,
        block: u64,
        pool_id: PoolId,
    ) -> Result<PoolQuantities> {
        let points = match snapshot.pool_points(pool_id).await {
            Ok(Some(raw)) => parse_amount(&raw)
                .with_context(|| format!("pool {} points at block {}", pool_id, block))?,
            Ok(None) => {
                debug!(block, pool_id, "pool has no record at this height, points = 0");
                BigInt::from(0u32)
            }
            Err(e) => {
                warn!(block, pool_id, error = %e, "pool points query failed, points = 0");
                BigInt::from(0u32)
            }
        };

        let (ledger_total, ledger_active) = match self.stash_accounts.get(&pool_id) {
            Some(account) => match snapshot.staking_ledger(account).await {
                Ok(Some(ledger)) => {
                    let total = parse_amount(&ledger.total)
                        .with_context(|| format!("ledger total for {} at block {}", account, block))?;
                    let active = parse_amount(&ledger.active)
                        .with_context(|| format!("ledger active for {} at block {}", account, block))?;
                    (total, active)
                }
                Ok(None) => {
                    debug!(block, pool_id, account = %account, "no staking ledger at this height, stake = 0");
                    (BigInt::from(0u32), BigInt::from(0u32))
                }
                Err(e) => {
                    warn!(block, pool_id, account = %account, error = %e, "ledger query failed, stake = 0");
                    (BigInt::from(0u32), BigInt::from(0u32))
                }
            },
            None => {
                debug!(block, pool_id, "no stash account configured, stake = 0");
                (BigInt::from(0u32), BigInt::from(0u32))
            }
        };

        Ok(PoolQuantities {
            points,
            ledger_total,
            ledger_active,
        })
    }
}
