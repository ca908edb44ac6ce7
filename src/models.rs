use anyhow::{bail, Context, Result};
use num_bigint::BigInt;
use num_traits::Zero;
use std::collections::BTreeMap;

/// Nomination pool identifier.
pub type PoolId = u32;

/// One entry of the pre-captured analytics series: externally supplied ground
/// truth for the total value under pool management at a given block.
///
/// Block numbers increase monotonically across the series but are not
/// necessarily contiguous.
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    pub block: u64,
    pub total_pooled: BigInt,
}

/// Per-pool quantities read from one historical state snapshot.
///
/// All values are non-negative; a pool or ledger with no record at that
/// height contributes zero (absence means nothing was staked yet).
#[derive(Debug, Clone, Default)]
pub struct PoolQuantities {
    /// Points balance of the nomination pool (internal accounting unit).
    pub points: BigInt,
    /// Staking-ledger total locked stake of the pool's stash account.
    pub ledger_total: BigInt,
    /// Staking-ledger currently-active (earning) stake.
    pub ledger_active: BigInt,
}

impl PoolQuantities {
    /// Locked-but-not-active stake, derived after the independent queries.
    pub fn ledger_inactive(&self) -> BigInt {
        &self.ledger_total - &self.ledger_active
    }
}

/// All quantities captured at one resolved reference-series position.
///
/// Appended in fetch order; later correlated by block number via linear scan
/// (the set is tens of records, fetched once per run).
#[derive(Debug, Clone)]
pub struct SnapshotRecord {
    /// Position in the reference series this snapshot was fetched for.
    pub index: usize,
    pub block: u64,
    /// Historical state identifier; `None` means hash resolution failed and
    /// every quantity below degraded to zero.
    pub state_id: Option<String>,
    pub pools: BTreeMap<PoolId, PoolQuantities>,
    /// Ground-truth total carried over from the reference series.
    pub total_pooled: BigInt,
}

impl SnapshotRecord {
    /// Points for one pool, zero if the pool is not tracked in this record.
    pub fn points(&self, pool: PoolId) -> BigInt {
        self.pools
            .get(&pool)
            .map(|q| q.points.clone())
            .unwrap_or_else(BigInt::zero)
    }

    /// Active ledger stake for one pool, zero if untracked.
    pub fn ledger_active(&self, pool: PoolId) -> BigInt {
        self.pools
            .get(&pool)
            .map(|q| q.ledger_active.clone())
            .unwrap_or_else(BigInt::zero)
    }

    /// Total ledger stake for one pool, zero if untracked.
    pub fn ledger_total(&self, pool: PoolId) -> BigInt {
        self.pools
            .get(&pool)
            .map(|q| q.ledger_total.clone())
            .unwrap_or_else(BigInt::zero)
    }

    /// Grand total of points across all tracked pools.
    pub fn points_total(&self) -> BigInt {
        self.pools
            .values()
            .fold(BigInt::zero(), |acc, q| acc + &q.points)
    }

    /// Grand total of active ledger stake across all tracked pools.
    pub fn ledger_active_total(&self) -> BigInt {
        self.pools
            .values()
            .fold(BigInt::zero(), |acc, q| acc + &q.ledger_active)
    }

    /// Signed disagreement between the points books and the reference total.
    pub fn drift(&self) -> BigInt {
        self.points_total() - &self.total_pooled
    }
}

/// Application configuration.
///
/// The pool id set, stash accounts, endpoint and credential are deployment
/// facts, supplied at startup instead of living in the code.
#[derive(Debug, Clone)]
pub struct Config {
    /// Block-explorer endpoint for block-number → block-hash lookups.
    pub subscan_endpoint: String,
    pub subscan_api_key: Option<String>,
    /// Pools under audit.
    pub pool_ids: Vec<PoolId>,
    /// Stash account whose staking ledger backs each pool. Pools without an
    /// entry simply report zero ledger stake.
    pub pool_stash_accounts: BTreeMap<PoolId, String>,
    /// Analytics JSON file holding the reference series.
    pub analytics_path: String,
    /// Event datasets whose block numbers form the target set.
    pub compounds_path: Option<String>,
    pub batch_unlocks_path: Option<String>,
    /// Recorded chain-state fixture replayed by the chain client.
    pub state_fixture_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let subscan_endpoint = std::env::var("SUBSCAN_ENDPOINT").unwrap_or_else(|_| {
            "https://alephzero-testnet.api.subscan.io/api/scan/block".to_string()
        });

        let subscan_api_key = std::env::var("SUBSCAN_API_KEY").ok();

        let pool_ids = parse_pool_ids(
            &std::env::var("POOL_IDS").unwrap_or_else(|_| "167,168,169".to_string()),
        )?;

        let pool_stash_accounts = parse_pool_accounts(
            &std::env::var("POOL_STASH_ACCOUNTS").unwrap_or_default(),
        )?;

        let analytics_path =
            std::env::var("ANALYTICS_PATH").unwrap_or_else(|_| "./Analytics.json".to_string());

        let compounds_path = std::env::var("COMPOUNDS_PATH").ok();
        let batch_unlocks_path = std::env::var("BATCH_UNLOCKS_PATH").ok();

        let state_fixture_path = std::env::var("STATE_FIXTURE_PATH")
            .unwrap_or_else(|_| "./recorded_state.json".to_string());

        Ok(Self {
            subscan_endpoint,
            subscan_api_key,
            pool_ids,
            pool_stash_accounts,
            analytics_path,
            compounds_path,
            batch_unlocks_path,
            state_fixture_path,
        })
    }
}

/// Parse a `"167,168,169"` pool id list.
pub fn parse_pool_ids(raw: &str) -> Result<Vec<PoolId>> {
    let mut ids = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let id = part
            .parse::<PoolId>()
            .with_context(|| format!("invalid pool id: {:?}", part))?;
        ids.push(id);
    }
    if ids.is_empty() {
        bail!("pool id list is empty");
    }
    Ok(ids)
}

/// Parse a `"167=5Abc...,168=5Def..."` pool → stash account map.
pub fn parse_pool_accounts(raw: &str) -> Result<BTreeMap<PoolId, String>> {
    let mut accounts = BTreeMap::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (pool, account) = part
            .split_once('=')
            .with_context(|| format!("expected POOL=ACCOUNT, got {:?}", part))?;
        let pool = pool
            .trim()
            .parse::<PoolId>()
            .with_context(|| format!("invalid pool id in mapping: {:?}", part))?;
        let account = account.trim();
        if account.is_empty() {
            bail!("empty stash account for pool {}", pool);
        }
        accounts.insert(pool, account.to_string());
    }
    Ok(accounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pool_ids() {
        assert_eq!(parse_pool_ids("167,168,169").unwrap(), vec![167, 168, 169]);
        assert_eq!(parse_pool_ids(" 167 , 168 ").unwrap(), vec![167, 168]);
        assert!(parse_pool_ids("").is_err());
        assert!(parse_pool_ids("167,abc").is_err());
    }

    #[test]
    fn test_parse_pool_accounts() {
        let map = parse_pool_accounts("167=5Alice,168=5Bob").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map[&167], "5Alice");
        assert_eq!(map[&168], "5Bob");
    }

    #[test]
    fn test_parse_pool_accounts_empty_is_ok() {
        assert!(parse_pool_accounts("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_pool_accounts_rejects_malformed() {
        assert!(parse_pool_accounts("167").is_err());
        assert!(parse_pool_accounts("x=5Alice").is_err());
        assert!(parse_pool_accounts("167=").is_err());
    }

    #[test]
    fn test_snapshot_record_zero_defaults() {
        let record = SnapshotRecord {
            index: 0,
            block: 100,
            state_id: None,
            pools: BTreeMap::new(),
            total_pooled: BigInt::from(0u32),
        };
        assert_eq!(record.points(167), BigInt::from(0u32));
        assert_eq!(record.ledger_active(167), BigInt::from(0u32));
        assert_eq!(record.points_total(), BigInt::from(0u32));
        assert_eq!(record.ledger_active_total(), BigInt::from(0u32));
        assert_eq!(record.drift(), BigInt::from(0u32));
    }

    #[test]
    fn test_ledger_inactive_is_total_minus_active() {
        let q = PoolQuantities {
            points: BigInt::from(0u32),
            ledger_total: BigInt::from(1000u32),
            ledger_active: BigInt::from(900u32),
        };
        assert_eq!(q.ledger_inactive(), BigInt::from(100u32));
    }
}
