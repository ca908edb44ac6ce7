//! Stake Drift Audit
//!
//! Offline reconciliation job: for each block at which a compound or
//! batch-unlock event occurred, fetch the historical chain state at that
//! block and its predecessor, difference the nomination-pool points against
//! the staking-ledger stake and the reference pooled total, and report the
//! drift between the bookkeeping systems.

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stake_drift_audit::{
    chain::{ChainClient, RecordedStateClient},
    data,
    models::{Config, ReferenceRecord},
    recon,
    scrapers::SubscanClient,
    selector,
    snapshot::SnapshotReader,
};

/// Pooled-points vs staking-ledger drift reconciliation over historical blocks.
#[derive(Parser, Debug)]
#[command(name = "stake-drift-audit")]
#[command(about = "Reconcile nomination-pool points against staking-ledger stake at historical blocks")]
struct Cli {
    /// Analytics JSON file with the reference series (overrides ANALYTICS_PATH)
    #[arg(long)]
    analytics: Option<String>,

    /// Compound-event dataset (overrides COMPOUNDS_PATH)
    #[arg(long)]
    compounds: Option<String>,

    /// Batch-unlock event dataset (overrides BATCH_UNLOCKS_PATH)
    #[arg(long)]
    batch_unlocks: Option<String>,

    /// Recorded chain-state fixture (overrides STATE_FIXTURE_PATH)
    #[arg(long)]
    fixture: Option<String>,

    /// Resolve block hashes from the fixture only, never over HTTP
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(path) = cli.analytics {
        config.analytics_path = path;
    }
    if let Some(path) = cli.compounds {
        config.compounds_path = Some(path);
    }
    if let Some(path) = cli.batch_unlocks {
        config.batch_unlocks_path = Some(path);
    }
    if let Some(path) = cli.fixture {
        config.state_fixture_path = path;
    }

    let reference = data::load_reference_series(&config.analytics_path)?;

    let mut sources: Vec<Vec<u64>> = Vec::new();
    if let Some(path) = &config.compounds_path {
        sources.push(data::load_event_blocks(path)?);
    }
    if let Some(path) = &config.batch_unlocks_path {
        sources.push(data::load_event_blocks(path)?);
    }
    if sources.is_empty() {
        bail!("no event datasets configured; set COMPOUNDS_PATH and/or BATCH_UNLOCKS_PATH");
    }

    let slices: Vec<&[u64]> = sources.iter().map(|s| s.as_slice()).collect();
    let targets = selector::target_block_set(&slices);
    let indexes = selector::select_indexes(&targets, &reference);
    info!(
        targets = targets.len(),
        fetches = indexes.len(),
        "selected reference-series positions"
    );

    let chain = RecordedStateClient::from_file(&config.state_fixture_path)?;
    let subscan = SubscanClient::new(&config.subscan_endpoint, config.subscan_api_key.clone())
        .context("failed to build block-hash resolver")?;

    let outcome = run_audit(&chain, &subscan, &config, &reference, &targets, &indexes, cli.offline).await;

    // Release the chain handle on the normal and the error path alike.
    if let Err(e) = chain.disconnect().await {
        warn!(error = %e, "chain disconnect failed");
    }

    outcome
}

async fn run_audit(
    chain: &RecordedStateClient,
    subscan: &SubscanClient,
    config: &Config,
    reference: &[ReferenceRecord],
    targets: &[u64],
    indexes: &[usize],
    offline: bool,
) -> Result<()> {
    let reader = SnapshotReader::new(chain, &config.pool_ids, &config.pool_stash_accounts);

    let mut snapshots = Vec::with_capacity(indexes.len());
    for &index in indexes {
        let record = &reference[index];
        info!(block = record.block, index, "looking up block hash");

        let state_id = match chain.block_hash(record.block) {
            Some(hash) => Some(hash.to_string()),
            None if offline => None,
            None => subscan.resolve_block_hash(record.block).await,
        };

        let snapshot = reader
            .read_snapshot(index, record.block, state_id, record.total_pooled.clone())
            .await?;
        snapshots.push(snapshot);
    }

    let ledger_rows = recon::ledger_reconciliation(&snapshots, targets, &config.pool_ids);
    let pooled_rows = recon::pooled_total_reconciliation(&snapshots, targets, &config.pool_ids);

    println!(
        "stake-drift-audit run at {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();
    println!(
        "{}",
        recon::render_snapshot_overview(&snapshots, &config.pool_ids)
    );
    println!(
        "{}",
        recon::render_delta_report(
            "Ledger Reconciliation (bonded - increase)",
            &ledger_rows,
            &config.pool_ids
        )
    );
    println!(
        "{}",
        recon::render_delta_report(
            "Pooled Total Reconciliation (totalPooled - increase)",
            &pooled_rows,
            &config.pool_ids
        )
    );

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stake_drift_audit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
