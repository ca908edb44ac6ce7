//! Fixture Inspection Tool
//!
//! CLI tool to verify that a recorded chain-state fixture actually contains
//! the states an audit run will need, and to spot bad amount strings before
//! they abort a run.
//!
//! Usage:
//!   cargo run --bin fixture-inspect -- --fixture ./recorded_state.json states
//!   cargo run --bin fixture-inspect -- --fixture ./recorded_state.json summary
//!   cargo run --bin fixture-inspect -- --fixture ./recorded_state.json verify --analytics ./Analytics.json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use num_bigint::BigInt;
use num_traits::Zero;
use std::path::PathBuf;

use stake_drift_audit::amount::{format_amount, parse_amount};
use stake_drift_audit::chain::RecordedStateClient;
use stake_drift_audit::data;

/// Inspection tool for recorded chain-state fixtures.
#[derive(Parser, Debug)]
#[command(name = "fixture-inspect")]
#[command(about = "Inspect and verify recorded chain-state fixtures")]
struct Cli {
    /// Path to the fixture JSON file
    #[arg(short, long)]
    fixture: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List recorded states and block-hash mappings
    States,

    /// Show per-state quantity summaries
    Summary,

    /// Verify fixture integrity (parseable amounts, consistent mappings)
    Verify {
        /// Analytics file to cross-check block-hash mappings against
        #[arg(long)]
        analytics: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = RecordedStateClient::from_file(&cli.fixture)
        .with_context(|| format!("failed to load fixture: {:?}", cli.fixture))?;

    println!("Fixture: {:?}", cli.fixture);
    println!();

    match cli.command {
        Commands::States => list_states(&client),
        Commands::Summary => show_summary(&client)?,
        Commands::Verify { analytics } => verify(&client, analytics)?,
    }

    Ok(())
}

fn list_states(client: &RecordedStateClient) {
    let fixture = client.fixture();

    println!("=== Recorded States ===\n");
    println!("{:>66} {:>8} {:>8}", "State ID", "Pools", "Ledgers");
    println!("{}", "-".repeat(84));
    for (state_id, state) in &fixture.states {
        println!(
            "{:>66} {:>8} {:>8}",
            state_id,
            state.pools.len(),
            state.ledgers.len()
        );
    }

    if !fixture.block_hashes.is_empty() {
        println!("\n=== Block Hash Mappings ===\n");
        println!("{:>12} {:>66}", "Block", "Hash");
        println!("{}", "-".repeat(79));
        for (block, hash) in &fixture.block_hashes {
            println!("{:>12} {:>66}", block, hash);
        }
    }
}

fn show_summary(client: &RecordedStateClient) -> Result<()> {
    println!("=== Per-State Summary ===\n");

    for (state_id, state) in &client.fixture().states {
        println!("State {}", state_id);

        let mut points_total = BigInt::zero();
        for (pool_id, raw) in &state.pools {
            match parse_amount(raw) {
                Ok(points) => {
                    println!("  pool{:<6} points = {}", pool_id, format_amount(&points));
                    points_total += points;
                }
                Err(_) => println!("  pool{:<6} points = UNPARSEABLE ({:?})", pool_id, raw),
            }
        }
        println!("  points total    = {}", format_amount(&points_total));

        for (account, ledger) in &state.ledgers {
            let total = parse_amount(&ledger.total)
                .map(|v| format_amount(&v))
                .unwrap_or_else(|_| format!("UNPARSEABLE ({:?})", ledger.total));
            let active = parse_amount(&ledger.active)
                .map(|v| format_amount(&v))
                .unwrap_or_else(|_| format!("UNPARSEABLE ({:?})", ledger.active));
            println!("  ledger {} total = {} active = {}", account, total, active);
        }
        println!();
    }

    Ok(())
}

fn verify(client: &RecordedStateClient, analytics: Option<PathBuf>) -> Result<()> {
    println!("=== Fixture Verification ===\n");

    let fixture = client.fixture();
    let mut bad_amounts = 0usize;

    for (state_id, state) in &fixture.states {
        for (pool_id, raw) in &state.pools {
            if parse_amount(raw).is_err() {
                println!("  bad points for pool {} in state {}: {:?}", pool_id, state_id, raw);
                bad_amounts += 1;
            }
        }
        for (account, ledger) in &state.ledgers {
            for (field, raw) in [("total", &ledger.total), ("active", &ledger.active)] {
                if parse_amount(raw).is_err() {
                    println!(
                        "  bad ledger {} for {} in state {}: {:?}",
                        field, account, state_id, raw
                    );
                    bad_amounts += 1;
                }
            }
        }
    }

    if bad_amounts == 0 {
        println!("  All amounts parseable");
    } else {
        println!("  {} unparseable amounts (run would abort)", bad_amounts);
    }

    let mut dangling = 0usize;
    for (block, hash) in &fixture.block_hashes {
        if !fixture.states.contains_key(hash) {
            println!("  block {} maps to hash {} with no recorded state", block, hash);
            dangling += 1;
        }
    }
    if dangling == 0 {
        println!("  All block-hash mappings have recorded states");
    }

    if let Some(path) = analytics {
        let series = data::load_reference_series(&path)?;
        let mut unknown = 0usize;
        for block in fixture.block_hashes.keys() {
            if !series.iter().any(|r| r.block == *block) {
                println!("  fixture block {} not present in reference series", block);
                unknown += 1;
            }
        }
        if unknown == 0 {
            println!("  All fixture blocks present in reference series");
        }
    }

    Ok(())
}
