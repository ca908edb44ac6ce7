//! Report Builder
//!
//! Assembles snapshot records and delta rows into flat fixed-width tables
//! for stdout. Rendering stays deliberately plain; the numbers are the
//! deliverable, formatted exactly via the amount codec.

use std::fmt::Write;

use crate::amount::format_amount;
use crate::models::{PoolId, SnapshotRecord};
use crate::recon::aggregate::pool_value;
use crate::recon::delta::DeltaRow;

const AMOUNT_WIDTH: usize = 26;

/// Render the per-snapshot overview: points per pool, the points and
/// ledger-active grand totals, the reference totalPooled and the running
/// drift between the points books and the reference.
pub fn render_snapshot_overview(snapshots: &[SnapshotRecord], pools: &[PoolId]) -> String {
    let mut out = String::new();
    writeln!(out, "=== Snapshot Overview ===").unwrap();

    write!(out, "{:>4} {:>10}", "i", "block").unwrap();
    for &pool in pools {
        write!(out, " {:>w$}", format!("pool{}", pool), w = AMOUNT_WIDTH).unwrap();
    }
    writeln!(
        out,
        " {:>w$} {:>w$} {:>w$} {:>w$}",
        "points_total",
        "bonded_total",
        "totalPooled",
        "drift",
        w = AMOUNT_WIDTH
    )
    .unwrap();
    writeln!(
        out,
        "{}",
        "-".repeat(16 + (pools.len() + 4) * (AMOUNT_WIDTH + 1))
    )
    .unwrap();

    for record in snapshots {
        write!(out, "{:>4} {:>10}", record.index, record.block).unwrap();
        for &pool in pools {
            write!(
                out,
                " {:>w$}",
                format_amount(&record.points(pool)),
                w = AMOUNT_WIDTH
            )
            .unwrap();
        }
        writeln!(
            out,
            " {:>w$} {:>w$} {:>w$} {:>w$}",
            format_amount(&record.points_total()),
            format_amount(&record.ledger_active_total()),
            format_amount(&record.total_pooled),
            format_amount(&record.drift()),
            w = AMOUNT_WIDTH
        )
        .unwrap();
    }

    out
}

/// Render one reconciliation table of grouped delta rows.
pub fn render_delta_report(title: &str, rows: &[DeltaRow], pools: &[PoolId]) -> String {
    let mut out = String::new();
    writeln!(out, "=== {} ===", title).unwrap();

    write!(out, "{:>10} {:>12}", "block", "-").unwrap();
    for &pool in pools {
        write!(out, " {:>w$}", format!("pool{}", pool), w = AMOUNT_WIDTH).unwrap();
    }
    writeln!(out, " {:>w$}", "total", w = AMOUNT_WIDTH).unwrap();
    writeln!(
        out,
        "{}",
        "-".repeat(24 + (pools.len() + 1) * (AMOUNT_WIDTH + 1))
    )
    .unwrap();

    for row in rows {
        let block_label = row
            .block
            .map(|b| b.to_string())
            .unwrap_or_default();
        write!(out, "{:>10} {:>12}", block_label, row.category.as_str()).unwrap();
        for &pool in pools {
            // Pool-less categories (e.g. totalPooled) leave pool cells blank.
            let cell = if row.per_pool.is_empty() {
                String::new()
            } else {
                format_amount(&pool_value(&row.per_pool, pool))
            };
            write!(out, " {:>w$}", cell, w = AMOUNT_WIDTH).unwrap();
        }
        writeln!(out, " {:>w$}", format_amount(&row.total), w = AMOUNT_WIDTH).unwrap();
    }

    out
}
