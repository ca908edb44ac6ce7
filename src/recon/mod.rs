//! Snapshot-Delta Reconciliation Engine
//!
//! The analytical core of the audit: per-pool aggregation, first-difference
//! computation between consecutive snapshots, and the synthetic diff rows
//! that expose divergence between the points-based and ledger-based books.

pub mod aggregate;
pub mod delta;
pub mod report;

pub use aggregate::{pool_value, sum_pools};
pub use delta::{ledger_reconciliation, pooled_total_reconciliation, DeltaCategory, DeltaRow};
pub use report::{render_delta_report, render_snapshot_overview};
