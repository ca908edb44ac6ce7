//! Stake Drift Audit Library
//!
//! Offline reconciliation of two independently-tracked accounting systems:
//! nomination-pool points balances vs staking-ledger bonded/active stake,
//! observed at historical block heights and compared via first differences.
//!
//! Exposes core modules for use by binaries and tests.

pub mod amount;
pub mod chain;
pub mod data;
pub mod models;
pub mod recon;
pub mod scrapers;
pub mod selector;
pub mod snapshot;
