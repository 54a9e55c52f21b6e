//! Core stock reconciliation logic for Stockledger.
//!
//! This crate contains the ledger engine with ZERO web dependencies.
//! Every quantity change flows through one resolver and one coordinator.
//!
//! # Modules
//!
//! - `stock` - Records, effect resolution, directories, and the ledger engine

pub mod stock;
