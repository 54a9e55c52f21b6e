//! Stock quantity reconciliation.
//!
//! This module implements:
//! - Item and warehouse directories holding per-warehouse quantities
//! - Mutation records for every source that moves stock
//! - The effect resolver mapping records to signed deltas
//! - The ledger engine that creates, edits, and deletes records
//! - An audit journal and change notifications

pub mod directory;
pub mod engine;
pub mod error;
pub mod events;
pub mod journal;
pub mod plan;
pub mod resolver;
pub mod store;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use directory::{ItemDirectory, WarehouseDirectory};
pub use engine::StockLedger;
pub use error::StockError;
pub use events::{ChangeAction, StockChange, StockObserver};
pub use journal::{Discrepancy, JournalAction, JournalEntry, StockJournal};
pub use plan::StockPlan;
pub use resolver::EffectResolver;
pub use store::{MemoryRecordStore, RecordStore};
pub use types::{
    AppliedDelta, Item, LineItem, MovementKind, MutationRecord, NewItem, NewWarehouse, PosLine,
    PosSale, PurchaseReceipt, PurchaseReturn, RecordKind, SalesInvoice, SalesReturn, StockDelta,
    StockLevel, StockMovement, StoredRecord, Warehouse,
};
