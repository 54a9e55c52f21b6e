//! Net bucket changes for a single ledger operation.
//!
//! Editing or deleting a record reverts its old deltas and applies new
//! ones. Folding both into one net change per bucket lets the directory
//! validate the final state only, so a transient dip below zero between
//! the revert and the re-apply never counts as a shortfall.

use std::collections::BTreeMap;

use stockledger_shared::types::{ItemId, WarehouseId};

use super::error::StockError;
use super::types::AppliedDelta;

/// Accumulated net change per `(item, warehouse)` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockPlan {
    net: BTreeMap<(ItemId, WarehouseId), i64>,
}

impl StockPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `deltas` to the plan.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` if a bucket total overflows.
    pub fn apply(&mut self, deltas: &[AppliedDelta]) -> Result<&mut Self, StockError> {
        for d in deltas {
            self.add(d.item_id, d.warehouse_id, d.delta)?;
        }
        Ok(self)
    }

    /// Adds the inverse of `deltas` to the plan.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` if a delta cannot be negated or a bucket
    /// total overflows.
    pub fn revert(&mut self, deltas: &[AppliedDelta]) -> Result<&mut Self, StockError> {
        for d in deltas {
            let inverse = d.delta.checked_neg().ok_or(StockError::InvalidQuantity {
                item_id: d.item_id,
                quantity: d.delta,
            })?;
            self.add(d.item_id, d.warehouse_id, inverse)?;
        }
        Ok(self)
    }

    fn add(&mut self, item_id: ItemId, warehouse_id: WarehouseId, delta: i64) -> Result<(), StockError> {
        let slot = self.net.entry((item_id, warehouse_id)).or_insert(0);
        *slot = slot
            .checked_add(delta)
            .ok_or(StockError::InvalidQuantity { item_id, quantity: delta })?;
        Ok(())
    }

    /// Returns true if no bucket changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.net.values().all(|delta| *delta == 0)
    }

    /// Net deltas, one per changed bucket, zeros dropped.
    #[must_use]
    pub fn deltas(&self) -> Vec<AppliedDelta> {
        self.net
            .iter()
            .filter(|(_, delta)| **delta != 0)
            .map(|(&(item_id, warehouse_id), &delta)| AppliedDelta {
                item_id,
                warehouse_id,
                delta,
            })
            .collect()
    }
}
