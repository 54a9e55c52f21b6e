//! Effect resolution: mutation record to signed quantity deltas.
//!
//! The resolver is pure. It validates the record's own fields and maps
//! them to deltas; it never reads directory quantities, so the same record
//! always resolves to the same deltas.

use stockledger_shared::types::{ItemId, WarehouseId};

use super::error::StockError;
use super::types::{
    LineItem, MovementKind, MutationRecord, PosLine, StockDelta, StockMovement,
};

/// Stateless resolver for record effects.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve a record into the deltas it applies.
    ///
    /// | Record | Delta |
    /// |---|---|
    /// | Movement `Add` | `+qty` at destination, else source, else default |
    /// | Movement `Issue` | `-qty` at source, else destination, else default |
    /// | Movement `Transfer` | `-qty` at source, `+qty` at destination |
    /// | Movement `Adjust` | signed `qty` at destination, else source, else default |
    /// | Purchase receipt | `+qty` at the receiving warehouse |
    /// | Purchase return | `-qty` at default |
    /// | Sales invoice | `-qty` per line at the invoice warehouse, else default |
    /// | Sales return | `+qty` per line at default |
    /// | POS sale | `-qty` per line at the line's warehouse |
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity`, `MissingRequiredField`, or
    /// `SameWarehouseTransfer` when the record's fields are malformed.
    pub fn resolve(record: &MutationRecord) -> Result<Vec<StockDelta>, StockError> {
        match record {
            MutationRecord::Movement(movement) => Self::resolve_movement(movement),
            MutationRecord::PurchaseReceipt(receipt) => {
                let quantity = Self::positive(receipt.item_id, receipt.quantity)?;
                Ok(vec![delta(receipt.item_id, Some(receipt.warehouse_id), quantity)])
            }
            MutationRecord::PurchaseReturn(ret) => {
                let quantity = Self::positive(ret.item_id, ret.quantity)?;
                Ok(vec![delta(ret.item_id, None, -quantity)])
            }
            MutationRecord::SalesInvoice(invoice) => {
                Self::resolve_lines(&invoice.lines, invoice.warehouse_id, -1)
            }
            MutationRecord::SalesReturn(ret) => Self::resolve_lines(&ret.lines, None, 1),
            MutationRecord::PosSale(sale) => Self::resolve_pos_lines(&sale.lines),
        }
    }

    fn resolve_movement(movement: &StockMovement) -> Result<Vec<StockDelta>, StockError> {
        let item_id = movement.item_id;
        let source = movement.source_warehouse_id;
        let dest = movement.dest_warehouse_id;

        match movement.movement_type {
            MovementKind::Add => {
                let quantity = Self::positive(item_id, movement.quantity)?;
                Ok(vec![delta(item_id, dest.or(source), quantity)])
            }
            MovementKind::Issue => {
                let quantity = Self::positive(item_id, movement.quantity)?;
                Ok(vec![delta(item_id, source.or(dest), -quantity)])
            }
            MovementKind::Transfer => {
                let quantity = Self::positive(item_id, movement.quantity)?;
                let source = source.ok_or(StockError::MissingRequiredField("source_warehouse_id"))?;
                let dest = dest.ok_or(StockError::MissingRequiredField("dest_warehouse_id"))?;
                if source == dest {
                    return Err(StockError::SameWarehouseTransfer(source));
                }
                Ok(vec![
                    delta(item_id, Some(source), -quantity),
                    delta(item_id, Some(dest), quantity),
                ])
            }
            MovementKind::Adjust => {
                // Every applied delta must be revertible.
                if movement.quantity == 0 || movement.quantity.checked_neg().is_none() {
                    return Err(StockError::InvalidQuantity {
                        item_id,
                        quantity: movement.quantity,
                    });
                }
                Ok(vec![delta(item_id, dest.or(source), movement.quantity)])
            }
        }
    }

    fn resolve_lines(
        lines: &[LineItem],
        warehouse_id: Option<WarehouseId>,
        sign: i64,
    ) -> Result<Vec<StockDelta>, StockError> {
        if lines.is_empty() {
            return Err(StockError::MissingRequiredField("lines"));
        }
        lines
            .iter()
            .map(|line| {
                let quantity = Self::positive(line.item_id, line.quantity)?;
                Ok(delta(line.item_id, warehouse_id, sign * quantity))
            })
            .collect()
    }

    fn resolve_pos_lines(lines: &[PosLine]) -> Result<Vec<StockDelta>, StockError> {
        if lines.is_empty() {
            return Err(StockError::MissingRequiredField("lines"));
        }
        lines
            .iter()
            .map(|line| {
                let quantity = Self::positive(line.item_id, line.quantity)?;
                Ok(delta(line.item_id, Some(line.warehouse_id), -quantity))
            })
            .collect()
    }

    fn positive(item_id: ItemId, quantity: i64) -> Result<i64, StockError> {
        if quantity > 0 {
            Ok(quantity)
        } else {
            Err(StockError::InvalidQuantity { item_id, quantity })
        }
    }
}

const fn delta(item_id: ItemId, warehouse_id: Option<WarehouseId>, delta: i64) -> StockDelta {
    StockDelta {
        item_id,
        warehouse_id,
        delta,
    }
}
