//! Item and warehouse directories.
//!
//! The item directory owns every on-hand quantity. Quantities change only
//! through [`ItemDirectory::apply`], which is crate-private so callers go
//! through the ledger's mutation operations.

use std::collections::{BTreeMap, HashSet};

use stockledger_shared::types::{ItemId, WarehouseId};

use super::error::StockError;
use super::types::{AppliedDelta, Item, NewItem, NewWarehouse, Warehouse};

/// Registry of warehouses; always contains the default warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseDirectory {
    warehouses: BTreeMap<WarehouseId, Warehouse>,
    default_id: WarehouseId,
}

impl WarehouseDirectory {
    /// Creates a directory holding only the default warehouse.
    #[must_use]
    pub fn new(default_warehouse: NewWarehouse) -> Self {
        let default = Warehouse {
            id: WarehouseId::new(),
            code: default_warehouse.code,
            name: default_warehouse.name,
        };
        let default_id = default.id;
        Self {
            warehouses: BTreeMap::from([(default_id, default)]),
            default_id,
        }
    }

    /// Registers a warehouse.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` for a blank code or name, and
    /// `DuplicateCode` if the code is taken.
    pub fn register(&mut self, input: NewWarehouse) -> Result<WarehouseId, StockError> {
        let code = required_text(&input.code, "code")?;
        let name = required_text(&input.name, "name")?;
        if self.find_by_code(&code).is_some() {
            return Err(StockError::DuplicateCode(code));
        }

        let warehouse = Warehouse {
            id: WarehouseId::new(),
            code,
            name,
        };
        let id = warehouse.id;
        self.warehouses.insert(id, warehouse);
        Ok(id)
    }

    /// The warehouse used when a record names none.
    #[must_use]
    pub const fn default_id(&self) -> WarehouseId {
        self.default_id
    }

    /// Looks up a warehouse by ID.
    #[must_use]
    pub fn get(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.warehouses.get(&id)
    }

    /// Returns true if the warehouse exists.
    #[must_use]
    pub fn contains(&self, id: WarehouseId) -> bool {
        self.warehouses.contains_key(&id)
    }

    /// Looks up a warehouse by code, ignoring case.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Warehouse> {
        let code = code.trim();
        self.warehouses
            .values()
            .find(|w| w.code.eq_ignore_ascii_case(code))
    }

    /// All warehouses, ordered by ID.
    pub fn list(&self) -> impl Iterator<Item = &Warehouse> {
        self.warehouses.values()
    }
}

/// Registry of catalog items and their per-warehouse quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemDirectory {
    items: BTreeMap<ItemId, Item>,
}

impl ItemDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an item with no stock.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` for a blank code or name,
    /// `InvalidQuantity` for negative thresholds, and `DuplicateCode` if the
    /// code is taken.
    pub fn register(&mut self, input: NewItem) -> Result<ItemId, StockError> {
        let code = required_text(&input.code, "code")?;
        let name = required_text(&input.name, "name")?;
        if self.find_by_code(&code).is_some() {
            return Err(StockError::DuplicateCode(code));
        }

        let id = ItemId::new();
        for threshold in [input.reorder_min, input.reorder_max] {
            if threshold < 0 {
                return Err(StockError::InvalidQuantity {
                    item_id: id,
                    quantity: threshold,
                });
            }
        }

        self.items.insert(
            id,
            Item {
                id,
                code,
                name,
                unit_cost: input.unit_cost,
                unit_price: input.unit_price,
                reorder_min: input.reorder_min,
                reorder_max: input.reorder_max,
                stock: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    /// Looks up an item by ID.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Returns true if the item exists.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Looks up an item by code, ignoring case.
    #[must_use]
    pub fn find_by_code(&self, code: &str) -> Option<&Item> {
        let code = code.trim();
        self.items
            .values()
            .find(|item| item.code.eq_ignore_ascii_case(code))
    }

    /// Looks up an item by ID, code, or exact name, in that order.
    #[must_use]
    pub fn find(&self, reference: &str) -> Option<&Item> {
        let reference = reference.trim();
        if let Ok(id) = reference.parse::<ItemId>() {
            if let Some(item) = self.get(id) {
                return Some(item);
            }
        }
        self.find_by_code(reference)
            .or_else(|| self.items.values().find(|item| item.name == reference))
    }

    /// All items, ordered by ID.
    pub fn list(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Quantity of one item in one warehouse, or across all warehouses.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem` if the item does not exist.
    pub fn get_quantity(
        &self,
        item_id: ItemId,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<i64, StockError> {
        let item = self.get(item_id).ok_or(StockError::UnknownItem(item_id))?;
        Ok(match warehouse_id {
            Some(warehouse_id) => item.quantity_at(warehouse_id),
            None => item.total_stock(),
        })
    }

    /// Verifies that applying `deltas` keeps every bucket at or above zero.
    ///
    /// Deltas on the same bucket are summed before checking.
    ///
    /// # Errors
    ///
    /// Returns `UnknownItem`, `InvalidQuantity` on overflow, or
    /// `InsufficientStock` naming the first bucket that would go negative.
    pub fn check(&self, deltas: &[AppliedDelta]) -> Result<(), StockError> {
        self.projected(deltas).map(|_| ())
    }

    /// Applies `deltas` atomically: either every bucket changes or none does.
    ///
    /// # Errors
    ///
    /// Same as [`ItemDirectory::check`]; on error nothing is modified.
    pub(crate) fn apply(&mut self, deltas: &[AppliedDelta]) -> Result<(), StockError> {
        for ((item_id, warehouse_id), quantity) in self.projected(deltas)? {
            if let Some(item) = self.items.get_mut(&item_id) {
                item.stock.insert(warehouse_id, quantity);
            }
        }
        Ok(())
    }

    /// Computes the final quantity of every bucket touched by `deltas`.
    fn projected(
        &self,
        deltas: &[AppliedDelta],
    ) -> Result<BTreeMap<(ItemId, WarehouseId), i64>, StockError> {
        let mut net: BTreeMap<(ItemId, WarehouseId), i64> = BTreeMap::new();
        for d in deltas {
            let slot = net.entry((d.item_id, d.warehouse_id)).or_insert(0);
            *slot = slot
                .checked_add(d.delta)
                .ok_or(StockError::InvalidQuantity {
                    item_id: d.item_id,
                    quantity: d.delta,
                })?;
        }

        let mut finals = BTreeMap::new();
        for ((item_id, warehouse_id), change) in net {
            let item = self.get(item_id).ok_or(StockError::UnknownItem(item_id))?;
            let available = item.quantity_at(warehouse_id);
            let quantity = available
                .checked_add(change)
                .ok_or(StockError::InvalidQuantity {
                    item_id,
                    quantity: change,
                })?;
            if quantity < 0 {
                let requested = change.checked_neg().ok_or(StockError::InvalidQuantity {
                    item_id,
                    quantity: change,
                })?;
                return Err(StockError::InsufficientStock {
                    item_id,
                    warehouse_id,
                    available,
                    requested,
                });
            }
            finals.insert((item_id, warehouse_id), quantity);
        }
        Ok(finals)
    }

    /// First of `item_ids` that is not registered.
    pub(crate) fn missing<'a>(
        &self,
        item_ids: impl IntoIterator<Item = &'a ItemId>,
    ) -> Option<ItemId> {
        let mut seen = HashSet::new();
        item_ids
            .into_iter()
            .filter(|id| seen.insert(**id))
            .find(|id| !self.contains(**id))
            .copied()
    }
}

fn required_text(value: &str, field: &'static str) -> Result<String, StockError> {
    let value = value.trim();
    if value.is_empty() {
        Err(StockError::MissingRequiredField(field))
    } else {
        Ok(value.to_string())
    }
}
