//! The stock ledger: the single mutator of item quantities.
//!
//! Every create, edit, and delete resolves the record's deltas, binds them
//! to concrete warehouses, folds them into a [`StockPlan`], and validates
//! the plan against the item directory before anything is written. A
//! rejected call leaves directory, store, and journal untouched.

use std::sync::Arc;

use chrono::Utc;
use stockledger_shared::types::{ItemId, RecordId, WarehouseId};
use tracing::{debug, info, warn};

use super::directory::{ItemDirectory, WarehouseDirectory};
use super::error::StockError;
use super::events::{ChangeAction, StockChange, StockObserver};
use super::journal::{Discrepancy, JournalAction, StockJournal};
use super::plan::StockPlan;
use super::resolver::EffectResolver;
use super::store::{MemoryRecordStore, RecordStore};
use super::types::{
    AppliedDelta, Item, LineItem, MovementKind, MutationRecord, NewItem, NewWarehouse, PosLine,
    PosSale, PurchaseReceipt, PurchaseReturn, RecordKind, SalesInvoice, SalesReturn, StockDelta,
    StockMovement, StoredRecord, Warehouse,
};

/// Stock ledger engine.
pub struct StockLedger<S: RecordStore = MemoryRecordStore> {
    warehouses: WarehouseDirectory,
    items: ItemDirectory,
    store: S,
    journal: StockJournal,
    observers: Vec<Arc<dyn StockObserver>>,
}

impl StockLedger<MemoryRecordStore> {
    /// Creates an engine backed by an in-memory record store.
    #[must_use]
    pub fn new(default_warehouse: NewWarehouse) -> Self {
        Self::with_store(default_warehouse, MemoryRecordStore::new())
    }
}

impl<S: RecordStore> StockLedger<S> {
    /// Creates an engine backed by `store`.
    ///
    /// The store is expected to be empty; the directories start without
    /// stock.
    #[must_use]
    pub fn with_store(default_warehouse: NewWarehouse, store: S) -> Self {
        Self {
            warehouses: WarehouseDirectory::new(default_warehouse),
            items: ItemDirectory::new(),
            store,
            journal: StockJournal::new(),
            observers: Vec::new(),
        }
    }

    /// Registers an observer for committed changes.
    pub fn subscribe(&mut self, observer: Arc<dyn StockObserver>) {
        self.observers.push(observer);
    }

    // ========== Directories ==========

    /// Registers a warehouse.
    pub fn register_warehouse(&mut self, input: NewWarehouse) -> Result<WarehouseId, StockError> {
        let id = self.warehouses.register(input)?;
        info!(warehouse_id = %id, "Warehouse registered");
        Ok(id)
    }

    /// Registers an item with no stock.
    pub fn register_item(&mut self, input: NewItem) -> Result<ItemId, StockError> {
        let id = self.items.register(input)?;
        info!(item_id = %id, "Item registered");
        Ok(id)
    }

    /// Adds opening stock for an item, journalled as an opening balance.
    ///
    /// `warehouse_id: None` targets the default warehouse.
    pub fn record_opening_stock(
        &mut self,
        item_id: ItemId,
        warehouse_id: Option<WarehouseId>,
        quantity: i64,
    ) -> Result<(), StockError> {
        if quantity <= 0 {
            return Err(StockError::InvalidQuantity { item_id, quantity });
        }
        let deltas = self.bind(&[StockDelta {
            item_id,
            warehouse_id,
            delta: quantity,
        }])?;
        self.items.apply(&deltas)?;
        self.journal.append(JournalAction::Opening, None, deltas);
        info!(item_id = %item_id, quantity, "Opening stock recorded");
        Ok(())
    }

    /// The default warehouse.
    pub fn default_warehouse_id(&self) -> WarehouseId {
        self.warehouses.default_id()
    }

    /// Looks up a warehouse by ID.
    pub fn warehouse(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.warehouses.get(id)
    }

    /// Looks up a warehouse by code.
    pub fn find_warehouse(&self, code: &str) -> Option<&Warehouse> {
        self.warehouses.find_by_code(code)
    }

    /// All warehouses.
    pub fn warehouses(&self) -> impl Iterator<Item = &Warehouse> {
        self.warehouses.list()
    }

    /// Looks up an item by ID.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Looks up an item by ID, code, or name.
    pub fn find_item(&self, reference: &str) -> Option<&Item> {
        self.items.find(reference)
    }

    /// All items.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.list()
    }

    /// Quantity of an item in one warehouse, or across all warehouses.
    pub fn get_quantity(
        &self,
        item_id: ItemId,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<i64, StockError> {
        if let Some(warehouse_id) = warehouse_id {
            if !self.warehouses.contains(warehouse_id) {
                return Err(StockError::UnknownWarehouse(warehouse_id));
            }
        }
        self.items.get_quantity(item_id, warehouse_id)
    }

    // ========== Records ==========

    /// Records a manual stock movement.
    pub fn create_movement(
        &mut self,
        movement_type: MovementKind,
        item_id: ItemId,
        quantity: i64,
        source_warehouse_id: Option<WarehouseId>,
        dest_warehouse_id: Option<WarehouseId>,
    ) -> Result<RecordId, StockError> {
        self.create(
            MutationRecord::Movement(StockMovement {
                movement_type,
                item_id,
                quantity,
                source_warehouse_id,
                dest_warehouse_id,
            }),
            None,
        )
    }

    /// Records goods received from a supplier.
    pub fn create_purchase_receipt(
        &mut self,
        item_id: ItemId,
        quantity: i64,
        warehouse_id: WarehouseId,
    ) -> Result<RecordId, StockError> {
        self.create(
            MutationRecord::PurchaseReceipt(PurchaseReceipt {
                item_id,
                quantity,
                warehouse_id,
            }),
            None,
        )
    }

    /// Records goods returned to a supplier.
    pub fn create_purchase_return(
        &mut self,
        item_id: ItemId,
        quantity: i64,
    ) -> Result<RecordId, StockError> {
        self.create(
            MutationRecord::PurchaseReturn(PurchaseReturn { item_id, quantity }),
            None,
        )
    }

    /// Records a sales invoice.
    pub fn create_sales_invoice(
        &mut self,
        lines: Vec<LineItem>,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<RecordId, StockError> {
        self.create(
            MutationRecord::SalesInvoice(SalesInvoice {
                lines,
                warehouse_id,
            }),
            None,
        )
    }

    /// Records goods returned by a customer.
    pub fn create_sales_return(&mut self, lines: Vec<LineItem>) -> Result<RecordId, StockError> {
        self.create(MutationRecord::SalesReturn(SalesReturn { lines }), None)
    }

    /// Records a point-of-sale checkout.
    pub fn create_pos_sale(&mut self, lines: Vec<PosLine>) -> Result<RecordId, StockError> {
        self.create(MutationRecord::PosSale(PosSale { lines }), None)
    }

    /// Validates and applies a record of any kind.
    ///
    /// # Errors
    ///
    /// Any validation or stock error; on error nothing changes.
    pub fn create(
        &mut self,
        record: MutationRecord,
        reference: Option<String>,
    ) -> Result<RecordId, StockError> {
        let kind = record.kind();
        self.try_create(record, reference).inspect_err(|e| {
            warn!(kind = %kind, error = %e, "Record rejected");
        })
    }

    fn try_create(
        &mut self,
        record: MutationRecord,
        reference: Option<String>,
    ) -> Result<RecordId, StockError> {
        let applied = self.prepare(&record)?;
        let mut plan = StockPlan::new();
        plan.apply(&applied)?;
        let net = plan.deltas();
        self.items.check(&net)?;

        let now = Utc::now();
        let stored = StoredRecord {
            id: RecordId::new(),
            record,
            reference: reference.filter(|r| !r.trim().is_empty()),
            applied,
            created_at: now,
            updated_at: now,
        };
        let (id, kind) = (stored.id, stored.kind());
        let applied = stored.applied.clone();

        self.store.put(stored)?;
        if let Err(e) = self.items.apply(&net) {
            self.store.remove(id)?;
            return Err(e);
        }
        debug!(record_id = %id, deltas = ?net, "Deltas applied");
        self.journal
            .append(JournalAction::Applied, Some((id, kind)), applied);

        info!(record_id = %id, kind = %kind, "Record created");
        self.notify(StockChange {
            record_id: id,
            kind,
            action: ChangeAction::Created,
            deltas: net,
        });
        Ok(id)
    }

    /// Replaces a record's fields, reverting its old effect and applying
    /// the new one as a single net change.
    ///
    /// The record keeps its ID, reference, and creation time.
    ///
    /// # Errors
    ///
    /// `RecordNotFound`, `RecordKindMismatch`, or any create error; on
    /// error nothing changes.
    pub fn edit_record(&mut self, id: RecordId, record: MutationRecord) -> Result<(), StockError> {
        self.try_edit(id, record).inspect_err(|e| {
            warn!(record_id = %id, error = %e, "Edit rejected");
        })
    }

    fn try_edit(&mut self, id: RecordId, record: MutationRecord) -> Result<(), StockError> {
        let existing = self.store.get(id)?.ok_or(StockError::RecordNotFound(id))?;
        if existing.kind() != record.kind() {
            return Err(StockError::RecordKindMismatch {
                expected: existing.kind(),
                found: record.kind(),
            });
        }

        let applied = self.prepare(&record)?;
        let mut plan = StockPlan::new();
        plan.revert(&existing.applied)?.apply(&applied)?;
        let net = plan.deltas();
        self.items.check(&net)?;

        let updated = StoredRecord {
            record,
            applied: applied.clone(),
            updated_at: Utc::now(),
            ..existing.clone()
        };
        let kind = updated.kind();

        self.store.put(updated)?;
        if let Err(e) = self.items.apply(&net) {
            self.store.put(existing)?;
            return Err(e);
        }
        debug!(record_id = %id, deltas = ?net, "Net deltas applied");
        self.journal
            .append(JournalAction::Reverted, Some((id, kind)), existing.applied);
        self.journal
            .append(JournalAction::Applied, Some((id, kind)), applied);

        info!(record_id = %id, kind = %kind, "Record edited");
        self.notify(StockChange {
            record_id: id,
            kind,
            action: ChangeAction::Edited,
            deltas: net,
        });
        Ok(())
    }

    /// Deletes a record and reverts its effect.
    ///
    /// # Errors
    ///
    /// `RecordNotFound`, or `InsufficientStock` if the goods the record
    /// added have since left the warehouse; on error nothing changes.
    pub fn delete_record(&mut self, id: RecordId) -> Result<(), StockError> {
        self.try_delete(id).inspect_err(|e| {
            warn!(record_id = %id, error = %e, "Delete rejected");
        })
    }

    fn try_delete(&mut self, id: RecordId) -> Result<(), StockError> {
        let existing = self.store.get(id)?.ok_or(StockError::RecordNotFound(id))?;
        let mut plan = StockPlan::new();
        plan.revert(&existing.applied)?;
        let net = plan.deltas();
        self.items.check(&net)?;

        let kind = existing.kind();
        self.store.remove(id)?;
        if let Err(e) = self.items.apply(&net) {
            self.store.put(existing)?;
            return Err(e);
        }
        debug!(record_id = %id, deltas = ?net, "Deltas reverted");
        let reverted: Vec<AppliedDelta> = existing.applied;
        self.journal
            .append(JournalAction::Reverted, Some((id, kind)), reverted);

        info!(record_id = %id, kind = %kind, "Record deleted");
        self.notify(StockChange {
            record_id: id,
            kind,
            action: ChangeAction::Deleted,
            deltas: net,
        });
        Ok(())
    }

    /// Fetches a stored record.
    pub fn record(&self, id: RecordId) -> Result<StoredRecord, StockError> {
        self.store.get(id)?.ok_or(StockError::RecordNotFound(id))
    }

    /// Lists stored records in creation order, optionally of one kind.
    pub fn records(&self, kind: Option<RecordKind>) -> Result<Vec<StoredRecord>, StockError> {
        self.store.list(kind)
    }

    /// The audit journal.
    pub fn journal(&self) -> &StockJournal {
        &self.journal
    }

    /// Buckets whose directory quantity disagrees with the journal.
    ///
    /// Always empty unless the directory was changed outside the ledger.
    pub fn reconcile(&self) -> Vec<Discrepancy> {
        self.journal.reconcile(&self.items)
    }

    // ========== Internals ==========

    /// Resolves a record and binds its deltas to concrete warehouses.
    fn prepare(&self, record: &MutationRecord) -> Result<Vec<AppliedDelta>, StockError> {
        let deltas = EffectResolver::resolve(record)?;
        self.bind(&deltas)
    }

    /// Maps `None` to the default warehouse and checks both directories.
    fn bind(&self, deltas: &[StockDelta]) -> Result<Vec<AppliedDelta>, StockError> {
        if let Some(item_id) = self.items.missing(deltas.iter().map(|d| &d.item_id)) {
            return Err(StockError::UnknownItem(item_id));
        }
        deltas
            .iter()
            .map(|d| {
                let warehouse_id = d.warehouse_id.unwrap_or(self.warehouses.default_id());
                if !self.warehouses.contains(warehouse_id) {
                    return Err(StockError::UnknownWarehouse(warehouse_id));
                }
                Ok(AppliedDelta {
                    item_id: d.item_id,
                    warehouse_id,
                    delta: d.delta,
                })
            })
            .collect()
    }

    fn notify(&self, change: StockChange) {
        for observer in &self.observers {
            observer.on_change(&change);
        }
    }
}
