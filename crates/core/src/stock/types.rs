//! Stock domain types: catalog entries, mutation records, and deltas.
//!
//! Quantities are whole units held in `i64`. Records carry positive
//! quantities (an `Adjust` movement may be negative); deltas are signed.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{ItemId, RecordId, WarehouseId};

/// A storage location holding per-item quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    /// Warehouse ID.
    pub id: WarehouseId,
    /// Unique short code (e.g. `MAIN`).
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Input for registering a warehouse.
#[derive(Debug, Clone)]
pub struct NewWarehouse {
    /// Unique short code.
    pub code: String,
    /// Display name.
    pub name: String,
}

impl NewWarehouse {
    /// Creates a warehouse registration input.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A catalog item and its on-hand quantity per warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item ID.
    pub id: ItemId,
    /// Unique item code (e.g. `P-100`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Unit cost.
    pub unit_cost: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Reorder threshold.
    pub reorder_min: i64,
    /// Overstock threshold; zero disables the check.
    pub reorder_max: i64,
    /// On-hand quantity per warehouse. Never negative.
    pub stock: BTreeMap<WarehouseId, i64>,
}

impl Item {
    /// Quantity held in one warehouse.
    #[must_use]
    pub fn quantity_at(&self, warehouse_id: WarehouseId) -> i64 {
        self.stock.get(&warehouse_id).copied().unwrap_or(0)
    }

    /// Quantity held across all warehouses.
    #[must_use]
    pub fn total_stock(&self) -> i64 {
        self.stock.values().sum()
    }

    /// Reorder classification of the total quantity.
    #[must_use]
    pub fn level(&self) -> StockLevel {
        StockLevel::classify(self.total_stock(), self.reorder_min, self.reorder_max)
    }
}

/// Input for registering a catalog item.
#[derive(Debug, Clone)]
pub struct NewItem {
    /// Unique item code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Unit cost.
    pub unit_cost: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Reorder threshold.
    pub reorder_min: i64,
    /// Overstock threshold; zero disables the check.
    pub reorder_max: i64,
}

impl NewItem {
    /// Creates an item input with zero prices and no thresholds.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit_cost: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            reorder_min: 0,
            reorder_max: 0,
        }
    }

    /// Sets unit cost and price.
    #[must_use]
    pub fn with_prices(mut self, unit_cost: Decimal, unit_price: Decimal) -> Self {
        self.unit_cost = unit_cost;
        self.unit_price = unit_price;
        self
    }

    /// Sets reorder thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, reorder_min: i64, reorder_max: i64) -> Self {
        self.reorder_min = reorder_min;
        self.reorder_max = reorder_max;
        self
    }
}

/// Reorder status of an item's total quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    /// At or below the reorder threshold.
    Critical,
    /// Within one and a half times the reorder threshold.
    Low,
    /// Comfortably stocked.
    Normal,
    /// Above a positive overstock threshold.
    Overstock,
}

impl StockLevel {
    /// Classifies a quantity against reorder thresholds.
    ///
    /// `Low` means `quantity <= 1.5 * min`, evaluated in integers.
    #[must_use]
    pub fn classify(quantity: i64, reorder_min: i64, reorder_max: i64) -> Self {
        if quantity <= reorder_min {
            Self::Critical
        } else if quantity.saturating_mul(2) <= reorder_min.saturating_mul(3) {
            Self::Low
        } else if reorder_max > 0 && quantity > reorder_max {
            Self::Overstock
        } else {
            Self::Normal
        }
    }

    /// Returns true if the item should be reordered.
    #[must_use]
    pub fn needs_reorder(self) -> bool {
        matches!(self, Self::Critical | Self::Low)
    }
}

/// Kind of a manual stock movement.
///
/// Serialized lowercase; deserialization ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum MovementKind {
    /// Goods brought into a warehouse.
    Add,
    /// Goods issued out of a warehouse.
    Issue,
    /// Goods moved from one warehouse to another.
    Transfer,
    /// Signed correction; added, never set.
    Adjust,
}

impl MovementKind {
    /// Returns the wire name of the movement kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Issue => "issue",
            Self::Transfer => "transfer",
            Self::Adjust => "adjust",
        }
    }
}

impl FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "issue" => Ok(Self::Issue),
            "transfer" => Ok(Self::Transfer),
            "adjust" => Ok(Self::Adjust),
            _ => Err(format!("Unknown movement type: {s}")),
        }
    }
}

impl TryFrom<String> for MovementKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Manual stock movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Movement kind.
    #[serde(rename = "type")]
    pub movement_type: MovementKind,
    /// Item moved.
    pub item_id: ItemId,
    /// Quantity; signed only for `Adjust`.
    pub quantity: i64,
    /// Warehouse goods leave.
    pub source_warehouse_id: Option<WarehouseId>,
    /// Warehouse goods enter.
    pub dest_warehouse_id: Option<WarehouseId>,
}

/// Goods received from a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Item received.
    pub item_id: ItemId,
    /// Quantity received.
    pub quantity: i64,
    /// Receiving warehouse.
    pub warehouse_id: WarehouseId,
}

/// Goods sent back to a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReturn {
    /// Item returned.
    pub item_id: ItemId,
    /// Quantity returned.
    pub quantity: i64,
}

/// One `(item, quantity)` line of a sales document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Item sold or returned.
    pub item_id: ItemId,
    /// Quantity.
    pub quantity: i64,
}

impl LineItem {
    /// Creates a line.
    #[must_use]
    pub const fn new(item_id: ItemId, quantity: i64) -> Self {
        Self { item_id, quantity }
    }
}

/// Sales invoice; every line leaves stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesInvoice {
    /// Invoice lines.
    pub lines: Vec<LineItem>,
    /// Shipping warehouse; the default warehouse when absent.
    pub warehouse_id: Option<WarehouseId>,
}

/// Customer return; every line comes back into stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesReturn {
    /// Returned lines.
    pub lines: Vec<LineItem>,
}

/// One point-of-sale cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosLine {
    /// Item sold.
    pub item_id: ItemId,
    /// Quantity.
    pub quantity: i64,
    /// Warehouse the goods are taken from.
    pub warehouse_id: WarehouseId,
}

/// Point-of-sale checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosSale {
    /// Cart lines.
    pub lines: Vec<PosLine>,
}

/// A quantity-affecting record, one variant per mutation source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationRecord {
    /// Manual stock movement.
    Movement(StockMovement),
    /// Purchase receipt.
    PurchaseReceipt(PurchaseReceipt),
    /// Purchase return.
    PurchaseReturn(PurchaseReturn),
    /// Sales invoice.
    SalesInvoice(SalesInvoice),
    /// Sales return.
    SalesReturn(SalesReturn),
    /// Point-of-sale checkout.
    PosSale(PosSale),
}

impl MutationRecord {
    /// Returns the mutation source of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Movement(_) => RecordKind::Movement,
            Self::PurchaseReceipt(_) => RecordKind::PurchaseReceipt,
            Self::PurchaseReturn(_) => RecordKind::PurchaseReturn,
            Self::SalesInvoice(_) => RecordKind::SalesInvoice,
            Self::SalesReturn(_) => RecordKind::SalesReturn,
            Self::PosSale(_) => RecordKind::PosSale,
        }
    }
}

/// Mutation source discriminant, used to partition the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Manual stock movement.
    Movement,
    /// Purchase receipt.
    PurchaseReceipt,
    /// Purchase return.
    PurchaseReturn,
    /// Sales invoice.
    SalesInvoice,
    /// Sales return.
    SalesReturn,
    /// Point-of-sale checkout.
    PosSale,
}

impl RecordKind {
    /// All record kinds.
    pub const ALL: [Self; 6] = [
        Self::Movement,
        Self::PurchaseReceipt,
        Self::PurchaseReturn,
        Self::SalesInvoice,
        Self::SalesReturn,
        Self::PosSale,
    ];

    /// Returns the wire name of the record kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::PurchaseReceipt => "purchase_receipt",
            Self::PurchaseReturn => "purchase_return",
            Self::SalesInvoice => "sales_invoice",
            Self::SalesReturn => "sales_return",
            Self::PosSale => "pos_sale",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase().replace('-', "_"))
            .ok_or_else(|| format!("Unknown record kind: {s}"))
    }
}

/// Signed quantity change computed by the effect resolver.
///
/// `warehouse_id: None` targets the default warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    /// Item affected.
    pub item_id: ItemId,
    /// Warehouse affected, if the record names one.
    pub warehouse_id: Option<WarehouseId>,
    /// Signed change.
    pub delta: i64,
}

/// Signed quantity change bound to a concrete `(item, warehouse)` bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AppliedDelta {
    /// Item affected.
    pub item_id: ItemId,
    /// Warehouse affected.
    pub warehouse_id: WarehouseId,
    /// Signed change.
    pub delta: i64,
}

/// A mutation record as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Record ID.
    pub id: RecordId,
    /// Field set of the record.
    pub record: MutationRecord,
    /// Free-text reference (e.g. originating invoice number). Audit only.
    pub reference: Option<String>,
    /// Exact bucket deltas last applied for this record.
    pub applied: Vec<AppliedDelta>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp.
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Returns the mutation source of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.record.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, 0, StockLevel::Critical)]
    #[case(10, 10, 0, StockLevel::Critical)]
    #[case(15, 10, 0, StockLevel::Low)]
    #[case(16, 10, 0, StockLevel::Normal)]
    #[case(501, 10, 500, StockLevel::Overstock)]
    #[case(501, 10, 0, StockLevel::Normal)]
    fn test_stock_level_classify(
        #[case] quantity: i64,
        #[case] min: i64,
        #[case] max: i64,
        #[case] expected: StockLevel,
    ) {
        assert_eq!(StockLevel::classify(quantity, min, max), expected);
    }

    #[test]
    fn test_needs_reorder() {
        assert!(StockLevel::Critical.needs_reorder());
        assert!(StockLevel::Low.needs_reorder());
        assert!(!StockLevel::Normal.needs_reorder());
        assert!(!StockLevel::Overstock.needs_reorder());
    }

    #[test]
    fn test_record_kind_round_trip_names() {
        for kind in RecordKind::ALL {
            assert_eq!(kind.as_str().parse::<RecordKind>().unwrap(), kind);
        }
        assert_eq!(
            "sales-invoice".parse::<RecordKind>().unwrap(),
            RecordKind::SalesInvoice
        );
        assert!("stocktake".parse::<RecordKind>().is_err());
    }

    #[test]
    fn test_movement_kind_from_str() {
        assert_eq!("ISSUE".parse::<MovementKind>().unwrap(), MovementKind::Issue);
        assert!("set".parse::<MovementKind>().is_err());
    }

    #[test]
    fn test_movement_kind_deserializes_any_case() {
        let kind: MovementKind = serde_json::from_str("\"Issue\"").unwrap();
        assert_eq!(kind, MovementKind::Issue);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"issue\"");
        assert!(serde_json::from_str::<MovementKind>("\"set\"").is_err());
    }

    #[test]
    fn test_item_totals_across_warehouses() {
        let (w1, w2) = (WarehouseId::new(), WarehouseId::new());
        let item = Item {
            id: ItemId::new(),
            code: "P-200".into(),
            name: "Chocolate biscuits".into(),
            unit_cost: Decimal::new(5, 0),
            unit_price: Decimal::new(8, 0),
            reorder_min: 20,
            reorder_max: 400,
            stock: BTreeMap::from([(w1, 60), (w2, 20)]),
        };
        assert_eq!(item.total_stock(), 80);
        assert_eq!(item.quantity_at(w2), 20);
        assert_eq!(item.quantity_at(WarehouseId::new()), 0);
        assert_eq!(item.level(), StockLevel::Normal);
    }

    #[test]
    fn test_mutation_record_is_tagged_by_kind() {
        let record = MutationRecord::PurchaseReturn(PurchaseReturn {
            item_id: ItemId::new(),
            quantity: 3,
        });
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"purchase_return\""));
        assert_eq!(record.kind(), RecordKind::PurchaseReturn);
    }
}
