//! Append-only journal of applied deltas.
//!
//! Every quantity change the ledger makes is journalled, so replaying the
//! journal reproduces the item directory. [`StockJournal::reconcile`]
//! compares the two and reports any bucket that disagrees.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stockledger_shared::types::{ItemId, RecordId, WarehouseId};

use super::directory::ItemDirectory;
use super::types::{AppliedDelta, RecordKind};

/// What a journal entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalAction {
    /// Opening stock set at registration time.
    Opening,
    /// A record's deltas were applied.
    Applied,
    /// A record's deltas were reverted.
    Reverted,
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Monotonic sequence number, starting at 1.
    pub sequence: u64,
    /// What happened.
    pub action: JournalAction,
    /// Record responsible; `None` for opening stock.
    pub record_id: Option<RecordId>,
    /// Kind of the responsible record.
    pub kind: Option<RecordKind>,
    /// The record's bucket deltas; a `Reverted` entry undoes them.
    pub deltas: Vec<AppliedDelta>,
    /// When the entry was written.
    pub recorded_at: DateTime<Utc>,
}

/// A bucket whose journal total disagrees with the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    /// Item.
    pub item_id: ItemId,
    /// Warehouse.
    pub warehouse_id: WarehouseId,
    /// Sum of journalled deltas.
    pub journal: i64,
    /// Quantity held by the directory.
    pub directory: i64,
}

/// Append-only journal.
#[derive(Debug, Clone, Default)]
pub struct StockJournal {
    entries: Vec<JournalEntry>,
}

impl StockJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns its sequence number.
    pub fn append(
        &mut self,
        action: JournalAction,
        record: Option<(RecordId, RecordKind)>,
        deltas: Vec<AppliedDelta>,
    ) -> u64 {
        let sequence = self.entries.len() as u64 + 1;
        self.entries.push(JournalEntry {
            sequence,
            action,
            record_id: record.map(|(id, _)| id),
            kind: record.map(|(_, kind)| kind),
            deltas,
            recorded_at: Utc::now(),
        });
        sequence
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries for one record, in order.
    pub fn entries_for(&self, record_id: RecordId) -> impl Iterator<Item = &JournalEntry> {
        self.entries
            .iter()
            .filter(move |e| e.record_id == Some(record_id))
    }

    /// Sum of journalled deltas per bucket.
    #[must_use]
    pub fn balances(&self) -> BTreeMap<(ItemId, WarehouseId), i64> {
        let mut balances = BTreeMap::new();
        for entry in &self.entries {
            for d in &entry.deltas {
                let slot = balances.entry((d.item_id, d.warehouse_id)).or_insert(0_i64);
                *slot = match entry.action {
                    JournalAction::Opening | JournalAction::Applied => slot.saturating_add(d.delta),
                    JournalAction::Reverted => slot.saturating_sub(d.delta),
                };
            }
        }
        balances
    }

    /// Compares journal balances with the directory.
    #[must_use]
    pub fn reconcile(&self, items: &ItemDirectory) -> Vec<Discrepancy> {
        let mut buckets = self.balances();
        for item in items.list() {
            for warehouse_id in item.stock.keys() {
                buckets.entry((item.id, *warehouse_id)).or_insert(0);
            }
        }

        buckets
            .into_iter()
            .filter_map(|((item_id, warehouse_id), journal)| {
                let directory = items
                    .get(item_id)
                    .map_or(0, |item| item.quantity_at(warehouse_id));
                (journal != directory).then_some(Discrepancy {
                    item_id,
                    warehouse_id,
                    journal,
                    directory,
                })
            })
            .collect()
    }
}
