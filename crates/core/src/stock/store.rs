//! Record persistence.

use std::collections::{BTreeMap, HashMap};

use stockledger_shared::types::RecordId;

use super::error::StockError;
use super::types::{RecordKind, StoredRecord};

/// Repository trait for mutation record persistence.
///
/// The ledger writes a record before touching quantities and removes or
/// restores it if the quantity update fails, so implementations only need
/// single-record atomicity.
pub trait RecordStore: Send + Sync {
    /// Find a record by ID.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend fails.
    fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, StockError>;

    /// Insert or replace a record.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend fails.
    fn put(&mut self, record: StoredRecord) -> Result<(), StockError>;

    /// Remove a record, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend fails.
    fn remove(&mut self, id: RecordId) -> Result<Option<StoredRecord>, StockError>;

    /// List records in creation order, optionally restricted to one kind.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the backend fails.
    fn list(&self, kind: Option<RecordKind>) -> Result<Vec<StoredRecord>, StockError>;
}

/// In-memory record store partitioned by mutation source.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    partitions: HashMap<RecordKind, BTreeMap<RecordId, StoredRecord>>,
    index: HashMap<RecordId, RecordKind>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, id: RecordId) -> Result<Option<StoredRecord>, StockError> {
        Ok(self
            .index
            .get(&id)
            .and_then(|kind| self.partitions.get(kind))
            .and_then(|partition| partition.get(&id))
            .cloned())
    }

    fn put(&mut self, record: StoredRecord) -> Result<(), StockError> {
        let kind = record.kind();
        if let Some(previous) = self.index.insert(record.id, kind) {
            if previous != kind {
                if let Some(partition) = self.partitions.get_mut(&previous) {
                    partition.remove(&record.id);
                }
            }
        }
        self.partitions
            .entry(kind)
            .or_default()
            .insert(record.id, record);
        Ok(())
    }

    fn remove(&mut self, id: RecordId) -> Result<Option<StoredRecord>, StockError> {
        Ok(self
            .index
            .remove(&id)
            .and_then(|kind| self.partitions.get_mut(&kind))
            .and_then(|partition| partition.remove(&id)))
    }

    fn list(&self, kind: Option<RecordKind>) -> Result<Vec<StoredRecord>, StockError> {
        // v7 IDs sort by creation time.
        let mut records: Vec<StoredRecord> = match kind {
            Some(kind) => self
                .partitions
                .get(&kind)
                .map(|partition| partition.values().cloned().collect())
                .unwrap_or_default(),
            None => self
                .partitions
                .values()
                .flat_map(|partition| partition.values().cloned())
                .collect(),
        };
        records.sort_by_key(|r| (r.created_at, r.id));
        Ok(records)
    }
}
