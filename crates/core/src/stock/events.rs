//! Change notifications for subscribers.

use serde::{Deserialize, Serialize};
use stockledger_shared::types::RecordId;

use super::types::{AppliedDelta, RecordKind};

/// What happened to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// Record created and its deltas applied.
    Created,
    /// Record edited; `deltas` is the net change.
    Edited,
    /// Record deleted and its deltas reverted.
    Deleted,
}

/// A committed quantity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockChange {
    /// Record responsible.
    pub record_id: RecordId,
    /// Kind of the record.
    pub kind: RecordKind,
    /// What happened.
    pub action: ChangeAction,
    /// Net bucket deltas committed to the directory.
    pub deltas: Vec<AppliedDelta>,
}

/// Receives committed changes. Called only after a mutation succeeds.
pub trait StockObserver: Send + Sync {
    /// Handle one committed change.
    fn on_change(&self, change: &StockChange);
}
