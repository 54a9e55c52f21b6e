//! Forwards committed ledger changes into a tokio broadcast channel.

use tokio::sync::broadcast;
use tracing::debug;

use stockledger_core::stock::{StockChange, StockObserver};

/// Ledger observer that publishes every change to broadcast subscribers.
pub struct BroadcastObserver {
    sender: broadcast::Sender<StockChange>,
}

impl BroadcastObserver {
    /// Creates an observer publishing on `sender`.
    pub fn new(sender: broadcast::Sender<StockChange>) -> Self {
        Self { sender }
    }
}

impl StockObserver for BroadcastObserver {
    fn on_change(&self, change: &StockChange) {
        // No receivers is not an error; the change is already committed.
        if self.sender.send(change.clone()).is_err() {
            debug!(record_id = %change.record_id, "No change subscribers");
        }
    }
}
