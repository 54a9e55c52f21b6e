//! HTTP API layer with Axum routes over the stock ledger.
//!
//! This crate provides:
//! - REST API routes for directories, records, and the audit journal
//! - A broadcast observer forwarding committed changes to subscribers
//! - Error responses mapped from `StockError`

pub mod notify;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::sync::{Mutex, broadcast};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use notify::BroadcastObserver;
use stockledger_core::stock::{StockChange, StockLedger};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The single ledger engine; the mutex serializes every request.
    pub ledger: Arc<Mutex<StockLedger>>,
    /// Committed stock changes, for dependent views.
    pub changes: broadcast::Sender<StockChange>,
}

impl AppState {
    /// Wraps a ledger and wires its change notifications into a broadcast
    /// channel holding up to `capacity` undelivered changes.
    pub fn new(mut ledger: StockLedger, capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity.max(1));
        ledger.subscribe(Arc::new(BroadcastObserver::new(changes.clone())));
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            changes,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
