//! Audit journal routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;
use stockledger_core::stock::JournalEntry;
use stockledger_shared::types::RecordId;

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal", get(list_entries))
        .route("/journal/reconcile", get(reconcile))
}

/// Query parameters for the journal.
#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    /// Only entries for this record.
    pub record_id: Option<RecordId>,
}

/// GET `/journal` - Audit trail of every quantity change.
async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<JournalQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.lock().await;
    let entries: Vec<&JournalEntry> = match query.record_id {
        Some(record_id) => ledger.journal().entries_for(record_id).collect(),
        None => ledger.journal().entries().iter().collect(),
    };

    (StatusCode::OK, Json(json!({ "entries": entries })))
}

/// GET `/journal/reconcile` - Buckets where directory and journal disagree.
async fn reconcile(State(state): State<AppState>) -> impl IntoResponse {
    let discrepancies = state.ledger.lock().await.reconcile();
    (
        StatusCode::OK,
        Json(json!({
            "reconciled": discrepancies.is_empty(),
            "discrepancies": discrepancies
        })),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn test_journal_for_record() {
        let app = app();
        let (_, created) = send(
            &app.router,
            "POST",
            "/api/v1/sales-returns",
            Some(json!({ "lines": [{ "item_id": app.item, "quantity": 4 }] })),
        )
        .await;
        let id = created["id"].as_str().unwrap();
        send(&app.router, "DELETE", &format!("/api/v1/records/{id}"), None).await;

        let (status, body) = send(&app.router, "GET", "/api/v1/journal", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["entries"].as_array().unwrap().len(), 3);
        assert_eq!(body["entries"][0]["action"], "opening");

        let (_, body) = send(
            &app.router,
            "GET",
            &format!("/api/v1/journal?record_id={id}"),
            None,
        )
        .await;
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["action"], "reverted");
        assert_eq!(entries[1]["deltas"][0]["delta"], 4);
    }

    #[tokio::test]
    async fn test_reconcile_is_clean() {
        let app = app();

        let (status, body) = send(&app.router, "GET", "/api/v1/journal/reconcile", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reconciled"], true);
        assert!(body["discrepancies"].as_array().unwrap().is_empty());
    }
}
