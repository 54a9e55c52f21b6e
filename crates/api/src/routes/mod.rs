//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::AppState;
use stockledger_core::stock::StockError;

pub mod health;
pub mod items;
pub mod journal;
pub mod records;
pub mod warehouses;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(warehouses::routes())
        .merge(items::routes())
        .merge(records::routes())
        .merge(journal::routes())
}

/// Maps a ledger error to `{"error": CODE, "message": text}`.
pub(crate) fn error_response(err: &StockError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %err, "Ledger operation failed");
        return (
            status,
            Json(json!({
                "error": err.error_code(),
                "message": "An error occurred"
            })),
        )
            .into_response();
    }

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Unwraps a required request field.
pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, StockError> {
    value.ok_or(StockError::MissingRequiredField(field))
}


#[cfg(test)]
mod tests {
    use super::*;
    use stockledger_shared::types::ItemId;

    #[test]
    fn test_error_response_status() {
        let response = error_response(&StockError::UnknownItem(ItemId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = error_response(&StockError::storage("disk full"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_required_field() {
        assert_eq!(required(Some(3), "quantity"), Ok(3));
        assert_eq!(
            required::<i64>(None, "quantity"),
            Err(StockError::MissingRequiredField("quantity"))
        );
    }
}
