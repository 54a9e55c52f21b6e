//! Warehouse directory routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{error_response, required};
use crate::AppState;
use stockledger_core::stock::{NewWarehouse, StockError, Warehouse};
use stockledger_shared::types::WarehouseId;

/// Creates the warehouse routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/warehouses", get(list_warehouses).post(create_warehouse))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for registering a warehouse.
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    /// Unique short code.
    pub code: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

/// Response for a warehouse.
#[derive(Debug, Serialize)]
pub struct WarehouseResponse {
    /// Warehouse ID.
    pub id: WarehouseId,
    /// Short code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Whether records without a warehouse land here.
    pub is_default: bool,
}

impl WarehouseResponse {
    fn new(warehouse: &Warehouse, default_id: WarehouseId) -> Self {
        Self {
            id: warehouse.id,
            code: warehouse.code.clone(),
            name: warehouse.name.clone(),
            is_default: warehouse.id == default_id,
        }
    }
}

impl TryFrom<CreateWarehouseRequest> for NewWarehouse {
    type Error = StockError;

    fn try_from(req: CreateWarehouseRequest) -> Result<Self, Self::Error> {
        Ok(Self::new(required(req.code, "code")?, required(req.name, "name")?))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/warehouses` - List warehouses.
async fn list_warehouses(State(state): State<AppState>) -> impl IntoResponse {
    let ledger = state.ledger.lock().await;
    let default_id = ledger.default_warehouse_id();
    let warehouses: Vec<WarehouseResponse> = ledger
        .warehouses()
        .map(|w| WarehouseResponse::new(w, default_id))
        .collect();

    (StatusCode::OK, Json(json!({ "warehouses": warehouses })))
}

/// POST `/warehouses` - Register a warehouse.
async fn create_warehouse(
    State(state): State<AppState>,
    Json(payload): Json<CreateWarehouseRequest>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.lock().await;
    let result = NewWarehouse::try_from(payload).and_then(|input| ledger.register_warehouse(input));

    match result {
        Ok(id) => {
            let default_id = ledger.default_warehouse_id();
            let Some(warehouse) = ledger.warehouse(id) else {
                return error_response(&StockError::UnknownWarehouse(id));
            };
            info!(warehouse_id = %id, code = %warehouse.code, "Warehouse created");
            (
                StatusCode::CREATED,
                Json(WarehouseResponse::new(warehouse, default_id)),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn test_list_includes_default() {
        let app = app();

        let (status, body) = send(&app.router, "GET", "/api/v1/warehouses", None).await;

        assert_eq!(status, StatusCode::OK);
        let warehouses = body["warehouses"].as_array().unwrap();
        assert_eq!(warehouses.len(), 2);
        assert!(
            warehouses
                .iter()
                .any(|w| w["code"] == "MAIN" && w["is_default"] == true)
        );
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let app = app();
        let body = json!({ "code": "W2", "name": "South depot" });

        let (status, created) =
            send(&app.router, "POST", "/api/v1/warehouses", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["code"], "W2");
        assert_eq!(created["is_default"], false);

        let (status, error) = send(&app.router, "POST", "/api/v1/warehouses", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["error"], "DUPLICATE_CODE");
    }

    #[tokio::test]
    async fn test_missing_name() {
        let app = app();

        let (status, error) = send(
            &app.router,
            "POST",
            "/api/v1/warehouses",
            Some(json!({ "code": "W3" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "MISSING_REQUIRED_FIELD");
    }
}
