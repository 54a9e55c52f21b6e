//! Item directory routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::{error_response, required};
use crate::AppState;
use stockledger_core::stock::{Item, NewItem, StockError, StockLedger, StockLevel};
use stockledger_shared::types::{ItemId, WarehouseId};

/// Creates the item routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{item_ref}", get(get_item))
        .route("/items/{item_ref}/quantity", get(get_quantity))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing items.
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    /// Only items at or below 1.5x their reorder threshold.
    pub reorder: Option<bool>,
}

/// Query parameters for a quantity lookup.
#[derive(Debug, Deserialize)]
pub struct QuantityQuery {
    /// Warehouse; the total across warehouses when absent.
    pub warehouse_id: Option<WarehouseId>,
}

/// Request body for registering an item.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    /// Unique item code.
    pub code: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Unit cost.
    pub unit_cost: Option<Decimal>,
    /// Unit price.
    pub unit_price: Option<Decimal>,
    /// Reorder threshold.
    pub reorder_min: Option<i64>,
    /// Overstock threshold.
    pub reorder_max: Option<i64>,
    /// Opening stock per warehouse.
    #[serde(default)]
    pub opening_stock: Vec<OpeningStockRequest>,
}

/// Opening stock for one warehouse.
#[derive(Debug, Deserialize)]
pub struct OpeningStockRequest {
    /// Warehouse; the default warehouse when absent.
    pub warehouse_id: Option<WarehouseId>,
    /// Quantity on hand.
    pub quantity: Option<u32>,
}

/// Quantity held in one warehouse.
#[derive(Debug, Serialize)]
pub struct StockBucketResponse {
    /// Warehouse ID.
    pub warehouse_id: WarehouseId,
    /// Warehouse code.
    pub warehouse_code: String,
    /// Quantity on hand.
    pub quantity: i64,
}

/// Response for an item.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Item ID.
    pub id: ItemId,
    /// Item code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Unit cost.
    pub unit_cost: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Reorder threshold.
    pub reorder_min: i64,
    /// Overstock threshold.
    pub reorder_max: i64,
    /// Quantity across all warehouses.
    pub total_stock: i64,
    /// Reorder classification.
    pub level: StockLevel,
    /// Quantity per warehouse.
    pub stock: Vec<StockBucketResponse>,
}

impl ItemResponse {
    fn new(item: &Item, ledger: &StockLedger) -> Self {
        let stock = item
            .stock
            .iter()
            .map(|(&warehouse_id, &quantity)| StockBucketResponse {
                warehouse_id,
                warehouse_code: ledger
                    .warehouse(warehouse_id)
                    .map(|w| w.code.clone())
                    .unwrap_or_default(),
                quantity,
            })
            .collect();

        Self {
            id: item.id,
            code: item.code.clone(),
            name: item.name.clone(),
            unit_cost: item.unit_cost,
            unit_price: item.unit_price,
            reorder_min: item.reorder_min,
            reorder_max: item.reorder_max,
            total_stock: item.total_stock(),
            level: item.level(),
            stock,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/items` - List items with quantities.
async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListItemsQuery>,
) -> impl IntoResponse {
    let ledger = state.ledger.lock().await;
    let reorder_only = query.reorder.unwrap_or(false);
    let items: Vec<ItemResponse> = ledger
        .items()
        .filter(|item| !reorder_only || item.level().needs_reorder())
        .map(|item| ItemResponse::new(item, &ledger))
        .collect();

    (StatusCode::OK, Json(json!({ "items": items })))
}

/// POST `/items` - Register an item, optionally with opening stock.
async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> impl IntoResponse {
    let mut ledger = state.ledger.lock().await;

    match register_item(&mut ledger, payload) {
        Ok(id) => {
            let Some(item) = ledger.item(id) else {
                return error_response(&StockError::UnknownItem(id));
            };
            info!(item_id = %id, code = %item.code, "Item created");
            (StatusCode::CREATED, Json(ItemResponse::new(item, &ledger))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// GET `/items/{item_ref}` - Look up an item by ID, code, or name.
async fn get_item(State(state): State<AppState>, Path(item_ref): Path<String>) -> Response {
    let ledger = state.ledger.lock().await;
    match ledger.find_item(&item_ref) {
        Some(item) => (StatusCode::OK, Json(ItemResponse::new(item, &ledger))).into_response(),
        None => item_not_found(&item_ref),
    }
}

/// GET `/items/{item_ref}/quantity` - Quantity in one warehouse or in total.
async fn get_quantity(
    State(state): State<AppState>,
    Path(item_ref): Path<String>,
    Query(query): Query<QuantityQuery>,
) -> Response {
    let ledger = state.ledger.lock().await;
    let Some(item_id) = ledger.find_item(&item_ref).map(|item| item.id) else {
        return item_not_found(&item_ref);
    };

    match ledger.get_quantity(item_id, query.warehouse_id) {
        Ok(quantity) => (
            StatusCode::OK,
            Json(json!({
                "item_id": item_id,
                "warehouse_id": query.warehouse_id,
                "quantity": quantity
            })),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Validates the opening stock, then registers the item and records it.
fn register_item(ledger: &mut StockLedger, req: CreateItemRequest) -> Result<ItemId, StockError> {
    let input = NewItem::new(required(req.code, "code")?, required(req.name, "name")?)
        .with_prices(
            req.unit_cost.unwrap_or_default(),
            req.unit_price.unwrap_or_default(),
        )
        .with_thresholds(req.reorder_min.unwrap_or(0), req.reorder_max.unwrap_or(0));

    let mut opening = Vec::with_capacity(req.opening_stock.len());
    for entry in req.opening_stock {
        let quantity = required(entry.quantity, "opening_stock.quantity")?;
        if let Some(warehouse_id) = entry.warehouse_id {
            if ledger.warehouse(warehouse_id).is_none() {
                return Err(StockError::UnknownWarehouse(warehouse_id));
            }
        }
        opening.push((entry.warehouse_id, i64::from(quantity)));
    }

    let id = ledger.register_item(input)?;
    for (warehouse_id, quantity) in opening {
        if quantity > 0 {
            ledger.record_opening_stock(id, warehouse_id, quantity)?;
        }
    }
    Ok(id)
}

fn item_not_found(item_ref: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "UNKNOWN_ITEM",
            "message": format!("Unknown item: {item_ref}")
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn test_lookup_by_code_and_name() {
        let app = app();

        let (status, body) = send(&app.router, "GET", "/api/v1/items/P-100", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], app.item.to_string());
        assert_eq!(body["total_stock"], 150);
        assert_eq!(body["level"], "normal");

        let (status, body) = send(
            &app.router,
            "GET",
            "/api/v1/items/Mineral%20water%201.5L",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], "P-100");
    }

    #[tokio::test]
    async fn test_unknown_item_ref() {
        let app = app();

        let (status, body) = send(&app.router, "GET", "/api/v1/items/P-999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "UNKNOWN_ITEM");
    }

    #[tokio::test]
    async fn test_quantity_per_warehouse_and_total() {
        let app = app();

        let (status, body) = send(
            &app.router,
            "GET",
            &format!("/api/v1/items/{}/quantity?warehouse_id={}", app.item, app.depot),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantity"], 0);

        let (_, body) = send(&app.router, "GET", "/api/v1/items/P-100/quantity", None).await;
        assert_eq!(body["quantity"], 150);
        assert!(body["warehouse_id"].is_null());
    }

    #[tokio::test]
    async fn test_create_with_opening_stock() {
        let app = app();

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/items",
            Some(json!({
                "code": "P-200",
                "name": "Chocolate biscuits",
                "unit_cost": "5000",
                "unit_price": "8000",
                "reorder_min": 20,
                "reorder_max": 400,
                "opening_stock": [
                    { "quantity": 60 },
                    { "warehouse_id": app.depot, "quantity": 20 }
                ]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["total_stock"], 80);
        assert_eq!(body["stock"].as_array().unwrap().len(), 2);
        assert_eq!(body["unit_price"], "8000");
    }

    #[tokio::test]
    async fn test_create_with_bad_opening_registers_nothing() {
        let app = app();

        let (status, body) = send(
            &app.router,
            "POST",
            "/api/v1/items",
            Some(json!({
                "code": "P-300",
                "name": "Instant noodles",
                "opening_stock": [{ "warehouse_id": app.main }]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "MISSING_REQUIRED_FIELD");
        let (status, _) = send(&app.router, "GET", "/api/v1/items/P-300", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reorder_filter() {
        let app = app();
        send(
            &app.router,
            "POST",
            "/api/v1/items",
            Some(json!({ "code": "P-400", "name": "Rice 5kg", "reorder_min": 5 })),
        )
        .await;

        let (_, body) = send(&app.router, "GET", "/api/v1/items?reorder=true", None).await;

        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["code"], "P-400");
        assert_eq!(items[0]["level"], "critical");
    }
}
