//! Mutation record routes: one create endpoint per source, plus
//! get, edit, delete, and listing of stored records.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::{error_response, required};
use crate::AppState;
use stockledger_core::stock::{
    LineItem, MovementKind, MutationRecord, PosLine, PosSale, PurchaseReceipt, PurchaseReturn,
    RecordKind, SalesInvoice, SalesReturn, StockError, StockMovement,
};
use stockledger_shared::types::{ItemId, PageRequest, RecordId, WarehouseId};

/// Creates the record routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movements", post(create_movement))
        .route("/purchase-receipts", post(create_purchase_receipt))
        .route("/purchase-returns", post(create_purchase_return))
        .route("/sales-invoices", post(create_sales_invoice))
        .route("/sales-returns", post(create_sales_return))
        .route("/pos-sales", post(create_pos_sale))
        .route("/records", get(list_records))
        .route(
            "/records/{record_id}",
            get(get_record).put(edit_record).delete(delete_record),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for listing records.
#[derive(Debug, Deserialize)]
pub struct ListRecordsQuery {
    /// Filter by record kind (e.g. `sales_invoice` or `sales-invoice`).
    pub kind: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default: 20, max: 100).
    pub per_page: Option<u32>,
}

/// Request body for a manual stock movement.
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    /// Movement type: add, issue, transfer, adjust.
    #[serde(rename = "type")]
    pub movement_type: Option<MovementKind>,
    /// Item moved.
    pub item_id: Option<ItemId>,
    /// Quantity; signed for `adjust`.
    pub quantity: Option<i64>,
    /// Warehouse goods leave.
    pub source_warehouse_id: Option<WarehouseId>,
    /// Warehouse goods enter.
    pub dest_warehouse_id: Option<WarehouseId>,
    /// Free-text reference.
    pub reference: Option<String>,
}

/// Request body for a purchase receipt.
#[derive(Debug, Deserialize)]
pub struct PurchaseReceiptRequest {
    /// Item received.
    pub item_id: Option<ItemId>,
    /// Quantity received.
    pub quantity: Option<i64>,
    /// Receiving warehouse.
    pub warehouse_id: Option<WarehouseId>,
    /// Free-text reference.
    pub reference: Option<String>,
}

/// Request body for a purchase return.
#[derive(Debug, Deserialize)]
pub struct PurchaseReturnRequest {
    /// Item returned.
    pub item_id: Option<ItemId>,
    /// Quantity returned.
    pub quantity: Option<i64>,
    /// Free-text reference.
    pub reference: Option<String>,
}

/// One `(item, quantity)` line.
#[derive(Debug, Deserialize)]
pub struct LineRequest {
    /// Item.
    pub item_id: Option<ItemId>,
    /// Quantity.
    pub quantity: Option<i64>,
}

/// Request body for a sales invoice.
#[derive(Debug, Deserialize)]
pub struct SalesInvoiceRequest {
    /// Invoice lines.
    pub lines: Option<Vec<LineRequest>>,
    /// Shipping warehouse.
    pub warehouse_id: Option<WarehouseId>,
    /// Free-text reference.
    pub reference: Option<String>,
}

/// Request body for a sales return.
#[derive(Debug, Deserialize)]
pub struct SalesReturnRequest {
    /// Returned lines.
    pub lines: Option<Vec<LineRequest>>,
    /// Originating invoice number or other reference.
    pub reference: Option<String>,
}

/// One point-of-sale cart line.
#[derive(Debug, Deserialize)]
pub struct PosLineRequest {
    /// Item sold.
    pub item_id: Option<ItemId>,
    /// Quantity.
    pub quantity: Option<i64>,
    /// Warehouse the goods are taken from.
    pub warehouse_id: Option<WarehouseId>,
}

/// Request body for a point-of-sale checkout.
#[derive(Debug, Deserialize)]
pub struct PosSaleRequest {
    /// Cart lines.
    pub lines: Option<Vec<PosLineRequest>>,
    /// Free-text reference.
    pub reference: Option<String>,
}

/// Request body for editing a record: new fields tagged by record kind.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditRecordRequest {
    /// Manual stock movement.
    Movement(MovementRequest),
    /// Purchase receipt.
    PurchaseReceipt(PurchaseReceiptRequest),
    /// Purchase return.
    PurchaseReturn(PurchaseReturnRequest),
    /// Sales invoice.
    SalesInvoice(SalesInvoiceRequest),
    /// Sales return.
    SalesReturn(SalesReturnRequest),
    /// Point-of-sale checkout.
    PosSale(PosSaleRequest),
}

// ============================================================================
// Request Conversion
// ============================================================================

impl TryFrom<MovementRequest> for MutationRecord {
    type Error = StockError;

    fn try_from(req: MovementRequest) -> Result<Self, Self::Error> {
        Ok(Self::Movement(StockMovement {
            movement_type: required(req.movement_type, "type")?,
            item_id: required(req.item_id, "item_id")?,
            quantity: required(req.quantity, "quantity")?,
            source_warehouse_id: req.source_warehouse_id,
            dest_warehouse_id: req.dest_warehouse_id,
        }))
    }
}

impl TryFrom<PurchaseReceiptRequest> for MutationRecord {
    type Error = StockError;

    fn try_from(req: PurchaseReceiptRequest) -> Result<Self, Self::Error> {
        Ok(Self::PurchaseReceipt(PurchaseReceipt {
            item_id: required(req.item_id, "item_id")?,
            quantity: required(req.quantity, "quantity")?,
            warehouse_id: required(req.warehouse_id, "warehouse_id")?,
        }))
    }
}

impl TryFrom<PurchaseReturnRequest> for MutationRecord {
    type Error = StockError;

    fn try_from(req: PurchaseReturnRequest) -> Result<Self, Self::Error> {
        Ok(Self::PurchaseReturn(PurchaseReturn {
            item_id: required(req.item_id, "item_id")?,
            quantity: required(req.quantity, "quantity")?,
        }))
    }
}

impl TryFrom<SalesInvoiceRequest> for MutationRecord {
    type Error = StockError;

    fn try_from(req: SalesInvoiceRequest) -> Result<Self, Self::Error> {
        Ok(Self::SalesInvoice(SalesInvoice {
            lines: lines(req.lines)?,
            warehouse_id: req.warehouse_id,
        }))
    }
}

impl TryFrom<SalesReturnRequest> for MutationRecord {
    type Error = StockError;

    fn try_from(req: SalesReturnRequest) -> Result<Self, Self::Error> {
        Ok(Self::SalesReturn(SalesReturn {
            lines: lines(req.lines)?,
        }))
    }
}

impl TryFrom<PosSaleRequest> for MutationRecord {
    type Error = StockError;

    fn try_from(req: PosSaleRequest) -> Result<Self, Self::Error> {
        let lines = required(req.lines, "lines")?
            .into_iter()
            .map(|line| {
                Ok(PosLine {
                    item_id: required(line.item_id, "lines.item_id")?,
                    quantity: required(line.quantity, "lines.quantity")?,
                    warehouse_id: required(line.warehouse_id, "lines.warehouse_id")?,
                })
            })
            .collect::<Result<_, StockError>>()?;
        Ok(Self::PosSale(PosSale { lines }))
    }
}

impl TryFrom<EditRecordRequest> for MutationRecord {
    type Error = StockError;

    fn try_from(req: EditRecordRequest) -> Result<Self, Self::Error> {
        match req {
            EditRecordRequest::Movement(r) => r.try_into(),
            EditRecordRequest::PurchaseReceipt(r) => r.try_into(),
            EditRecordRequest::PurchaseReturn(r) => r.try_into(),
            EditRecordRequest::SalesInvoice(r) => r.try_into(),
            EditRecordRequest::SalesReturn(r) => r.try_into(),
            EditRecordRequest::PosSale(r) => r.try_into(),
        }
    }
}

fn lines(lines: Option<Vec<LineRequest>>) -> Result<Vec<LineItem>, StockError> {
    required(lines, "lines")?
        .into_iter()
        .map(|line| {
            Ok(LineItem::new(
                required(line.item_id, "lines.item_id")?,
                required(line.quantity, "lines.quantity")?,
            ))
        })
        .collect()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST `/movements` - Record a manual stock movement.
async fn create_movement(
    State(state): State<AppState>,
    Json(payload): Json<MovementRequest>,
) -> Response {
    let reference = payload.reference.clone();
    create(&state, payload.try_into(), reference).await
}

/// POST `/purchase-receipts` - Record goods received from a supplier.
async fn create_purchase_receipt(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseReceiptRequest>,
) -> Response {
    let reference = payload.reference.clone();
    create(&state, payload.try_into(), reference).await
}

/// POST `/purchase-returns` - Record goods returned to a supplier.
async fn create_purchase_return(
    State(state): State<AppState>,
    Json(payload): Json<PurchaseReturnRequest>,
) -> Response {
    let reference = payload.reference.clone();
    create(&state, payload.try_into(), reference).await
}

/// POST `/sales-invoices` - Record a sales invoice.
async fn create_sales_invoice(
    State(state): State<AppState>,
    Json(payload): Json<SalesInvoiceRequest>,
) -> Response {
    let reference = payload.reference.clone();
    create(&state, payload.try_into(), reference).await
}

/// POST `/sales-returns` - Record goods returned by a customer.
async fn create_sales_return(
    State(state): State<AppState>,
    Json(payload): Json<SalesReturnRequest>,
) -> Response {
    let reference = payload.reference.clone();
    create(&state, payload.try_into(), reference).await
}

/// POST `/pos-sales` - Record a point-of-sale checkout.
async fn create_pos_sale(
    State(state): State<AppState>,
    Json(payload): Json<PosSaleRequest>,
) -> Response {
    let reference = payload.reference.clone();
    create(&state, payload.try_into(), reference).await
}

/// GET `/records` - List stored records, newest last.
async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<ListRecordsQuery>,
) -> Response {
    let kind = match query.kind.as_deref().map(str::parse::<RecordKind>).transpose() {
        Ok(kind) => kind,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "INVALID_RECORD_KIND",
                    "message": message
                })),
            )
                .into_response();
        }
    };
    let page = PageRequest::new(query.page.unwrap_or(1), query.per_page.unwrap_or(20));

    match state.ledger.lock().await.records(kind) {
        Ok(records) => (StatusCode::OK, Json(page.paginate(records))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET `/records/{record_id}` - Fetch a stored record.
async fn get_record(State(state): State<AppState>, Path(record_id): Path<RecordId>) -> Response {
    match state.ledger.lock().await.record(record_id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// PUT `/records/{record_id}` - Replace a record's fields.
async fn edit_record(
    State(state): State<AppState>,
    Path(record_id): Path<RecordId>,
    Json(payload): Json<EditRecordRequest>,
) -> Response {
    let mut ledger = state.ledger.lock().await;
    let result = MutationRecord::try_from(payload)
        .and_then(|record| ledger.edit_record(record_id, record))
        .and_then(|()| ledger.record(record_id));

    match result {
        Ok(record) => {
            info!(record_id = %record_id, "Record edited");
            (StatusCode::OK, Json(record)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// DELETE `/records/{record_id}` - Delete a record and revert its effect.
async fn delete_record(
    State(state): State<AppState>,
    Path(record_id): Path<RecordId>,
) -> Response {
    match state.ledger.lock().await.delete_record(record_id) {
        Ok(()) => {
            info!(record_id = %record_id, "Record deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn create(
    state: &AppState,
    record: Result<MutationRecord, StockError>,
    reference: Option<String>,
) -> Response {
    let mut ledger = state.ledger.lock().await;
    let result = record
        .and_then(|record| ledger.create(record, reference))
        .and_then(|id| ledger.record(id));

    match result {
        Ok(record) => {
            info!(record_id = %record.id, kind = %record.kind(), "Record created");
            (StatusCode::CREATED, Json(record)).into_response()
        }
        Err(e) => error_response(&e),
    }
}
