//! Stock ledger error types.
//!
//! Every rejected operation returns one of these and leaves the item
//! directory exactly as it was before the call.

use stockledger_shared::AppError;
use stockledger_shared::types::{ItemId, RecordId, WarehouseId};
use thiserror::Error;

use super::types::RecordKind;

/// Errors that can occur during stock ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    // ========== Validation Errors ==========
    /// Quantity is zero, negative where it must be positive, or overflows.
    #[error("Invalid quantity {quantity} for item {item_id}")]
    InvalidQuantity {
        /// The offending item.
        item_id: ItemId,
        /// The rejected quantity.
        quantity: i64,
    },

    /// A field the record kind requires was not supplied.
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// A transfer names the same warehouse as source and destination.
    #[error("Transfer source and destination are the same warehouse: {0}")]
    SameWarehouseTransfer(WarehouseId),

    /// An edit tried to change the mutation source of a record.
    #[error("Cannot edit a {expected} record into a {found} record")]
    RecordKindMismatch {
        /// Kind of the stored record.
        expected: RecordKind,
        /// Kind of the submitted fields.
        found: RecordKind,
    },

    // ========== Directory Errors ==========
    /// Item not found.
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// Warehouse not found.
    #[error("Unknown warehouse: {0}")]
    UnknownWarehouse(WarehouseId),

    /// Item or warehouse code already registered.
    #[error("Code already registered: {0}")]
    DuplicateCode(String),

    /// Mutation record not found.
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    // ========== Stock Errors ==========
    /// The operation would leave a bucket below zero.
    #[error(
        "Insufficient stock for item {item_id} in warehouse {warehouse_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientStock {
        /// The item short of stock.
        item_id: ItemId,
        /// The warehouse short of stock.
        warehouse_id: WarehouseId,
        /// Quantity currently on hand in the bucket.
        available: i64,
        /// Net quantity the operation would remove from the bucket.
        requested: i64,
    },

    // ========== Concurrency Errors ==========
    /// Reserved for a multi-writer guard; the single-process engine never returns it.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Storage Errors ==========
    /// The record store failed.
    #[error("Record store error: {0}")]
    Storage(String),
}

impl StockError {
    /// Create a storage error.
    #[must_use]
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::MissingRequiredField(_) => "MISSING_REQUIRED_FIELD",
            Self::SameWarehouseTransfer(_) => "SAME_WAREHOUSE_TRANSFER",
            Self::RecordKindMismatch { .. } => "RECORD_KIND_MISMATCH",
            Self::UnknownItem(_) => "UNKNOWN_ITEM",
            Self::UnknownWarehouse(_) => "UNKNOWN_WAREHOUSE",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::RecordNotFound(_) => "RECORD_NOT_FOUND",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed records
            Self::InvalidQuantity { .. }
            | Self::MissingRequiredField(_)
            | Self::SameWarehouseTransfer(_)
            | Self::RecordKindMismatch { .. } => 400,

            // 404 Not Found
            Self::UnknownItem(_) | Self::UnknownWarehouse(_) | Self::RecordNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateCode(_) | Self::ConcurrentModification => 409,

            // 422 Unprocessable - business rule
            Self::InsufficientStock { .. } => 422,

            // 500 Internal Server Error
            Self::Storage(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        let message = err.to_string();
        match err {
            StockError::InvalidQuantity { .. }
            | StockError::MissingRequiredField(_)
            | StockError::SameWarehouseTransfer(_)
            | StockError::RecordKindMismatch { .. } => Self::Validation(message),
            StockError::UnknownItem(_)
            | StockError::UnknownWarehouse(_)
            | StockError::RecordNotFound(_) => Self::NotFound(message),
            StockError::DuplicateCode(_) | StockError::ConcurrentModification => {
                Self::Conflict(message)
            }
            StockError::InsufficientStock { .. } => Self::BusinessRule(message),
            StockError::Storage(_) => Self::Storage(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn insufficient() -> StockError {
        StockError::InsufficientStock {
            item_id: ItemId::from_uuid(Uuid::nil()),
            warehouse_id: WarehouseId::from_uuid(Uuid::nil()),
            available: 170,
            requested: 200,
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(insufficient().error_code(), "INSUFFICIENT_STOCK");
        assert_eq!(
            StockError::MissingRequiredField("lines").error_code(),
            "MISSING_REQUIRED_FIELD"
        );
        assert_eq!(
            StockError::UnknownWarehouse(WarehouseId::new()).error_code(),
            "UNKNOWN_WAREHOUSE"
        );
        assert_eq!(
            StockError::ConcurrentModification.error_code(),
            "CONCURRENT_MODIFICATION"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            StockError::InvalidQuantity {
                item_id: ItemId::new(),
                quantity: 0
            }
            .http_status_code(),
            400
        );
        assert_eq!(StockError::UnknownItem(ItemId::new()).http_status_code(), 404);
        assert_eq!(StockError::RecordNotFound(RecordId::new()).http_status_code(), 404);
        assert_eq!(StockError::DuplicateCode("P-100".into()).http_status_code(), 409);
        assert_eq!(insufficient().http_status_code(), 422);
        assert_eq!(StockError::storage("disk full").http_status_code(), 500);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(StockError::ConcurrentModification.is_retryable());
        assert!(!insufficient().is_retryable());
    }

    #[test]
    fn test_error_display() {
        let nil = Uuid::nil();
        assert_eq!(
            insufficient().to_string(),
            format!(
                "Insufficient stock for item {nil} in warehouse {nil}: available 170, requested 200"
            )
        );
        assert_eq!(
            StockError::RecordKindMismatch {
                expected: RecordKind::Movement,
                found: RecordKind::SalesInvoice,
            }
            .to_string(),
            "Cannot edit a movement record into a sales_invoice record"
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = insufficient().into();
        assert_eq!(app.status_code(), 422);

        let app: AppError = StockError::UnknownItem(ItemId::new()).into();
        assert_eq!(app.error_code(), "NOT_FOUND");
    }
}
