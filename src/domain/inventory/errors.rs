use uuid::Uuid;

// ============================================================================
// Inventory Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Malformed item identifier: {0:?}")]
    MalformedItemId(String),

    #[error("Quantity for item {0} must be positive")]
    InvalidQuantity(Uuid),

    #[error("Request contains no items")]
    EmptyRequest,

    #[error("Availability reply has {actual} lines, order has {expected}")]
    LineCountMismatch { expected: usize, actual: usize },

    #[error("Availability line {index} is for item {actual}, expected {expected}")]
    LineItemMismatch {
        index: usize,
        expected: Uuid,
        actual: Uuid,
    },

    #[error("Availability line {0} carries no item")]
    MissingLine(usize),

    #[error("Unknown item status ordinal: {0}")]
    UnknownStatus(i32),
}
