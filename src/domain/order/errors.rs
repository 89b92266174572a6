use uuid::Uuid;

use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Item {0} must have a positive cost")]
    InvalidCost(Uuid),

    #[error("Item {0} must have a positive quantity")]
    InvalidQuantity(Uuid),

    #[error("Unknown order status ordinal: {0}")]
    UnknownStatus(u8),

    #[error("Order items cannot be modified in status: {0}")]
    NotModifiable(OrderStatus),

    #[error("Order line {0} does not exist")]
    LineOutOfRange(usize),

    #[error("Order total overflows at item {0}")]
    Overflow(Uuid),
}
