use uuid::Uuid;

use super::value_objects::{InventoryItem, ItemQuantity, ItemStatus};

// ============================================================================
// Availability Rule
// ============================================================================
//
// For each requested line:
// - no stock record        → NotFound,           available = 0
// - stock < requested      → NotEnoughAvailable, available = stock
// - otherwise              → Ok,                 available = requested
//
// The aggregate status is Ok only when every line is Ok; NotFound folds into
// NotEnoughAvailable at the aggregate level.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineAvailability {
    pub item_id: Uuid,
    pub available: u64,
    pub status: ItemStatus,
}

impl LineAvailability {
    pub fn evaluate(requested: &ItemQuantity, stock: Option<&InventoryItem>) -> Self {
        match stock {
            None => Self {
                item_id: requested.item_id,
                available: 0,
                status: ItemStatus::NotFound,
            },
            Some(stock) if stock.qty < requested.qty => Self {
                item_id: requested.item_id,
                available: stock.qty,
                status: ItemStatus::NotEnoughAvailable,
            },
            Some(_) => Self {
                item_id: requested.item_id,
                available: requested.qty,
                status: ItemStatus::Ok,
            },
        }
    }
}

/// Reply to an availability check, lines in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityReport {
    pub status: ItemStatus,
    pub lines: Vec<LineAvailability>,
}

impl AvailabilityReport {
    pub fn from_lines(lines: Vec<LineAvailability>) -> Self {
        let status = if lines.iter().all(|line| line.status.is_ok()) {
            ItemStatus::Ok
        } else {
            ItemStatus::NotEnoughAvailable
        };
        Self { status, lines }
    }

    #[cfg(test)]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}
