use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;
use super::value_objects::{OrderItem, OrderStatus};

// ============================================================================
// Order - the unit the scheduler drives through its lifecycle
// ============================================================================
//
// Invariants:
// - `status_message` always mirrors `status`
// - `sum` always equals the sum of `cost * qty` over `order_list`
//
// Both are recomputed on every mutation and on every decode, so a record
// written by another service can never smuggle in a stale total.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OrderRecord")]
pub struct Order {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub status_message: String,
    pub sum: u64,
    pub order_list: Vec<OrderItem>,
}

impl Order {
    /// Creation use case: fresh identifier, `Created` status, validated lines.
    pub fn new(items: Vec<OrderItem>) -> Result<Self, OrderError> {
        Self::validate_items(&items)?;

        let mut order = Self {
            order_id: Uuid::new_v4(),
            status: OrderStatus::Created,
            status_message: String::new(),
            sum: 0,
            order_list: items,
        };
        order.recalculate();
        Ok(order)
    }

    pub fn validate_items(items: &[OrderItem]) -> Result<(), OrderError> {
        if items.is_empty() {
            return Err(OrderError::EmptyItems);
        }
        items.iter().try_fold(0u64, |total, item| {
            item.validate()?;
            total
                .checked_add(item.checked_sum()?)
                .ok_or(OrderError::Overflow(item.item_id))
        })?;
        Ok(())
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.recalculate();
    }

    /// Replace the line items; only legal before the order is confirmed.
    pub fn replace_items(&mut self, items: Vec<OrderItem>) -> Result<(), OrderError> {
        if self.status != OrderStatus::Created {
            return Err(OrderError::NotModifiable(self.status));
        }
        Self::validate_items(&items)?;
        self.order_list = items;
        self.recalculate();
        Ok(())
    }

    /// Reduce a line to what inventory can supply. Never raises a quantity.
    pub fn clamp_line(&mut self, index: usize, available: u64) -> Result<bool, OrderError> {
        let line = self
            .order_list
            .get_mut(index)
            .ok_or(OrderError::LineOutOfRange(index))?;

        let clamped = line.qty > available;
        if clamped {
            line.qty = available;
        }
        self.recalculate();
        Ok(clamped)
    }

    /// Refresh every derived field.
    pub fn recalculate(&mut self) -> u64 {
        self.status_message = self.status.as_str().to_string();
        self.sum = self
            .order_list
            .iter_mut()
            .map(OrderItem::recalculate)
            .fold(0u64, u64::saturating_add);
        self.sum
    }
}

/// Raw persisted shape; derived fields are accepted and discarded.
#[derive(Deserialize)]
struct OrderRecord {
    order_id: Uuid,
    status: OrderStatus,
    #[serde(default)]
    order_list: Vec<OrderItem>,
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        let mut order = Order {
            order_id: record.order_id,
            status: record.status,
            status_message: String::new(),
            sum: 0,
            order_list: record.order_list,
        };
        order.recalculate();
        order
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
