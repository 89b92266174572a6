use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::OrderError;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Lifecycle status of an order.
///
/// The ordinals are part of the wire contract (Redis records, notifications)
/// and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OrderStatus {
    Undefined = 0,
    Created = 1,
    Confirmed = 2,
    Packaged = 3,
    InDelivery = 4,
    Completed = 5,
    Cancelled = 6,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Undefined,
        OrderStatus::Created,
        OrderStatus::Confirmed,
        OrderStatus::Packaged,
        OrderStatus::InDelivery,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Human-readable mirror stored next to the ordinal as `status_message`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Undefined => "undefined",
            OrderStatus::Created => "created",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Packaged => "packaged",
            OrderStatus::InDelivery => "indelivery",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// No forward transition exists out of a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Undefined | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<OrderStatus> for u8 {
    fn from(status: OrderStatus) -> Self {
        status.ordinal()
    }
}

impl TryFrom<u8> for OrderStatus {
    type Error = OrderError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.ordinal() == value)
            .ok_or(OrderError::UnknownStatus(value))
    }
}

/// One line of an order. `sum` is always `cost * qty`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "OrderItemRecord")]
pub struct OrderItem {
    pub item_id: Uuid,
    pub cost: u64,
    pub qty: u64,
    pub sum: u64,
}

impl OrderItem {
    pub fn new(item_id: Uuid, cost: u64, qty: u64) -> Self {
        let mut item = Self {
            item_id,
            cost,
            qty,
            sum: 0,
        };
        item.recalculate();
        item
    }

    pub fn recalculate(&mut self) -> u64 {
        self.sum = self.cost.saturating_mul(self.qty);
        self.sum
    }

    pub fn validate(&self) -> Result<(), OrderError> {
        if self.cost == 0 {
            return Err(OrderError::InvalidCost(self.item_id));
        }
        if self.qty == 0 {
            return Err(OrderError::InvalidQuantity(self.item_id));
        }
        self.checked_sum().map(|_| ())
    }

    pub fn checked_sum(&self) -> Result<u64, OrderError> {
        self.cost
            .checked_mul(self.qty)
            .ok_or(OrderError::Overflow(self.item_id))
    }
}

/// Raw shape of an item as found in storage or request bodies; `sum` is
/// accepted and ignored.
#[derive(Deserialize)]
struct OrderItemRecord {
    item_id: Uuid,
    cost: u64,
    qty: u64,
}

impl From<OrderItemRecord> for OrderItem {
    fn from(record: OrderItemRecord) -> Self {
        OrderItem::new(record.item_id, record.cost, record.qty)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
