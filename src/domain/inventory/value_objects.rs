use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::InventoryError;

// ============================================================================
// Inventory Value Objects
// ============================================================================

/// Stock record. A record never holds zero: it is deleted instead.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InventoryItem {
    pub item_id: Uuid,
    pub qty: u64,
}

/// Per-line and aggregate status codes shared by every inventory operation.
///
/// Ordinals match the RPC enum and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    Ok = 0,
    NotFound = 1,
    NotEnoughAvailable = 2,
    Error = 3,
}

impl ItemStatus {
    pub fn ordinal(&self) -> i32 {
        *self as i32
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ItemStatus::Ok)
    }
}

impl TryFrom<i32> for ItemStatus {
    type Error = InventoryError;

    fn try_from(value: i32) -> Result<Self, InventoryError> {
        match value {
            0 => Ok(ItemStatus::Ok),
            1 => Ok(ItemStatus::NotFound),
            2 => Ok(ItemStatus::NotEnoughAvailable),
            3 => Ok(ItemStatus::Error),
            other => Err(InventoryError::UnknownStatus(other)),
        }
    }
}

/// An `(item, qty)` pair as carried by every inventory request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemQuantity {
    pub item_id: Uuid,
    pub qty: u64,
}

impl ItemQuantity {
    pub fn new(item_id: Uuid, qty: u64) -> Self {
        Self { item_id, qty }
    }

    /// Parse the string identifier used on the wire.
    pub fn parse(item_id: &str, qty: u64) -> Result<Self, InventoryError> {
        let item_id = Uuid::parse_str(item_id)
            .map_err(|_| InventoryError::MalformedItemId(item_id.to_string()))?;
        Ok(Self { item_id, qty })
    }
}

/// Outcome of a batch mutation (AddItem / RemoveItem).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub status: ItemStatus,
    pub status_message: String,
}

impl BatchOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: ItemStatus::Ok,
            status_message: message.into(),
        }
    }
}
