use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use uuid::Uuid;

use super::errors::{decode, encode, StoreError};
use crate::domain::inventory::InventoryItem;

// ============================================================================
// Inventory Store - item → quantity cache
// ============================================================================
//
// Records live under `api-inventory:<item_id>` as `{item_id, qty}` JSON.
// `increment`/`decrement` are read-modify-write on a single key: atomic only
// as far as the backend's get/set are, never across keys.
//
// ============================================================================

pub const INVENTORY_KEY_PREFIX: &str = "api-inventory:";

pub fn inventory_key(item_id: Uuid) -> String {
    format!("{INVENTORY_KEY_PREFIX}{item_id}")
}

/// Result of taking stock out of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    NotFound,
    Remaining(u64),
    /// The record hit zero and was deleted. `shortfall` is how much of the
    /// request could not be covered.
    Depleted { shortfall: u64 },
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn get(&self, item_id: Uuid) -> Result<Option<InventoryItem>, StoreError>;

    async fn set(&self, item: &InventoryItem) -> Result<(), StoreError>;

    async fn delete(&self, item_id: Uuid) -> Result<bool, StoreError>;

    /// Add stock, creating the record when absent.
    async fn increment(&self, item_id: Uuid, by: u64) -> Result<InventoryItem, StoreError> {
        let item = match self.get(item_id).await? {
            Some(mut existing) => {
                existing.qty = existing.qty.saturating_add(by);
                existing
            }
            None => InventoryItem { item_id, qty: by },
        };
        self.set(&item).await?;
        Ok(item)
    }

    /// Take stock out; a record reaching zero is deleted, never kept at zero.
    async fn decrement(&self, item_id: Uuid, by: u64) -> Result<Decrement, StoreError> {
        let Some(mut item) = self.get(item_id).await? else {
            return Ok(Decrement::NotFound);
        };

        if item.qty <= by {
            self.delete(item_id).await?;
            return Ok(Decrement::Depleted {
                shortfall: by - item.qty,
            });
        }

        item.qty -= by;
        self.set(&item).await?;
        Ok(Decrement::Remaining(item.qty))
    }
}

pub struct RedisInventoryStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisInventoryStore {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }
}

#[async_trait]
impl InventoryStore for RedisInventoryStore {
    async fn get(&self, item_id: Uuid) -> Result<Option<InventoryItem>, StoreError> {
        let key = inventory_key(item_id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&key).await?;

        raw.map(|raw| decode(&key, &raw)).transpose()
    }

    async fn set(&self, item: &InventoryItem) -> Result<(), StoreError> {
        let key = inventory_key(item.item_id);
        let payload = encode(&key, item)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(&key, payload, self.ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, item_id: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: usize = conn.del(inventory_key(item_id)).await?;
        Ok(removed > 0)
    }
}
