use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use uuid::Uuid;

use super::errors::{decode, encode, StoreError};
use crate::domain::order::Order;

// ============================================================================
// Order Store - key → Order cache with expiring entries
// ============================================================================
//
// Records live under `api-orders:<order_id>` as JSON and have their TTL
// refreshed on every write. `scan_keys` is a point-in-time enumeration and
// may be stale by the time a key is read back.
//
// ============================================================================

pub const ORDER_KEY_PREFIX: &str = "api-orders:";
pub const DEFAULT_TTL_SECS: u64 = 3600;

const SCAN_BATCH: usize = 100;

pub fn order_key(order_id: Uuid) -> String {
    format!("{ORDER_KEY_PREFIX}{order_id}")
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Every live order key. Not atomic with respect to concurrent writes.
    async fn scan_keys(&self) -> Result<Vec<String>, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Order>, StoreError>;

    /// Write the order and refresh its expiry.
    async fn set(&self, key: &str, order: &Order) -> Result<(), StoreError>;

    /// Returns whether a record was actually removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

pub struct RedisOrderStore {
    conn: MultiplexedConnection,
    ttl_secs: u64,
}

impl RedisOrderStore {
    pub fn new(conn: MultiplexedConnection, ttl_secs: u64) -> Self {
        Self { conn, ttl_secs }
    }
}

#[async_trait]
impl OrderStore for RedisOrderStore {
    async fn scan_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{ORDER_KEY_PREFIX}*");
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may yield a key more than once across batches
        keys.sort_unstable();
        keys.dedup();

        tracing::debug!(count = keys.len(), "Scanned order keys");
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;

        raw.map(|raw| decode(key, &raw)).transpose()
    }

    async fn set(&self, key: &str, order: &Order) -> Result<(), StoreError> {
        let payload = encode(key, order)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, payload, self.ttl_secs).await?;

        tracing::debug!(
            key = %key,
            order_id = %order.order_id,
            status = %order.status,
            ttl_secs = self.ttl_secs,
            "Order record written"
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: usize = conn.del(key).await?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key_is_namespaced() {
        let id = Uuid::new_v4();
        assert_eq!(order_key(id), format!("api-orders:{id}"));
        assert!(order_key(id).starts_with(ORDER_KEY_PREFIX));
    }
}
