// ============================================================================
// Storage Layer
// ============================================================================
//
// Key-value caches shared by every service in the process:
// - order_store:     Order records (scan / get / set-with-expiry / delete)
// - inventory_store: stock records (get / set / delete / increment / decrement)
// - memory:          in-process implementations of both
//
// Each operation is atomic only at the single-key level.
//
// ============================================================================

mod errors;
mod order_store;
mod inventory_store;
mod memory;

pub use errors::StoreError;
pub use order_store::{order_key, OrderStore, RedisOrderStore, DEFAULT_TTL_SECS, ORDER_KEY_PREFIX};
pub use inventory_store::{inventory_key, Decrement, InventoryStore, RedisInventoryStore};
pub use memory::{InMemoryInventoryStore, InMemoryOrderStore};

use redis::aio::MultiplexedConnection;

/// Open a multiplexed connection; clones of it share one socket.
pub async fn connect_redis(url: &str) -> Result<MultiplexedConnection, StoreError> {
    let client = redis::Client::open(url)?;
    let conn = client.get_multiplexed_async_connection().await?;
    tracing::info!("Redis connected");
    Ok(conn)
}
