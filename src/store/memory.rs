use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::{decode, encode, StoreError};
use super::inventory_store::{inventory_key, InventoryStore};
use super::order_store::{OrderStore, ORDER_KEY_PREFIX};
use crate::domain::inventory::InventoryItem;
use crate::domain::order::Order;

// ============================================================================
// In-Memory Stores
// ============================================================================
//
// Process-local stand-ins for the Redis stores, selected with
// STORE_BACKEND=memory. Records are kept as JSON so the encode/decode path is
// the same one Redis goes through. Entries do not expire.
//
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrderStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw payload as-is, bypassing encoding.
    #[cfg(test)]
    pub async fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries.write().await.insert(key.into(), raw.into());
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn scan_keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(ORDER_KEY_PREFIX))
            .cloned()
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<Order>, StoreError> {
        let entries = self.entries.read().await;
        entries.get(key).map(|raw| decode(key, raw)).transpose()
    }

    async fn set(&self, key: &str, order: &Order) -> Result<(), StoreError> {
        let payload = encode(key, order)?;
        self.entries.write().await.insert(key.to_string(), payload);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryInventoryStore {
    entries: RwLock<HashMap<Uuid, String>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed stock levels; zero quantities are skipped since the store never
    /// holds empty records.
    pub async fn with_stock(items: impl IntoIterator<Item = (Uuid, u64)>) -> Result<Self, StoreError> {
        let store = Self::new();
        for (item_id, qty) in items.into_iter().filter(|(_, qty)| *qty > 0) {
            store.set(&InventoryItem { item_id, qty }).await?;
        }
        Ok(store)
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn get(&self, item_id: Uuid) -> Result<Option<InventoryItem>, StoreError> {
        let entries = self.entries.read().await;
        entries
            .get(&item_id)
            .map(|raw| decode(&inventory_key(item_id), raw))
            .transpose()
    }

    async fn set(&self, item: &InventoryItem) -> Result<(), StoreError> {
        let payload = encode(&inventory_key(item.item_id), item)?;
        self.entries.write().await.insert(item.item_id, payload);
        Ok(())
    }

    async fn delete(&self, item_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(&item_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderItem;
    use crate::store::{order_key, Decrement};

    #[tokio::test]
    async fn test_order_store_set_get_delete() {
        let store = InMemoryOrderStore::new();
        let order = Order::new(vec![OrderItem::new(Uuid::new_v4(), 10, 2)]).unwrap();
        let key = order_key(order.order_id);

        store.set(&key, &order).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(order));
        assert_eq!(store.scan_keys().await.unwrap(), vec![key.clone()]);

        assert!(store.delete(&key).await.unwrap());
        assert!(!store.delete(&key).await.unwrap());
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_scan_ignores_foreign_keys() {
        let store = InMemoryOrderStore::new();
        store.insert_raw("session:abc", "{}").await;

        assert!(store.scan_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_order_record_is_a_decode_error() {
        let store = InMemoryOrderStore::new();
        store.insert_raw("api-orders:broken", "not json").await;

        let err = store.get("api-orders:broken").await.unwrap_err();
        assert!(err.is_contract_violation());
    }

    #[tokio::test]
    async fn test_increment_creates_then_adds() {
        let store = InMemoryInventoryStore::new();
        let id = Uuid::new_v4();

        assert_eq!(store.increment(id, 3).await.unwrap().qty, 3);
        assert_eq!(store.increment(id, 4).await.unwrap().qty, 7);
    }

    #[tokio::test]
    async fn test_decrement_deletes_at_zero() {
        let id = Uuid::new_v4();
        let store = InMemoryInventoryStore::with_stock([(id, 5)]).await.unwrap();

        assert_eq!(store.decrement(id, 2).await.unwrap(), Decrement::Remaining(3));
        assert_eq!(
            store.decrement(id, 3).await.unwrap(),
            Decrement::Depleted { shortfall: 0 }
        );
        assert_eq!(store.get(id).await.unwrap(), None);
        assert_eq!(store.decrement(id, 1).await.unwrap(), Decrement::NotFound);
    }

    #[tokio::test]
    async fn test_decrement_past_zero_reports_shortfall() {
        let id = Uuid::new_v4();
        let store = InMemoryInventoryStore::with_stock([(id, 2)]).await.unwrap();

        assert_eq!(
            store.decrement(id, 5).await.unwrap(),
            Decrement::Depleted { shortfall: 3 }
        );
    }
}
