use std::sync::Arc;

use uuid::Uuid;

use crate::domain::order::{Order, OrderError, OrderItem};
use crate::store::{order_key, OrderStore, StoreError};

// ============================================================================
// Order Use Cases
// ============================================================================
//
// Creation and item edits happen here; status changes never do. Once an
// order leaves `Created` only the scheduler moves it.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderServiceError {
    #[error(transparent)]
    Invalid(#[from] OrderError),

    #[error("Order {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, items: Vec<OrderItem>) -> Result<Order, OrderServiceError> {
        let order = Order::new(items)?;
        self.store.set(&order_key(order.order_id), &order).await?;

        tracing::info!(
            order_id = %order.order_id,
            lines = order.order_list.len(),
            sum = order.sum,
            "Order created"
        );
        Ok(order)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Order, OrderServiceError> {
        self.store
            .get(&order_key(order_id))
            .await?
            .ok_or(OrderServiceError::NotFound(order_id))
    }

    /// Replace the order's lines. Rejected once the scheduler has confirmed it.
    pub async fn update_items(
        &self,
        order_id: Uuid,
        items: Vec<OrderItem>,
    ) -> Result<Order, OrderServiceError> {
        let mut order = self.get(order_id).await?;
        order.replace_items(items)?;
        self.store.set(&order_key(order_id), &order).await?;

        tracing::info!(order_id = %order_id, sum = order.sum, "Order items updated");
        Ok(order)
    }

    pub async fn delete(&self, order_id: Uuid) -> Result<(), OrderServiceError> {
        if !self.store.delete(&order_key(order_id)).await? {
            return Err(OrderServiceError::NotFound(order_id));
        }
        tracing::info!(order_id = %order_id, "Order deleted");
        Ok(())
    }
}
