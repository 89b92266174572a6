use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::Order;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Notifications
// ============================================================================

/// Status-change notification emitted after every persisted transition.
///
/// Wire shape: `{"order_id": "<uuid>", "status": <int>, "status_message": "..."}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OrderStatusChanged {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub status_message: String,
}

impl OrderStatusChanged {
    pub fn event_type(&self) -> &'static str {
        "OrderStatusChanged"
    }
}

impl From<&Order> for OrderStatusChanged {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            status: order.status,
            status_message: order.status.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderItem;

    #[test]
    fn test_notification_wire_shape() {
        let mut order = Order::new(vec![OrderItem::new(Uuid::new_v4(), 10, 2)]).unwrap();
        order.set_status(OrderStatus::Packaged);

        let event = OrderStatusChanged::from(&order);
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["order_id"], order.order_id.to_string());
        assert_eq!(value["status"], 3);
        assert_eq!(value["status_message"], "packaged");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }
}
