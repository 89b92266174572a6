use async_trait::async_trait;
use rdkafka::error::KafkaError;

use crate::domain::order::OrderStatusChanged;

// ============================================================================
// Notification Publisher
// ============================================================================
//
// Fire-and-forget sink for status changes. Callers log failures and move on;
// nothing here is on the critical path of order state.
//
// ============================================================================

#[async_trait]
pub trait NotificationPublisher: Send + Sync {
    async fn publish(&self, event: &OrderStatusChanged) -> Result<(), PublishError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Notification could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Broker rejected notification: {0}")]
    Broker(#[from] KafkaError),

    #[error("Circuit breaker open for notification broker")]
    CircuitOpen,
}

pub(crate) fn encode_event(event: &OrderStatusChanged) -> Result<String, PublishError> {
    Ok(serde_json::to_string(event)?)
}

/// Used when no broker is configured: notifications go to the log only.
#[derive(Default)]
pub struct LogPublisher;

#[async_trait]
impl NotificationPublisher for LogPublisher {
    async fn publish(&self, event: &OrderStatusChanged) -> Result<(), PublishError> {
        let payload = encode_event(event)?;
        tracing::info!(
            event_type = event.event_type(),
            order_id = %event.order_id,
            payload = %payload,
            "Order notification"
        );
        Ok(())
    }
}
