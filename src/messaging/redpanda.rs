use std::time::Duration;

use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    message::{Header, OwnedHeaders},
    producer::{FutureProducer, FutureRecord},
    util::Timeout,
};

use super::notifier::{encode_event, NotificationPublisher, PublishError};
use crate::domain::order::OrderStatusChanged;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Publishes status changes to a Redpanda/Kafka topic as JSON, keyed by
/// order id so every change for one order lands on the same partition.
pub struct RedpandaPublisher {
    producer: FutureProducer,
    topic: String,
    circuit_breaker: CircuitBreaker,
}

impl RedpandaPublisher {
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, PublishError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.into(),
            circuit_breaker: CircuitBreaker::new("redpanda", CircuitBreakerConfig::default()),
        })
    }

    /// Report breaker transitions, e.g. to a metrics gauge.
    pub fn with_breaker_observer(
        mut self,
        observer: impl Fn(CircuitState) + Send + Sync + 'static,
    ) -> Self {
        self.circuit_breaker = self.circuit_breaker.with_observer(observer);
        self
    }
}

#[async_trait]
impl NotificationPublisher for RedpandaPublisher {
    async fn publish(&self, event: &OrderStatusChanged) -> Result<(), PublishError> {
        let payload = encode_event(event)?;
        let key = event.order_id.to_string();

        let result = self
            .circuit_breaker
            .call(async {
                let headers = OwnedHeaders::new().insert(Header {
                    key: "content-type",
                    value: Some("application/json"),
                });
                let record = FutureRecord::to(&self.topic)
                    .key(&key)
                    .payload(&payload)
                    .headers(headers);

                self.producer
                    .send(record, Timeout::After(SEND_TIMEOUT))
                    .await
                    .map(|_| ())
                    .map_err(|(e, _)| e)
            })
            .await;

        match result {
            Ok(()) => {
                tracing::debug!(
                    topic = %self.topic,
                    order_id = %key,
                    status = %event.status,
                    "Published order notification"
                );
                Ok(())
            }
            Err(CircuitBreakerError::CircuitOpen) => Err(PublishError::CircuitOpen),
            Err(CircuitBreakerError::OperationFailed(e)) => Err(PublishError::Broker(e)),
        }
    }
}
