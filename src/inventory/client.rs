use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use super::gateway::{GatewayError, InventoryGateway};
use super::grpc::{InventoryServiceClient, ItemRequest};
use crate::domain::inventory::{AvailabilityReport, BatchOutcome, ItemQuantity};

/// Remote inventory over gRPC. Every call is bounded by `timeout`; a call
/// that runs past it is abandoned and reported as `GatewayError::Timeout`.
#[derive(Clone)]
pub struct GrpcInventoryClient {
    client: InventoryServiceClient<Channel>,
    timeout: Duration,
}

impl GrpcInventoryClient {
    pub async fn connect(endpoint: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let channel = Endpoint::from_shared(endpoint.to_string())?
            .connect_timeout(timeout)
            .connect()
            .await?;

        tracing::info!(endpoint = %endpoint, "Connected to inventory service");
        Ok(Self::from_channel(channel, timeout))
    }

    pub fn from_channel(channel: Channel, timeout: Duration) -> Self {
        Self {
            client: InventoryServiceClient::new(channel),
            timeout,
        }
    }
}

#[async_trait]
impl InventoryGateway for GrpcInventoryClient {
    async fn check_availability(
        &self,
        items: &[ItemQuantity],
    ) -> Result<AvailabilityReport, GatewayError> {
        let mut client = self.client.clone();
        let request = ItemRequest::from_items(items);

        let reply = tokio::time::timeout(self.timeout, client.check_item(request))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        Ok(AvailabilityReport::try_from(reply.into_inner())?)
    }

    async fn consume(&self, items: &[ItemQuantity]) -> Result<BatchOutcome, GatewayError> {
        let mut client = self.client.clone();
        let request = ItemRequest::from_items(items);

        let reply = tokio::time::timeout(self.timeout, client.remove_item(request))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout))??;

        Ok(BatchOutcome::try_from(reply.into_inner())?)
    }
}
