use std::time::Duration;

use async_trait::async_trait;

use super::service::{InventoryService, InventoryServiceError};
use crate::domain::inventory::{AvailabilityReport, BatchOutcome, InventoryError, ItemQuantity};
use crate::store::StoreError;
use crate::utils::IsTransient;

// ============================================================================
// Inventory Gateway - what the scheduler needs from inventory
// ============================================================================
//
// Two capabilities: ask whether a batch can be fulfilled, and consume it.
// Backed either by the in-process service or by a remote gRPC endpoint.
//
// ============================================================================

#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// One reply line per requested line, in request order.
    async fn check_availability(
        &self,
        items: &[ItemQuantity],
    ) -> Result<AvailabilityReport, GatewayError>;

    async fn consume(&self, items: &[ItemQuantity]) -> Result<BatchOutcome, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Inventory call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Inventory endpoint unreachable: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("Inventory RPC failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("Inventory reply violates the contract: {0}")]
    Contract(#[from] InventoryError),

    #[error("Inventory store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<InventoryServiceError> for GatewayError {
    fn from(err: InventoryServiceError) -> Self {
        match err {
            InventoryServiceError::Invalid(e) => GatewayError::Contract(e),
            InventoryServiceError::Store(e) => GatewayError::Store(e),
        }
    }
}

impl GatewayError {
    /// Retrying will not help: the request or the reply is malformed.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            GatewayError::Contract(_) => true,
            GatewayError::Rpc(status) => status.code() == tonic::Code::InvalidArgument,
            GatewayError::Store(e) => e.is_contract_violation(),
            GatewayError::Timeout(_) | GatewayError::Transport(_) => false,
        }
    }
}

impl IsTransient for GatewayError {
    fn is_transient(&self) -> bool {
        match self {
            GatewayError::Timeout(_) | GatewayError::Transport(_) => true,
            GatewayError::Rpc(status) => matches!(
                status.code(),
                tonic::Code::Unavailable | tonic::Code::DeadlineExceeded
            ),
            GatewayError::Store(e) => e.is_transient(),
            GatewayError::Contract(_) => false,
        }
    }
}

#[async_trait]
impl InventoryGateway for InventoryService {
    async fn check_availability(
        &self,
        items: &[ItemQuantity],
    ) -> Result<AvailabilityReport, GatewayError> {
        Ok(self.check_items(items).await?)
    }

    async fn consume(&self, items: &[ItemQuantity]) -> Result<BatchOutcome, GatewayError> {
        Ok(self.remove_items(items).await?)
    }
}
