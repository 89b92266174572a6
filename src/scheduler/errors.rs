use std::time::Duration;

use crate::domain::inventory::InventoryError;
use crate::domain::order::OrderError;
use crate::inventory::GatewayError;
use crate::store::StoreError;

/// Why a tick stopped before finishing. Every variant leaves the order as it
/// was last persisted; the next tick starts from scratch.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Order store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Inventory check failed: {0}")]
    Inventory(#[from] GatewayError),

    #[error("Inventory reply does not match the order: {0}")]
    Contract(#[from] InventoryError),

    #[error("Order could not be updated: {0}")]
    Order(#[from] OrderError),

    #[error("Tick exceeded its {0:?} deadline")]
    Timeout(Duration),
}

impl SchedulerError {
    /// Malformed data rather than an unavailable dependency.
    pub fn is_contract_violation(&self) -> bool {
        match self {
            SchedulerError::Store(e) => e.is_contract_violation(),
            SchedulerError::Inventory(e) => e.is_contract_violation(),
            SchedulerError::Contract(_) | SchedulerError::Order(_) => true,
            SchedulerError::Timeout(_) => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SchedulerError::Timeout(_) => "timeout",
            e if e.is_contract_violation() => "dropped",
            _ => "failed",
        }
    }
}
