use std::sync::Arc;

use uuid::Uuid;

use crate::domain::inventory::{
    AvailabilityReport, BatchOutcome, InventoryError, InventoryItem, ItemQuantity, ItemStatus,
    LineAvailability,
};
use crate::store::{Decrement, InventoryStore, StoreError};

// ============================================================================
// Inventory Query Service
// ============================================================================
//
// The only writer of the inventory store. Check is read-only; Add and Remove
// process each line independently and fold per-line failures into a single
// batch outcome instead of aborting halfway through.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InventoryServiceError {
    #[error(transparent)]
    Invalid(#[from] InventoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Availability for each requested line, in request order.
    pub async fn check_items(
        &self,
        items: &[ItemQuantity],
    ) -> Result<AvailabilityReport, InventoryServiceError> {
        if items.is_empty() {
            return Err(InventoryError::EmptyRequest.into());
        }

        let mut lines = Vec::with_capacity(items.len());
        for requested in items {
            let stock = self.store.get(requested.item_id).await?;
            lines.push(LineAvailability::evaluate(requested, stock.as_ref()));
        }

        let report = AvailabilityReport::from_lines(lines);
        tracing::debug!(
            lines = items.len(),
            status = ?report.status,
            "Inventory availability checked"
        );
        Ok(report)
    }

    /// Increase stock for every line, creating records as needed.
    pub async fn add_items(&self, items: &[ItemQuantity]) -> Result<BatchOutcome, InventoryServiceError> {
        validate_batch(items)?;

        let mut failures = Vec::new();
        for line in items {
            match self.store.increment(line.item_id, line.qty).await {
                Ok(item) => {
                    tracing::debug!(item_id = %item.item_id, qty = item.qty, "Stock added");
                }
                Err(e) => {
                    tracing::error!(item_id = %line.item_id, error = %e, "Failed to add stock");
                    failures.push(LineFailure::error(line.item_id, &e));
                }
            }
        }

        Ok(fold_outcome("added", items.len(), failures))
    }

    /// Take the requested quantity out of stock for every line. A record that
    /// reaches zero is deleted.
    pub async fn remove_items(
        &self,
        items: &[ItemQuantity],
    ) -> Result<BatchOutcome, InventoryServiceError> {
        validate_batch(items)?;

        let mut failures = Vec::new();
        for line in items {
            match self.store.decrement(line.item_id, line.qty).await {
                Ok(Decrement::Remaining(left)) => {
                    tracing::debug!(item_id = %line.item_id, remaining = left, "Stock removed");
                }
                Ok(Decrement::Depleted { shortfall }) => {
                    if shortfall > 0 {
                        tracing::warn!(
                            item_id = %line.item_id,
                            requested = line.qty,
                            shortfall = shortfall,
                            "Removed more stock than was held"
                        );
                    }
                    tracing::debug!(item_id = %line.item_id, "Stock depleted, record deleted");
                }
                Ok(Decrement::NotFound) => {
                    tracing::warn!(item_id = %line.item_id, "Remove requested for unknown item");
                    failures.push(LineFailure::not_found(line.item_id));
                }
                Err(e) => {
                    tracing::error!(item_id = %line.item_id, error = %e, "Failed to remove stock");
                    failures.push(LineFailure::error(line.item_id, &e));
                }
            }
        }

        Ok(fold_outcome("removed", items.len(), failures))
    }

    pub async fn get_item(&self, item_id: Uuid) -> Result<Option<InventoryItem>, StoreError> {
        self.store.get(item_id).await
    }
}

fn validate_batch(items: &[ItemQuantity]) -> Result<(), InventoryError> {
    if items.is_empty() {
        return Err(InventoryError::EmptyRequest);
    }
    match items.iter().find(|line| line.qty == 0) {
        Some(line) => Err(InventoryError::InvalidQuantity(line.item_id)),
        None => Ok(()),
    }
}

struct LineFailure {
    status: ItemStatus,
    message: String,
}

impl LineFailure {
    fn not_found(item_id: Uuid) -> Self {
        Self {
            status: ItemStatus::NotFound,
            message: format!("item {item_id}: not found"),
        }
    }

    fn error(item_id: Uuid, error: &StoreError) -> Self {
        Self {
            status: ItemStatus::Error,
            message: format!("item {item_id}: {error}"),
        }
    }
}

/// Error outranks NotFound when lines failed in different ways.
fn fold_outcome(verb: &str, total: usize, failures: Vec<LineFailure>) -> BatchOutcome {
    if failures.is_empty() {
        return BatchOutcome::ok(format!("{verb} {total} item(s)"));
    }

    let status = if failures.iter().any(|f| f.status == ItemStatus::Error) {
        ItemStatus::Error
    } else {
        ItemStatus::NotFound
    };
    let details: Vec<String> = failures.into_iter().map(|f| f.message).collect();

    BatchOutcome {
        status,
        status_message: details.join("; "),
    }
}
