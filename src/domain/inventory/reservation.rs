use uuid::Uuid;

use super::availability::AvailabilityReport;
use super::errors::InventoryError;
use crate::domain::order::OrderItem;

// ============================================================================
// Reservation Policy - how a Confirmed order reacts to an availability reply
// ============================================================================
//
// Reply lines are matched to order lines by position and cross-checked by
// item identifier; any misalignment is a contract error and the decision is
// not made at all.
//
// - any line with zero available → Reject (the whole order is cancelled)
// - every line fully available   → Accept
// - otherwise                    → Clamp each short line to what is available
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClamp {
    pub index: usize,
    pub item_id: Uuid,
    pub requested: u64,
    pub available: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationDecision {
    Accept,
    Clamp(Vec<LineClamp>),
    Reject { item_id: Uuid },
}

impl ReservationDecision {
    pub fn decide(
        lines: &[OrderItem],
        report: &AvailabilityReport,
    ) -> Result<Self, InventoryError> {
        if report.lines.len() != lines.len() {
            return Err(InventoryError::LineCountMismatch {
                expected: lines.len(),
                actual: report.lines.len(),
            });
        }

        let mut clamps = Vec::new();
        for (index, (line, reply)) in lines.iter().zip(&report.lines).enumerate() {
            if line.item_id != reply.item_id {
                return Err(InventoryError::LineItemMismatch {
                    index,
                    expected: line.item_id,
                    actual: reply.item_id,
                });
            }

            if reply.available == 0 {
                return Ok(ReservationDecision::Reject {
                    item_id: line.item_id,
                });
            }

            if reply.available < line.qty {
                clamps.push(LineClamp {
                    index,
                    item_id: line.item_id,
                    requested: line.qty,
                    available: reply.available,
                });
            }
        }

        if clamps.is_empty() {
            Ok(ReservationDecision::Accept)
        } else {
            Ok(ReservationDecision::Clamp(clamps))
        }
    }
}
