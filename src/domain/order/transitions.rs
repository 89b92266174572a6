use super::value_objects::OrderStatus;

// ============================================================================
// Order Lifecycle Transition Table
// ============================================================================
//
//   Created ──► Confirmed ──► Packaged ──► InDelivery ──► Completed ──► (purged)
//                   │
//                   └──► Cancelled ──► (purged)
//
// Each status maps to exactly one action. `ReserveInventory` is the only
// action whose outcome is decided at runtime: it lands on `to` when stock is
// accepted (possibly clamped) and on `Cancelled` when it is rejected.
//
// ============================================================================

/// What the scheduler does with an order found in a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// Move to the next status unconditionally.
    Advance,
    /// Check and consume inventory, then move to `to` or `Cancelled`.
    ReserveInventory,
    /// Remove the record from the order store; nothing is persisted or announced.
    Purge,
    /// Leave the order untouched.
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OrderStatus,
    pub action: TransitionAction,
    pub to: Option<OrderStatus>,
}

pub const TRANSITIONS: [Transition; 7] = [
    Transition {
        from: OrderStatus::Undefined,
        action: TransitionAction::Hold,
        to: None,
    },
    Transition {
        from: OrderStatus::Created,
        action: TransitionAction::Advance,
        to: Some(OrderStatus::Confirmed),
    },
    Transition {
        from: OrderStatus::Confirmed,
        action: TransitionAction::ReserveInventory,
        to: Some(OrderStatus::Packaged),
    },
    Transition {
        from: OrderStatus::Packaged,
        action: TransitionAction::Advance,
        to: Some(OrderStatus::InDelivery),
    },
    Transition {
        from: OrderStatus::InDelivery,
        action: TransitionAction::Advance,
        to: Some(OrderStatus::Completed),
    },
    Transition {
        from: OrderStatus::Completed,
        action: TransitionAction::Purge,
        to: None,
    },
    Transition {
        from: OrderStatus::Cancelled,
        action: TransitionAction::Purge,
        to: None,
    },
];

/// Status an inventory rejection sends an order to.
pub const REJECTED: OrderStatus = OrderStatus::Cancelled;

pub fn transition_for(status: OrderStatus) -> Transition {
    TRANSITIONS
        .iter()
        .copied()
        .find(|t| t.from == status)
        .unwrap_or(Transition {
            from: status,
            action: TransitionAction::Hold,
            to: None,
        })
}

/// True when `from → to` is a step the lifecycle permits.
pub fn is_allowed(from: OrderStatus, to: OrderStatus) -> bool {
    let transition = transition_for(from);
    match transition.action {
        TransitionAction::Advance => transition.to == Some(to),
        TransitionAction::ReserveInventory => transition.to == Some(to) || to == REJECTED,
        TransitionAction::Purge | TransitionAction::Hold => false,
    }
}
