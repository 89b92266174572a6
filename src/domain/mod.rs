// ============================================================================
// Domain Layer - Business Rules
// ============================================================================
//
// Pure types and rules with no I/O:
// - order/     - Order aggregate, lifecycle transitions, notifications
// - inventory/ - Stock records, availability rules, reservation policy
//
// Storage, RPC and messaging live outside this module and depend on it,
// never the other way round.
//
// ============================================================================

pub mod order;
pub mod inventory;
