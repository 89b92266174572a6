// ============================================================================
// Order Domain
// ============================================================================
//
// Everything the scheduler and the order API need to know about an order:
// - Value objects (OrderStatus, OrderItem)
// - The Order aggregate and its derived-field invariants
// - The lifecycle transition table
// - The status-change notification payload
// - Errors (OrderError enum)
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;
pub mod transitions;
pub mod events;

pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
pub use transitions::*;
pub use events::*;
