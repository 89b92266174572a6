// ============================================================================
// Inventory Domain
// ============================================================================
//
// - value_objects: stock records, per-line status codes, requested quantities
// - availability:  "can this line be fulfilled" rule used by CheckItem
// - reservation:   the order-side acceptance policy applied to a CheckItem reply
// - errors:        InventoryError enum
//
// ============================================================================

pub mod value_objects;
pub mod availability;
pub mod reservation;
pub mod errors;

pub use value_objects::*;
pub use availability::*;
pub use reservation::*;
pub use errors::*;
