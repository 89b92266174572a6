pub mod actor;
pub mod errors;
pub mod order_scheduler;

pub use actor::{OrderSchedulerActor, Tick};
pub use errors::SchedulerError;
pub use order_scheduler::{OrderScheduler, SchedulerConfig, TickOutcome};
