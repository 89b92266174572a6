pub mod http;
pub mod service;

pub use http::routes;
pub use service::{OrderService, OrderServiceError};
