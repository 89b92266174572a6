pub mod client;
pub mod gateway;
pub mod grpc;
pub mod service;

pub use client::GrpcInventoryClient;
pub use gateway::{GatewayError, InventoryGateway};
pub use grpc::serve_inventory;
pub use service::{InventoryService, InventoryServiceError};
