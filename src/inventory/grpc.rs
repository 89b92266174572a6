//! gRPC surface of the inventory service (`/InventoryService/<Method>` routes).
//!
//! Messages are declared by hand with prost derives; `build.rs` generates the
//! client and server stubs around them. Item identifiers travel as strings and
//! are parsed at the boundary, so a malformed id is an `InvalidArgument`
//! rather than a store lookup.

use std::net::SocketAddr;

use tonic::{Request, Status};

use super::service::{InventoryService, InventoryServiceError};
use crate::domain::inventory::{
    AvailabilityReport, BatchOutcome, InventoryError, ItemQuantity, ItemStatus, LineAvailability,
};

// ============================================================================
// Wire messages
// ============================================================================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Item {
    #[prost(string, tag = "1")]
    pub uuid: String,
    #[prost(uint64, tag = "2")]
    pub qty: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ItemRequest {
    #[prost(message, repeated, tag = "1")]
    pub item: Vec<Item>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StatusCode {
    Ok = 0,
    NotFound = 1,
    NotEnoughAvailable = 2,
    Error = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ItemAvailableStatus {
    #[prost(message, optional, tag = "1")]
    pub item: Option<Item>,
    #[prost(enumeration = "StatusCode", tag = "2")]
    pub status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ItemAvailableResponse {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<ItemAvailableStatus>,
    #[prost(enumeration = "StatusCode", tag = "2")]
    pub status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(enumeration = "StatusCode", tag = "1")]
    pub status: i32,
    #[prost(string, tag = "2")]
    pub status_message: String,
}

// Generated without a package, hence the leading dot in the file name.
include!(concat!(env!("OUT_DIR"), "/.InventoryService.rs"));

pub use inventory_service_client::InventoryServiceClient;
pub use inventory_service_server::{InventoryService as InventoryRpc, InventoryServiceServer};

// ============================================================================
// Domain <-> wire conversions
// ============================================================================

impl From<ItemStatus> for StatusCode {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Ok => StatusCode::Ok,
            ItemStatus::NotFound => StatusCode::NotFound,
            ItemStatus::NotEnoughAvailable => StatusCode::NotEnoughAvailable,
            ItemStatus::Error => StatusCode::Error,
        }
    }
}

impl ItemRequest {
    pub fn from_items(items: &[ItemQuantity]) -> Self {
        Self {
            item: items
                .iter()
                .map(|line| Item {
                    uuid: line.item_id.to_string(),
                    qty: line.qty,
                })
                .collect(),
        }
    }

    pub fn parse(&self) -> Result<Vec<ItemQuantity>, InventoryError> {
        self.item
            .iter()
            .map(|item| ItemQuantity::parse(&item.uuid, item.qty))
            .collect()
    }
}

impl From<&AvailabilityReport> for ItemAvailableResponse {
    fn from(report: &AvailabilityReport) -> Self {
        Self {
            items: report
                .lines
                .iter()
                .map(|line| ItemAvailableStatus {
                    item: Some(Item {
                        uuid: line.item_id.to_string(),
                        qty: line.available,
                    }),
                    status: StatusCode::from(line.status) as i32,
                })
                .collect(),
            status: StatusCode::from(report.status) as i32,
        }
    }
}

impl TryFrom<ItemAvailableResponse> for AvailabilityReport {
    type Error = InventoryError;

    fn try_from(reply: ItemAvailableResponse) -> Result<Self, InventoryError> {
        let status = ItemStatus::try_from(reply.status)?;
        let lines = reply
            .items
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let item = line.item.ok_or(InventoryError::MissingLine(index))?;
                let parsed = ItemQuantity::parse(&item.uuid, item.qty)?;
                Ok(LineAvailability {
                    item_id: parsed.item_id,
                    available: parsed.qty,
                    status: ItemStatus::try_from(line.status)?,
                })
            })
            .collect::<Result<Vec<_>, InventoryError>>()?;

        Ok(AvailabilityReport { status, lines })
    }
}

impl From<BatchOutcome> for Response {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            status: StatusCode::from(outcome.status) as i32,
            status_message: outcome.status_message,
        }
    }
}

impl TryFrom<Response> for BatchOutcome {
    type Error = InventoryError;

    fn try_from(reply: Response) -> Result<Self, InventoryError> {
        Ok(Self {
            status: ItemStatus::try_from(reply.status)?,
            status_message: reply.status_message,
        })
    }
}

// ============================================================================
// Server
// ============================================================================

pub struct InventoryGrpc {
    service: InventoryService,
}

impl InventoryGrpc {
    pub fn new(service: InventoryService) -> Self {
        Self { service }
    }
}

fn to_status(err: InventoryServiceError) -> Status {
    match err {
        InventoryServiceError::Invalid(e) => Status::invalid_argument(e.to_string()),
        InventoryServiceError::Store(e) => {
            tracing::error!(error = %e, "Inventory store failure");
            Status::internal("inventory store failure")
        }
    }
}

fn parse_request(request: Request<ItemRequest>) -> Result<Vec<ItemQuantity>, Status> {
    request
        .into_inner()
        .parse()
        .map_err(|e| Status::invalid_argument(e.to_string()))
}

#[tonic::async_trait]
impl InventoryRpc for InventoryGrpc {
    async fn check_item(
        &self,
        request: Request<ItemRequest>,
    ) -> Result<tonic::Response<ItemAvailableResponse>, Status> {
        let items = parse_request(request)?;
        let report = self.service.check_items(&items).await.map_err(to_status)?;
        Ok(tonic::Response::new(ItemAvailableResponse::from(&report)))
    }

    async fn add_item(
        &self,
        request: Request<ItemRequest>,
    ) -> Result<tonic::Response<Response>, Status> {
        let items = parse_request(request)?;
        let outcome = self.service.add_items(&items).await.map_err(to_status)?;
        Ok(tonic::Response::new(outcome.into()))
    }

    async fn remove_item(
        &self,
        request: Request<ItemRequest>,
    ) -> Result<tonic::Response<Response>, Status> {
        let items = parse_request(request)?;
        let outcome = self.service.remove_items(&items).await.map_err(to_status)?;
        Ok(tonic::Response::new(outcome.into()))
    }
}

pub fn inventory_server(service: InventoryService) -> InventoryServiceServer<InventoryGrpc> {
    InventoryServiceServer::new(InventoryGrpc::new(service))
}

/// Serve the inventory RPCs plus the standard gRPC health service.
pub async fn serve_inventory(
    addr: SocketAddr,
    service: InventoryService,
) -> Result<(), tonic::transport::Error> {
    let (reporter, health) = tonic_health::server::health_reporter();
    reporter
        .set_serving::<InventoryServiceServer<InventoryGrpc>>()
        .await;

    tracing::info!(addr = %addr, "Inventory gRPC server listening");

    tonic::transport::Server::builder()
        .add_service(health)
        .add_service(inventory_server(service))
        .serve(addr)
        .await
}
