use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::Deserialize;
use uuid::Uuid;

use super::service::{OrderService, OrderServiceError};
use crate::domain::order::OrderItem;

// ============================================================================
// Order HTTP API
// ============================================================================
//
//   POST   /api/v1/order               create
//   GET    /api/v1/order/{order_id}    read
//   PUT    /api/v1/order/{order_id}    replace items (Created only)
//   DELETE /api/v1/order/{order_id}    delete
//
// Expects `web::Data<OrderService>` in app data.
//
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OrderItemsRequest {
    pub order_list: Vec<OrderItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Malformed order id: {0:?}")]
    BadId(String),

    #[error("Malformed request body: {0}")]
    BadBody(String),

    #[error(transparent)]
    Service(#[from] OrderServiceError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadId(_) | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(OrderServiceError::Invalid(_)) => StatusCode::BAD_REQUEST,
            ApiError::Service(OrderServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Service(OrderServiceError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Order request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(serde_json::json!({ "error": message }))
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadBody(err.to_string()).into()),
    )
    .service(
        web::scope("/api/v1/order")
            .route("", web::post().to(create_order))
            .route("/{order_id}", web::get().to(get_order))
            .route("/{order_id}", web::put().to(update_order))
            .route("/{order_id}", web::delete().to(delete_order)),
    );
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadId(raw.to_string()))
}

async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<OrderItemsRequest>,
) -> Result<HttpResponse, ApiError> {
    let order = service.create(body.into_inner().order_list).await?;
    Ok(HttpResponse::Created().json(order))
}

async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let order = service.get(parse_id(&path)?).await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn update_order(
    service: web::Data<OrderService>,
    path: web::Path<String>,
    body: web::Json<OrderItemsRequest>,
) -> Result<HttpResponse, ApiError> {
    let order = service
        .update_items(parse_id(&path)?, body.into_inner().order_list)
        .await?;
    Ok(HttpResponse::Ok().json(order))
}

async fn delete_order(
    service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    service.delete(parse_id(&path)?).await?;
    Ok(HttpResponse::NoContent().finish())
}
