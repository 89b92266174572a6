use actix::prelude::*;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod domain;
mod inventory;
mod messaging;
mod metrics;
mod orders;
mod scheduler;
mod store;
mod utils;

use config::{Config, StoreBackend};
use inventory::{GrpcInventoryClient, InventoryGateway, InventoryService};
use messaging::{LogPublisher, NotificationPublisher, RedpandaPublisher};
use metrics::Metrics;
use orders::OrderService;
use scheduler::{OrderScheduler, OrderSchedulerActor, SchedulerConfig};
use store::{InventoryStore, OrderStore};
use utils::{retry_on_transient, RetryPolicy};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG overrides the default filter, e.g. RUST_LOG=order_lifecycle=trace
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_lifecycle=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order lifecycle service");

    let config = Config::from_env()?;
    let retry = RetryPolicy::default();

    // === 1. Stores ===
    let (order_store, inventory_store): (Arc<dyn OrderStore>, Arc<dyn InventoryStore>) =
        match config.store_backend {
            StoreBackend::Redis => {
                let conn = retry_on_transient("redis", &retry, |_| {
                    store::connect_redis(&config.redis_url)
                })
                .await?;
                (
                    Arc::new(store::RedisOrderStore::new(conn.clone(), config.order_ttl_secs)),
                    Arc::new(store::RedisInventoryStore::new(conn, config.inventory_ttl_secs)),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory stores; nothing survives a restart");
                (
                    Arc::new(store::InMemoryOrderStore::new()),
                    Arc::new(store::InMemoryInventoryStore::new()),
                )
            }
        };

    // === 2. Metrics ===
    let metrics = Arc::new(Metrics::new()?);

    // === 3. Inventory gRPC server ===
    let inventory_service = InventoryService::new(inventory_store);
    let grpc_service = inventory_service.clone();
    let grpc_addr = config.inventory_grpc_addr;
    tokio::spawn(async move {
        if let Err(e) = inventory::serve_inventory(grpc_addr, grpc_service).await {
            tracing::error!(error = %e, "Inventory gRPC server stopped");
        }
    });

    // === 4. Scheduler collaborators ===
    let gateway: Arc<dyn InventoryGateway> = match &config.inventory_endpoint {
        Some(endpoint) => {
            let client = retry_on_transient("inventory", &retry, |_| {
                GrpcInventoryClient::connect(endpoint, config.inventory_timeout)
            })
            .await?;
            Arc::new(client)
        }
        None => {
            tracing::info!("Scheduler uses the in-process inventory service");
            Arc::new(inventory_service)
        }
    };

    let publisher: Arc<dyn NotificationPublisher> = match &config.kafka_brokers {
        Some(brokers) => {
            let gauge = metrics.circuit_breaker_state.clone();
            let publisher = RedpandaPublisher::new(brokers, config.notify_topic.clone())?
                .with_breaker_observer(move |state| gauge.set(state.as_gauge()));
            tracing::info!(topic = %config.notify_topic, "Publishing notifications to Redpanda");
            Arc::new(publisher)
        }
        None => {
            tracing::info!("No brokers configured, notifications go to the log");
            Arc::new(LogPublisher)
        }
    };

    // === 5. Scheduler ===
    let scheduler = OrderScheduler::new(
        order_store.clone(),
        gateway,
        publisher,
        SchedulerConfig {
            tick_timeout: config.tick_timeout,
            inventory_timeout: config.inventory_timeout,
            seed: config.scheduler_seed,
        },
    )
    .with_metrics(metrics.clone());
    let _scheduler = OrderSchedulerActor::new(Arc::new(scheduler), config.scheduler_interval).start();

    // === 6. HTTP: orders, metrics, health ===
    let order_data = web::Data::new(OrderService::new(order_store));
    let metrics_data = web::Data::new(metrics);
    tracing::info!(port = config.http_port, "HTTP server listening");

    HttpServer::new(move || {
        App::new()
            .app_data(order_data.clone())
            .app_data(metrics_data.clone())
            .configure(orders::routes)
            .configure(metrics::routes)
    })
    .bind(("0.0.0.0", config.http_port))?
    .run()
    .await?;

    tracing::info!("🛑 Shutting down");
    Ok(())
}
