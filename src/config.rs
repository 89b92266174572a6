//! Service configuration, read from the environment (and `.env` when present).

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::store::DEFAULT_TTL_SECS;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    /// Redis connection URL; may carry credentials, never log it.
    pub redis_url: String,
    pub order_ttl_secs: u64,
    pub inventory_ttl_secs: u64,
    /// Where this process serves the inventory gRPC API.
    pub inventory_grpc_addr: SocketAddr,
    /// Remote inventory endpoint for the scheduler; `None` uses the in-process service.
    pub inventory_endpoint: Option<String>,
    pub http_port: u16,
    /// `None` logs notifications instead of publishing them.
    pub kafka_brokers: Option<String>,
    pub notify_topic: String,
    /// `None` (SCHEDULER_INTERVAL_SECS=0) disables the timer.
    pub scheduler_interval: Option<Duration>,
    pub tick_timeout: Duration,
    pub inventory_timeout: Duration,
    pub scheduler_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let interval_secs: u64 = parse_or("SCHEDULER_INTERVAL_SECS", 5)?;

        Ok(Self {
            store_backend: parse_or("STORE_BACKEND", StoreBackend::Redis)?,
            redis_url: string_or("REDIS_URL", "redis://127.0.0.1:6379"),
            order_ttl_secs: parse_or("ORDER_TTL_SECS", DEFAULT_TTL_SECS)?,
            inventory_ttl_secs: parse_or("INVENTORY_TTL_SECS", DEFAULT_TTL_SECS)?,
            inventory_grpc_addr: parse_or(
                "INVENTORY_GRPC_ADDR",
                SocketAddr::from(([0, 0, 0, 0], 50051)),
            )?,
            inventory_endpoint: non_empty("INVENTORY_ENDPOINT"),
            http_port: parse_or("HTTP_PORT", 8080)?,
            kafka_brokers: non_empty("KAFKA_BROKERS"),
            notify_topic: string_or("NOTIFY_TOPIC", "order-status"),
            scheduler_interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            tick_timeout: Duration::from_secs(parse_or("TICK_TIMEOUT_SECS", 30)?),
            inventory_timeout: Duration::from_secs(parse_or("INVENTORY_TIMEOUT_SECS", 5)?),
            scheduler_seed: non_empty("SCHEDULER_SEED")
                .map(|raw| {
                    raw.parse().map_err(|_| ConfigError::Invalid {
                        name: "SCHEDULER_SEED",
                        value: raw,
                    })
                })
                .transpose()?,
        })
    }
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn string_or(name: &str, default: &str) -> String {
    non_empty(name).unwrap_or_else(|| default.to_string())
}

/// Unset or empty takes the default; anything unparsable is an error.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}
