mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

pub use server::routes;

// ============================================================================
// Metrics - Prometheus instruments for the order lifecycle
// ============================================================================
//
// Scraped from GET /metrics on the HTTP port. Covers:
// - scheduler ticks by outcome, and the transitions they performed
// - inventory gateway latency per call
// - notification delivery and the broker's circuit breaker
//
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub scheduler_ticks: IntCounterVec,
    pub scheduler_tick_duration: HistogramVec,
    pub order_transitions: IntCounterVec,

    pub inventory_call_duration: HistogramVec,

    pub notifications: IntCounterVec,
    pub circuit_breaker_state: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scheduler_ticks = IntCounterVec::new(
            Opts::new("scheduler_ticks_total", "Scheduler ticks by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(scheduler_ticks.clone()))?;

        let scheduler_tick_duration = HistogramVec::new(
            HistogramOpts::new("scheduler_tick_duration_seconds", "Wall time of one scheduler tick")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["outcome"],
        )?;
        registry.register(Box::new(scheduler_tick_duration.clone()))?;

        let order_transitions = IntCounterVec::new(
            Opts::new("order_transitions_total", "Order status transitions performed"),
            &["from", "to"],
        )?;
        registry.register(Box::new(order_transitions.clone()))?;

        let inventory_call_duration = HistogramVec::new(
            HistogramOpts::new("inventory_call_duration_seconds", "Inventory gateway call latency")
                .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["call", "result"],
        )?;
        registry.register(Box::new(inventory_call_duration.clone()))?;

        let notifications = IntCounterVec::new(
            Opts::new("notifications_total", "Status change notifications by result"),
            &["result"],
        )?;
        registry.register(Box::new(notifications.clone()))?;

        let circuit_breaker_state = IntGauge::new(
            "circuit_breaker_state",
            "Notification broker circuit breaker (0=Closed, 1=HalfOpen, 2=Open)",
        )?;
        registry.register(Box::new(circuit_breaker_state.clone()))?;

        Ok(Self {
            registry,
            scheduler_ticks,
            scheduler_tick_duration,
            order_transitions,
            inventory_call_duration,
            notifications,
            circuit_breaker_state,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_tick(&self, outcome: &str, duration_secs: f64) {
        self.scheduler_ticks.with_label_values(&[outcome]).inc();
        self.scheduler_tick_duration
            .with_label_values(&[outcome])
            .observe(duration_secs);
    }

    pub fn record_transition(&self, from: &str, to: &str) {
        self.order_transitions.with_label_values(&[from, to]).inc();
    }

    pub fn record_inventory_call(&self, call: &str, duration_secs: f64, success: bool) {
        let result = if success { "ok" } else { "error" };
        self.inventory_call_duration
            .with_label_values(&[call, result])
            .observe(duration_secs);
    }

    pub fn record_notification(&self, published: bool) {
        let result = if published { "published" } else { "failed" };
        self.notifications.with_label_values(&[result]).inc();
    }
}
