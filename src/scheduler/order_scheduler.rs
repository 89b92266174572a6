use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use super::errors::SchedulerError;
use crate::domain::inventory::{AvailabilityReport, ItemQuantity, ReservationDecision};
use crate::domain::order::{
    is_allowed, transition_for, Order, OrderStatus, OrderStatusChanged, TransitionAction, REJECTED,
};
use crate::inventory::{GatewayError, InventoryGateway};
use crate::messaging::NotificationPublisher;
use crate::metrics::Metrics;
use crate::store::OrderStore;

// ============================================================================
// Order Status Scheduler
// ============================================================================
//
// One tick moves one randomly chosen order one step along its lifecycle:
//
//   1. scan order keys, pick one uniformly at random
//   2. load it and look up its transition
//   3. for Confirmed orders, check inventory and accept / clamp / cancel
//   4. persist under the same key (refreshing the TTL)
//   5. consume accepted stock, then publish the change (both best-effort)
//
// Anything that fails before step 4 leaves the stored order untouched.
// Completed and Cancelled orders are purged: deleted, never re-written and
// never announced. Ticks must not overlap; the actor host serializes them.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Upper bound for one whole tick.
    pub tick_timeout: Duration,
    /// Upper bound for each inventory call inside a tick.
    pub inventory_timeout: Duration,
    /// Fixed seed for order selection; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_timeout: Duration::from_secs(30),
            inventory_timeout: Duration::from_secs(5),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No order keys in the store.
    Idle,
    /// The picked key disappeared between scan and read.
    Vanished { key: String },
    /// The order's status has no forward step.
    Held { order_id: Uuid, status: OrderStatus },
    /// The order was terminal and has been deleted.
    Purged { order_id: Uuid, status: OrderStatus },
    Advanced {
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    },
    /// Inventory could not supply at least one line.
    Cancelled { order_id: Uuid },
}

impl TickOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TickOutcome::Idle => "idle",
            TickOutcome::Vanished { .. } => "vanished",
            TickOutcome::Held { .. } => "held",
            TickOutcome::Purged { .. } => "purged",
            TickOutcome::Advanced { .. } => "advanced",
            TickOutcome::Cancelled { .. } => "cancelled",
        }
    }
}

pub struct OrderScheduler {
    orders: Arc<dyn OrderStore>,
    inventory: Arc<dyn InventoryGateway>,
    publisher: Arc<dyn NotificationPublisher>,
    rng: Mutex<StdRng>,
    config: SchedulerConfig,
    metrics: Option<Arc<Metrics>>,
}

impl OrderScheduler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        inventory: Arc<dyn InventoryGateway>,
        publisher: Arc<dyn NotificationPublisher>,
        config: SchedulerConfig,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            orders,
            inventory,
            publisher,
            rng: Mutex::new(rng),
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run one tick under the tick deadline. Errors are already logged.
    pub async fn tick(&self) -> Result<TickOutcome, SchedulerError> {
        let started = Instant::now();
        let result = tokio::time::timeout(self.config.tick_timeout, self.run_tick())
            .await
            .unwrap_or(Err(SchedulerError::Timeout(self.config.tick_timeout)));

        let label = match &result {
            Ok(outcome) => outcome.label(),
            Err(e) => e.label(),
        };
        if let Some(metrics) = &self.metrics {
            metrics.record_tick(label, started.elapsed().as_secs_f64());
        }

        match &result {
            Ok(TickOutcome::Idle) => tracing::debug!("No pending orders"),
            Ok(TickOutcome::Vanished { key }) => {
                tracing::debug!(key = %key, "Order vanished before it could be read")
            }
            Ok(outcome) => tracing::info!(outcome = ?outcome, "Tick finished"),
            Err(e) if e.is_contract_violation() => {
                tracing::error!(error = %e, "Dropping unit of work")
            }
            Err(e) => tracing::warn!(error = %e, "Tick aborted, order left for the next tick"),
        }

        result
    }

    async fn run_tick(&self) -> Result<TickOutcome, SchedulerError> {
        let keys = self.orders.scan_keys().await?;
        if keys.is_empty() {
            return Ok(TickOutcome::Idle);
        }

        let key = &keys[self.pick_index(keys.len())];
        let Some(mut order) = self.orders.get(key).await? else {
            return Ok(TickOutcome::Vanished { key: key.clone() });
        };

        let from = order.status;
        let transition = transition_for(from);
        let mut reserved = false;

        match (transition.action, transition.to) {
            (TransitionAction::Purge, _) => {
                self.orders.delete(key).await?;
                return Ok(TickOutcome::Purged {
                    order_id: order.order_id,
                    status: from,
                });
            }
            (TransitionAction::Advance, Some(to)) => order.set_status(to),
            (TransitionAction::ReserveInventory, Some(to)) => {
                reserved = self.reserve(&mut order, to).await?;
            }
            _ => {
                return Ok(TickOutcome::Held {
                    order_id: order.order_id,
                    status: from,
                });
            }
        }

        debug_assert!(
            is_allowed(from, order.status),
            "{from} -> {} is not a lifecycle step",
            order.status
        );
        order.recalculate();
        self.orders.set(key, &order).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_transition(from.as_str(), order.status.as_str());
        }

        if reserved {
            self.consume(&order).await;
        }
        self.notify(&order).await;

        if order.status == REJECTED {
            Ok(TickOutcome::Cancelled {
                order_id: order.order_id,
            })
        } else {
            Ok(TickOutcome::Advanced {
                order_id: order.order_id,
                from,
                to: order.status,
            })
        }
    }

    fn pick_index(&self, len: usize) -> usize {
        // A poisoned lock still holds a usable generator.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..len)
    }

    /// Check stock for every line and apply the decision to `order`.
    /// Returns whether the order was accepted and stock should be consumed.
    async fn reserve(&self, order: &mut Order, accepted: OrderStatus) -> Result<bool, SchedulerError> {
        let request = requested_lines(order);
        let report = self.check(&request).await?;

        match ReservationDecision::decide(&order.order_list, &report)? {
            ReservationDecision::Reject { item_id } => {
                tracing::info!(
                    order_id = %order.order_id,
                    item_id = %item_id,
                    "Item out of stock, cancelling order"
                );
                order.set_status(REJECTED);
                Ok(false)
            }
            ReservationDecision::Clamp(clamps) => {
                for clamp in &clamps {
                    order.clamp_line(clamp.index, clamp.available)?;
                    tracing::info!(
                        order_id = %order.order_id,
                        item_id = %clamp.item_id,
                        requested = clamp.requested,
                        available = clamp.available,
                        "Line reduced to available stock"
                    );
                }
                order.set_status(accepted);
                Ok(true)
            }
            ReservationDecision::Accept => {
                order.set_status(accepted);
                Ok(true)
            }
        }
    }

    async fn check(&self, request: &[ItemQuantity]) -> Result<AvailabilityReport, GatewayError> {
        let started = Instant::now();
        let result = tokio::time::timeout(
            self.config.inventory_timeout,
            self.inventory.check_availability(request),
        )
        .await
        .unwrap_or(Err(GatewayError::Timeout(self.config.inventory_timeout)));

        if let Some(metrics) = &self.metrics {
            metrics.record_inventory_call("check", started.elapsed().as_secs_f64(), result.is_ok());
        }
        result
    }

    /// Take the accepted quantities out of stock. The order is already
    /// persisted as accepted, so a failure here is logged and left as a gap
    /// between order and inventory state.
    async fn consume(&self, order: &Order) {
        let request = requested_lines(order);
        let started = Instant::now();
        let result = tokio::time::timeout(
            self.config.inventory_timeout,
            self.inventory.consume(&request),
        )
        .await
        .unwrap_or(Err(GatewayError::Timeout(self.config.inventory_timeout)));

        if let Some(metrics) = &self.metrics {
            metrics.record_inventory_call("consume", started.elapsed().as_secs_f64(), result.is_ok());
        }

        match result {
            Ok(outcome) if outcome.status.is_ok() => {
                tracing::debug!(order_id = %order.order_id, "Inventory consumed");
            }
            Ok(outcome) => tracing::warn!(
                order_id = %order.order_id,
                status = ?outcome.status,
                detail = %outcome.status_message,
                "Inventory partially consumed, order and stock may diverge"
            ),
            Err(e) => tracing::warn!(
                order_id = %order.order_id,
                error = %e,
                "Inventory consume failed, order and stock may diverge"
            ),
        }
    }

    async fn notify(&self, order: &Order) {
        let event = OrderStatusChanged::from(order);
        let published = match self.publisher.publish(&event).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    order_id = %order.order_id,
                    status = %order.status,
                    error = %e,
                    "Failed to publish status change"
                );
                false
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_notification(published);
        }
    }
}

fn requested_lines(order: &Order) -> Vec<ItemQuantity> {
    order
        .order_list
        .iter()
        .map(|line| ItemQuantity::new(line.item_id, line.qty))
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::domain::inventory::{BatchOutcome, InventoryError, InventoryItem, LineAvailability};
    use crate::domain::order::OrderItem;
    use crate::messaging::PublishError;
    use crate::store::{order_key, InMemoryOrderStore, StoreError};

    // ------------------------------------------------------------------------
    // Fakes
    // ------------------------------------------------------------------------

    /// Order store that counts writes, can report keys it does not hold and
    /// can fail or stall like an unreachable Redis.
    #[derive(Default)]
    pub(crate) struct RecordingStore {
        pub inner: InMemoryOrderStore,
        pub writes: AtomicUsize,
        pub deletes: AtomicUsize,
        pub ghost_keys: Vec<String>,
        pub fail_scan: bool,
        pub fail_set: bool,
        pub get_delay: Option<Duration>,
    }

    fn backend_down() -> StoreError {
        StoreError::Backend(redis::RedisError::from((redis::ErrorKind::IoError, "down")))
    }

    #[async_trait]
    impl OrderStore for RecordingStore {
        async fn scan_keys(&self) -> Result<Vec<String>, StoreError> {
            if self.fail_scan {
                return Err(backend_down());
            }
            let mut keys = self.inner.scan_keys().await?;
            keys.extend(self.ghost_keys.iter().cloned());
            Ok(keys)
        }

        async fn get(&self, key: &str) -> Result<Option<Order>, StoreError> {
            if let Some(delay) = self.get_delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, order: &Order) -> Result<(), StoreError> {
            if self.fail_set {
                return Err(backend_down());
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, order).await
        }

        async fn delete(&self, key: &str) -> Result<bool, StoreError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(key).await
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeGateway {
        pub stock: HashMap<Uuid, u64>,
        pub fail_check: bool,
        pub fail_consume: bool,
        pub check_delay: Option<Duration>,
        /// Reply with lines for a different item.
        pub misaligned: bool,
        pub checks: AtomicUsize,
        pub consumed: Mutex<Vec<Vec<ItemQuantity>>>,
    }

    impl FakeGateway {
        pub fn with_stock(stock: impl IntoIterator<Item = (Uuid, u64)>) -> Self {
            Self {
                stock: stock.into_iter().collect(),
                ..Default::default()
            }
        }

        pub fn consumed(&self) -> Vec<Vec<ItemQuantity>> {
            self.consumed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl InventoryGateway for FakeGateway {
        async fn check_availability(
            &self,
            items: &[ItemQuantity],
        ) -> Result<AvailabilityReport, GatewayError> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.check_delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_check {
                return Err(GatewayError::Rpc(tonic::Status::unavailable("inventory down")));
            }

            let lines = items
                .iter()
                .map(|requested| {
                    let stock = self.stock.get(&requested.item_id).map(|qty| InventoryItem {
                        item_id: requested.item_id,
                        qty: *qty,
                    });
                    let mut line = LineAvailability::evaluate(requested, stock.as_ref());
                    if self.misaligned {
                        line.item_id = Uuid::new_v4();
                    }
                    line
                })
                .collect();
            Ok(AvailabilityReport::from_lines(lines))
        }

        async fn consume(&self, items: &[ItemQuantity]) -> Result<BatchOutcome, GatewayError> {
            self.consumed.lock().unwrap().push(items.to_vec());
            if self.fail_consume {
                return Err(GatewayError::Contract(InventoryError::EmptyRequest));
            }
            Ok(BatchOutcome::ok("consumed"))
        }
    }

    #[derive(Default)]
    pub(crate) struct RecordingPublisher {
        pub fail: bool,
        pub events: Mutex<Vec<OrderStatusChanged>>,
    }

    impl RecordingPublisher {
        pub fn events(&self) -> Vec<OrderStatusChanged> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationPublisher for RecordingPublisher {
        async fn publish(&self, event: &OrderStatusChanged) -> Result<(), PublishError> {
            self.events.lock().unwrap().push(event.clone());
            if self.fail {
                return Err(PublishError::CircuitOpen);
            }
            Ok(())
        }
    }

    // ------------------------------------------------------------------------
    // Harness
    // ------------------------------------------------------------------------

    struct Harness {
        store: Arc<RecordingStore>,
        gateway: Arc<FakeGateway>,
        publisher: Arc<RecordingPublisher>,
        scheduler: OrderScheduler,
    }

    fn harness(store: RecordingStore, gateway: FakeGateway, publisher: RecordingPublisher) -> Harness {
        let store = Arc::new(store);
        let gateway = Arc::new(gateway);
        let publisher = Arc::new(publisher);
        let scheduler = OrderScheduler::new(
            store.clone(),
            gateway.clone(),
            publisher.clone(),
            SchedulerConfig {
                tick_timeout: Duration::from_secs(5),
                inventory_timeout: Duration::from_millis(200),
                seed: Some(42),
            },
        );
        Harness {
            store,
            gateway,
            publisher,
            scheduler,
        }
    }

    async fn seed_order(store: &RecordingStore, status: OrderStatus, items: Vec<OrderItem>) -> Order {
        let mut order = Order::new(items).unwrap();
        order.set_status(status);
        store.inner.set(&order_key(order.order_id), &order).await.unwrap();
        order
    }

    async fn stored(h: &Harness, order: &Order) -> Option<Order> {
        h.store.inner.get(&order_key(order.order_id)).await.unwrap()
    }

    fn writes(h: &Harness) -> usize {
        h.store.writes.load(Ordering::SeqCst)
    }

    // ------------------------------------------------------------------------
    // Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_store_is_idle() {
        let h = harness(Default::default(), Default::default(), Default::default());

        assert_eq!(h.scheduler.tick().await.unwrap(), TickOutcome::Idle);
        assert_eq!(writes(&h), 0);
        assert!(h.publisher.events().is_empty());
    }

    #[tokio::test]
    async fn test_created_advances_to_confirmed_and_notifies() {
        let h = harness(Default::default(), Default::default(), Default::default());
        let order = seed_order(
            &h.store,
            OrderStatus::Created,
            vec![OrderItem::new(Uuid::new_v4(), 10, 2)],
        )
        .await;

        let outcome = h.scheduler.tick().await.unwrap();

        assert_eq!(
            outcome,
            TickOutcome::Advanced {
                order_id: order.order_id,
                from: OrderStatus::Created,
                to: OrderStatus::Confirmed,
            }
        );
        let saved = stored(&h, &order).await.unwrap();
        assert_eq!(saved.status, OrderStatus::Confirmed);
        assert_eq!(saved.status_message, "confirmed");
        assert_eq!(h.gateway.checks.load(Ordering::SeqCst), 0);

        let events = h.publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_full_lifecycle_ends_with_purge() {
        let a = Uuid::new_v4();
        let h = harness(
            Default::default(),
            FakeGateway::with_stock([(a, 2)]),
            Default::default(),
        );
        let order = seed_order(&h.store, OrderStatus::Created, vec![OrderItem::new(a, 10, 2)]).await;

        let expected = [
            OrderStatus::Confirmed,
            OrderStatus::Packaged,
            OrderStatus::InDelivery,
            OrderStatus::Completed,
        ];
        for status in expected {
            h.scheduler.tick().await.unwrap();
            let saved = stored(&h, &order).await.unwrap();
            assert_eq!(saved.status, status);
            assert_eq!(saved.sum, 20);
        }

        let outcome = h.scheduler.tick().await.unwrap();
        assert_eq!(
            outcome,
            TickOutcome::Purged {
                order_id: order.order_id,
                status: OrderStatus::Completed,
            }
        );
        assert_eq!(stored(&h, &order).await, None);
        assert_eq!(h.publisher.events().len(), 4);
    }

    #[tokio::test]
    async fn test_full_availability_packages_unchanged() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let h = harness(
            Default::default(),
            FakeGateway::with_stock([(a, 100), (b, 3)]),
            Default::default(),
        );
        let order = seed_order(
            &h.store,
            OrderStatus::Confirmed,
            vec![OrderItem::new(a, 10, 5), OrderItem::new(b, 20, 3)],
        )
        .await;

        h.scheduler.tick().await.unwrap();

        let saved = stored(&h, &order).await.unwrap();
        assert_eq!(saved.status, OrderStatus::Packaged);
        assert_eq!(saved.order_list, order.order_list);
        assert_eq!(saved.sum, 110);
        assert_eq!(
            h.gateway.consumed(),
            vec![vec![ItemQuantity::new(a, 5), ItemQuantity::new(b, 3)]]
        );
    }

    #[tokio::test]
    async fn test_zero_availability_cancels_without_consuming() {
        let a = Uuid::new_v4();
        let h = harness(Default::default(), FakeGateway::default(), Default::default());
        let order = seed_order(&h.store, OrderStatus::Confirmed, vec![OrderItem::new(a, 10, 5)]).await;

        let outcome = h.scheduler.tick().await.unwrap();

        assert_eq!(
            outcome,
            TickOutcome::Cancelled {
                order_id: order.order_id
            }
        );
        let saved = stored(&h, &order).await.unwrap();
        assert_eq!(saved.status, OrderStatus::Cancelled);
        assert_eq!(saved.order_list, order.order_list);
        assert!(h.gateway.consumed().is_empty());
        assert_eq!(h.publisher.events()[0].status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_one_empty_line_cancels_whole_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let h = harness(
            Default::default(),
            FakeGateway::with_stock([(a, 100)]),
            Default::default(),
        );
        let order = seed_order(
            &h.store,
            OrderStatus::Confirmed,
            vec![OrderItem::new(a, 10, 5), OrderItem::new(b, 20, 3)],
        )
        .await;

        h.scheduler.tick().await.unwrap();

        assert_eq!(stored(&h, &order).await.unwrap().status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_partial_availability_clamps_and_packages() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let h = harness(
            Default::default(),
            FakeGateway::with_stock([(a, 3), (b, 3)]),
            Default::default(),
        );
        let order = seed_order(
            &h.store,
            OrderStatus::Confirmed,
            vec![OrderItem::new(a, 10, 5), OrderItem::new(b, 20, 3)],
        )
        .await;

        h.scheduler.tick().await.unwrap();

        let saved = stored(&h, &order).await.unwrap();
        assert_eq!(saved.status, OrderStatus::Packaged);
        assert_eq!(saved.order_list[0].qty, 3);
        assert_eq!(saved.order_list[1].qty, 3);
        assert_eq!(saved.sum, 120);
        assert_eq!(
            h.gateway.consumed(),
            vec![vec![ItemQuantity::new(a, 3), ItemQuantity::new(b, 3)]]
        );
    }

    #[tokio::test]
    async fn test_terminal_orders_are_purged_without_write_or_notify() {
        for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
            let h = harness(Default::default(), Default::default(), Default::default());
            let order = seed_order(
                &h.store,
                status,
                vec![OrderItem::new(Uuid::new_v4(), 10, 1)],
            )
            .await;

            let outcome = h.scheduler.tick().await.unwrap();

            assert_eq!(
                outcome,
                TickOutcome::Purged {
                    order_id: order.order_id,
                    status,
                }
            );
            assert_eq!(writes(&h), 0);
            assert!(h.publisher.events().is_empty());
            assert_eq!(stored(&h, &order).await, None);
        }
    }

    #[tokio::test]
    async fn test_undefined_status_is_held() {
        let h = harness(Default::default(), Default::default(), Default::default());
        let order = seed_order(
            &h.store,
            OrderStatus::Undefined,
            vec![OrderItem::new(Uuid::new_v4(), 10, 1)],
        )
        .await;

        let outcome = h.scheduler.tick().await.unwrap();

        assert!(matches!(outcome, TickOutcome::Held { .. }));
        assert_eq!(writes(&h), 0);
        assert_eq!(stored(&h, &order).await, Some(order));
    }

    #[tokio::test]
    async fn test_check_failure_leaves_order_untouched() {
        let gateway = FakeGateway {
            fail_check: true,
            ..Default::default()
        };
        let h = harness(Default::default(), gateway, Default::default());
        let order = seed_order(
            &h.store,
            OrderStatus::Confirmed,
            vec![OrderItem::new(Uuid::new_v4(), 10, 1)],
        )
        .await;

        let err = h.scheduler.tick().await.unwrap_err();

        assert!(matches!(err, SchedulerError::Inventory(_)));
        assert!(!err.is_contract_violation());
        assert_eq!(writes(&h), 0);
        assert!(h.publisher.events().is_empty());
        assert_eq!(stored(&h, &order).await, Some(order));
    }

    #[tokio::test]
    async fn test_slow_inventory_times_out_without_persisting() {
        let gateway = FakeGateway {
            check_delay: Some(Duration::from_secs(2)),
            ..Default::default()
        };
        let h = harness(Default::default(), gateway, Default::default());
        let order = seed_order(
            &h.store,
            OrderStatus::Confirmed,
            vec![OrderItem::new(Uuid::new_v4(), 10, 1)],
        )
        .await;

        let err = h.scheduler.tick().await.unwrap_err();

        assert!(matches!(err, SchedulerError::Inventory(GatewayError::Timeout(_))));
        assert_eq!(stored(&h, &order).await.unwrap().status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_misaligned_reply_drops_the_tick() {
        let a = Uuid::new_v4();
        let gateway = FakeGateway {
            misaligned: true,
            ..FakeGateway::with_stock([(a, 10)])
        };
        let h = harness(Default::default(), gateway, Default::default());
        let order = seed_order(&h.store, OrderStatus::Confirmed, vec![OrderItem::new(a, 10, 1)]).await;

        let err = h.scheduler.tick().await.unwrap_err();

        assert!(err.is_contract_violation());
        assert_eq!(stored(&h, &order).await.unwrap().status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_consume_failure_still_persists_packaged() {
        let a = Uuid::new_v4();
        let gateway = FakeGateway {
            fail_consume: true,
            ..FakeGateway::with_stock([(a, 10)])
        };
        let h = harness(Default::default(), gateway, Default::default());
        let order = seed_order(&h.store, OrderStatus::Confirmed, vec![OrderItem::new(a, 10, 2)]).await;

        let outcome = h.scheduler.tick().await.unwrap();

        assert!(matches!(outcome, TickOutcome::Advanced { to: OrderStatus::Packaged, .. }));
        assert_eq!(stored(&h, &order).await.unwrap().status, OrderStatus::Packaged);
        assert_eq!(h.gateway.consumed().len(), 1);
        assert_eq!(h.publisher.events().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_roll_back() {
        let publisher = RecordingPublisher {
            fail: true,
            ..Default::default()
        };
        let h = harness(Default::default(), Default::default(), publisher);
        let order = seed_order(
            &h.store,
            OrderStatus::Packaged,
            vec![OrderItem::new(Uuid::new_v4(), 10, 1)],
        )
        .await;

        let outcome = h.scheduler.tick().await.unwrap();

        assert!(matches!(outcome, TickOutcome::Advanced { to: OrderStatus::InDelivery, .. }));
        assert_eq!(stored(&h, &order).await.unwrap().status, OrderStatus::InDelivery);
    }

    #[tokio::test]
    async fn test_vanished_key_is_benign() {
        let store = RecordingStore {
            ghost_keys: vec![order_key(Uuid::new_v4())],
            ..Default::default()
        };
        let h = harness(store, Default::default(), Default::default());

        let outcome = h.scheduler.tick().await.unwrap();

        assert!(matches!(outcome, TickOutcome::Vanished { .. }));
        assert_eq!(writes(&h), 0);
        assert!(h.publisher.events().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_record_drops_the_tick() {
        let h = harness(Default::default(), Default::default(), Default::default());
        h.store.inner.insert_raw("api-orders:corrupt", "{not json").await;

        let err = h.scheduler.tick().await.unwrap_err();

        assert!(err.is_contract_violation());
        assert_eq!(err.label(), "dropped");
        assert_eq!(writes(&h), 0);
    }

    #[tokio::test]
    async fn test_sum_matches_lines_after_every_transition() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let h = harness(
            Default::default(),
            FakeGateway::with_stock([(a, 1), (b, 50)]),
            Default::default(),
        );
        let order = seed_order(
            &h.store,
            OrderStatus::Created,
            vec![OrderItem::new(a, 7, 4), OrderItem::new(b, 3, 9)],
        )
        .await;

        for _ in 0..4 {
            h.scheduler.tick().await.unwrap();
            let saved = stored(&h, &order).await.unwrap();
            let expected: u64 = saved.order_list.iter().map(|l| l.cost * l.qty).sum();
            assert_eq!(saved.sum, expected);
        }
    }

    #[test]
    fn test_seeded_selection_is_reproducible() {
        let build = || {
            OrderScheduler::new(
                Arc::new(RecordingStore::default()),
                Arc::new(FakeGateway::default()),
                Arc::new(RecordingPublisher::default()),
                SchedulerConfig {
                    seed: Some(7),
                    ..Default::default()
                },
            )
        };
        let (first, second) = (build(), build());

        let picks: Vec<usize> = (0..20).map(|_| first.pick_index(10)).collect();
        let again: Vec<usize> = (0..20).map(|_| second.pick_index(10)).collect();

        assert_eq!(picks, again);
        assert!(picks.iter().all(|i| *i < 10));
    }

    #[tokio::test]
    async fn test_metrics_record_tick_outcomes() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let h = harness(Default::default(), Default::default(), Default::default());
        let scheduler = h.scheduler.with_metrics(metrics.clone());

        scheduler.tick().await.unwrap();

        let gathered = metrics.registry().gather();
        let ticks = gathered
            .iter()
            .find(|m| m.name() == "scheduler_ticks_total")
            .unwrap();
        assert_eq!(ticks.metric[0].counter.value, Some(1.0));
    }

    #[tokio::test]
    async fn test_scan_failure_aborts_tick() {
        let store = RecordingStore {
            fail_scan: true,
            ..Default::default()
        };
        let h = harness(store, Default::default(), Default::default());
        let order = seed_order(
            &h.store,
            OrderStatus::Created,
            vec![OrderItem::new(Uuid::new_v4(), 10, 2)],
        )
        .await;

        let err = h.scheduler.tick().await.unwrap_err();

        assert!(matches!(err, SchedulerError::Store(_)));
        assert_eq!(err.label(), "failed");
        assert_eq!(writes(&h), 0);
        assert!(h.publisher.events().is_empty());
        assert_eq!(stored(&h, &order).await.unwrap().status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_write_failure_leaves_order_unchanged() {
        let item = Uuid::new_v4();
        let store = RecordingStore {
            fail_set: true,
            ..Default::default()
        };
        let h = harness(store, FakeGateway::with_stock([(item, 10)]), Default::default());
        let order = seed_order(
            &h.store,
            OrderStatus::Confirmed,
            vec![OrderItem::new(item, 10, 2)],
        )
        .await;

        let err = h.scheduler.tick().await.unwrap_err();

        assert!(matches!(err, SchedulerError::Store(_)));
        assert!(!err.is_contract_violation());
        assert_eq!(h.gateway.checks.load(Ordering::SeqCst), 1);
        assert!(h.gateway.consumed().is_empty());
        assert!(h.publisher.events().is_empty());

        let saved = stored(&h, &order).await.unwrap();
        assert_eq!(saved.status, OrderStatus::Confirmed);
        assert_eq!(saved.order_list, order.order_list);
    }

    #[tokio::test]
    async fn test_slow_store_hits_tick_deadline() {
        let store = Arc::new(RecordingStore {
            get_delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        let publisher = Arc::new(RecordingPublisher::default());
        let scheduler = OrderScheduler::new(
            store.clone(),
            Arc::new(FakeGateway::default()),
            publisher.clone(),
            SchedulerConfig {
                tick_timeout: Duration::from_millis(50),
                inventory_timeout: Duration::from_millis(20),
                seed: Some(1),
            },
        );
        let order = seed_order(
            &store,
            OrderStatus::Packaged,
            vec![OrderItem::new(Uuid::new_v4(), 5, 1)],
        )
        .await;

        let err = scheduler.tick().await.unwrap_err();

        assert!(matches!(err, SchedulerError::Timeout(_)));
        assert_eq!(err.label(), "timeout");
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert!(publisher.events().is_empty());
        let saved = store.inner.get(&order_key(order.order_id)).await.unwrap().unwrap();
        assert_eq!(saved.status, OrderStatus::Packaged);
    }
}
