use actix::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use super::errors::SchedulerError;
use super::order_scheduler::{OrderScheduler, TickOutcome};

// ============================================================================
// Scheduler Actor - hosts the ticker
// ============================================================================
//
// Each Tick runs inside `AtomicResponse`, which blocks the mailbox until the
// tick's future resolves. Interval ticks and manual ticks therefore never
// overlap, and a slow tick delays the next one instead of racing it.
//
// ============================================================================

#[derive(Message)]
#[rtype(result = "Result<TickOutcome, SchedulerError>")]
pub struct Tick;

pub struct OrderSchedulerActor {
    scheduler: Arc<OrderScheduler>,
    /// `None` disables the timer; ticks then only come from explicit messages.
    interval: Option<Duration>,
}

impl OrderSchedulerActor {
    pub fn new(scheduler: Arc<OrderScheduler>, interval: Option<Duration>) -> Self {
        Self {
            scheduler,
            interval,
        }
    }
}

impl Actor for OrderSchedulerActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        match self.interval {
            Some(interval) => {
                tracing::info!(interval_secs = interval.as_secs_f64(), "⏱️ Order scheduler started");
                ctx.run_interval(interval, |_act, ctx| ctx.notify(Tick));
            }
            None => tracing::info!("Order scheduler started without timer"),
        }
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("🛑 Order scheduler stopped");
    }
}

impl Handler<Tick> for OrderSchedulerActor {
    type Result = AtomicResponse<Self, Result<TickOutcome, SchedulerError>>;

    fn handle(&mut self, _msg: Tick, _ctx: &mut Self::Context) -> Self::Result {
        let scheduler = self.scheduler.clone();
        AtomicResponse::new(Box::pin(
            async move { scheduler.tick().await }.into_actor(self),
        ))
    }
}
