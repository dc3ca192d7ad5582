//! Fixed-interval dispatcher: the Nth tick (0-based) fires at `N × stagger`.

use std::time::Duration;

use tokio::time::{interval, Interval, MissedTickBehavior};

#[derive(Debug)]
pub(crate) struct Dispatcher {
    /// `None` when the stagger is zero: every tick is ready immediately.
    interval: Option<Interval>,
}

impl Dispatcher {
    /// Starts the schedule now; the first tick completes immediately.
    pub(crate) fn new(stagger: Duration) -> Self {
        let interval = (!stagger.is_zero()).then(|| {
            let mut iv = interval(stagger);
            iv.set_missed_tick_behavior(MissedTickBehavior::Delay);
            iv
        });
        Self { interval }
    }

    /// Waits for the next slot. Cancel-safe.
    pub(crate) async fn tick(&mut self) {
        match &mut self.interval {
            Some(iv) => {
                iv.tick().await;
            }
            None => tokio::task::yield_now().await,
        }
    }
}
