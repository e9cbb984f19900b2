use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Proof that a tick fired for a particular run of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken {
    pub(crate) generation: u64,
}

/// Fixed-cadence timer owned by the engine while a draw is running.
/// Dropping it cancels every pending tick.
#[derive(Debug)]
pub(crate) struct Ticker {
    interval: Interval,
    generation: u64,
}

impl Ticker {
    /// First tick fires one full period after arming.
    pub(crate) fn arm(period: Duration, generation: u64) -> Self {
        let mut interval = interval_at(Instant::now() + period, period);
        // a stalled frame should not turn into a burst of reselections
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            interval,
            generation,
        }
    }

    pub(crate) async fn tick(&mut self) -> TickToken {
        self.interval.tick().await;
        TickToken {
            generation: self.generation,
        }
    }
}
