//! The simulated market clock and the periodic tick that moves it.

use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDateTime};
use tokio::time;

use crate::AppState;

pub const PRICE_UPDATED: &str = "priceUpdated";

#[derive(Debug, Clone)]
pub struct SimClock {
    now: NaiveDateTime,
    step: Duration,
    // last bar of the series; the clock never passes it
    end: Option<NaiveDateTime>,
}

impl SimClock {
    pub fn new(start: NaiveDateTime, step_minutes: i64, end: Option<NaiveDateTime>) -> Self {
        SimClock {
            now: start,
            // out-of-range steps freeze the clock instead of panicking
            step: Duration::try_minutes(step_minutes.max(0)).unwrap_or_else(Duration::zero),
            end,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn is_frozen(&self) -> bool {
        self.step <= Duration::zero() || self.end.is_some_and(|end| self.now >= end)
    }

    /// Moves forward one step, clamped to the end. Returns whether the time changed.
    pub fn advance(&mut self) -> bool {
        if self.is_frozen() {
            return false;
        }

        let next = match (self.now.checked_add_signed(self.step), self.end) {
            (Some(next), Some(end)) => next.min(end),
            (Some(next), None) => next,
            (None, Some(end)) => end,
            (None, None) => return false,
        };

        let moved = next != self.now;
        self.now = next;
        moved
    }
}

/// Advances the shared clock every `tick_secs` and tells open pages to refresh.
/// The ledger is never touched from here.
pub fn spawn_market_clock(state: AppState) -> tokio::task::JoinHandle<()> {
    let period = StdDuration::from_secs(state.settings.tick_secs.max(1));

    tokio::spawn(async move {
        let mut interval = time::interval(period);
        // the first tick fires immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            run_tick(&state).await;
        }
    })
}

pub async fn run_tick(state: &AppState) -> bool {
    let (moved, now) = {
        let mut clock = state.clock.write().await;
        (clock.advance(), clock.now())
    };

    if moved {
        tracing::debug!(market_time = %now, "market clock advanced");
    }

    // pages re-render on every tick, even with a frozen clock
    let _ = state.events_tx.send(PRICE_UPDATED.to_string());
    moved
}
