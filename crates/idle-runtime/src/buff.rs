//! Timed multiplier granted by consumables.

use crate::sync::lock;
use crate::ticker::{TickFlow, Ticker};
use idle_core::{ConsumableKind, ConsumableSpec, EconError};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

#[derive(Debug)]
struct BuffState {
    source: Option<ConsumableKind>,
    remaining: u32,
    multiplier: Decimal,
    epoch: u64,
    ticker: Option<Ticker>,
}

impl Default for BuffState {
    fn default() -> Self {
        Self {
            source: None,
            remaining: 0,
            multiplier: Decimal::ONE,
            epoch: 0,
            ticker: None,
        }
    }
}

impl BuffState {
    fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// Back to neutral. Returns false when nothing was running.
    fn clear(&mut self) -> bool {
        let was_active = self.is_active();
        self.source = None;
        self.remaining = 0;
        self.multiplier = Decimal::ONE;
        self.epoch += 1;
        self.ticker = None;
        was_active
    }

    fn countdown(&mut self) -> TickFlow {
        if !self.is_active() {
            return TickFlow::Stop;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            let source = self.source;
            self.clear();
            info!(?source, "buff expired");
            return TickFlow::Stop;
        }
        TickFlow::Continue
    }
}

/// At most one active buff and its countdown.
#[derive(Debug)]
pub struct BuffTimer {
    tick_interval: Duration,
    state: Arc<Mutex<BuffState>>,
}

impl BuffTimer {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            state: Arc::new(Mutex::new(BuffState::default())),
        }
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).is_active()
    }

    pub fn remaining(&self) -> u32 {
        lock(&self.state).remaining
    }

    pub fn source(&self) -> Option<ConsumableKind> {
        lock(&self.state).source
    }

    /// 1.0 whenever no buff is running.
    pub fn current_multiplier(&self) -> Decimal {
        lock(&self.state).multiplier
    }

    /// Starts the buff described by `spec`; fails if one is already running.
    pub fn activate(&self, kind: ConsumableKind, spec: &ConsumableSpec) -> Result<(), EconError> {
        let mut state = lock(&self.state);
        if state.is_active() {
            return Err(EconError::AlreadyActive);
        }
        state.source = Some(kind);
        state.multiplier = spec.multiplier;
        state.remaining = spec.duration_ticks;
        state.epoch += 1;
        if state.remaining == 0 {
            state.clear();
            return Ok(());
        }
        let epoch = state.epoch;
        let weak = Arc::downgrade(&self.state);
        state.ticker = Ticker::spawn("buff-countdown", self.tick_interval, move || {
            let Some(shared) = weak.upgrade() else {
                return TickFlow::Stop;
            };
            let mut state = lock(&shared);
            if state.epoch != epoch {
                return TickFlow::Stop;
            }
            state.countdown()
        });
        info!(?kind, multiplier = %spec.multiplier, ticks = spec.duration_ticks, "buff activated");
        Ok(())
    }

    /// Applies one countdown step now. Returns whether the buff is still active.
    pub fn tick(&self) -> bool {
        let mut state = lock(&self.state);
        state.countdown();
        state.is_active()
    }

    /// Ends the buff early. No-op when inactive.
    pub fn deactivate(&self) {
        let mut state = lock(&self.state);
        if state.is_active() {
            state.clear();
            info!("buff deactivated");
        }
    }
}

impl Drop for BuffTimer {
    fn drop(&mut self) {
        lock(&self.state).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn coffee(ticks: u32) -> ConsumableSpec {
        ConsumableSpec {
            multiplier: Decimal::new(15, 1),
            duration_ticks: ticks,
            price: 100,
        }
    }

    fn timer() -> BuffTimer {
        BuffTimer::new(Duration::from_secs(1))
    }

    #[test]
    fn inactive_is_neutral() {
        let t = timer();
        assert!(!t.is_active());
        assert_eq!(t.current_multiplier(), Decimal::ONE);
        assert_eq!(t.remaining(), 0);
    }

    #[test]
    fn second_activation_is_rejected_without_change() {
        let t = timer();
        t.activate(ConsumableKind::Coffee, &coffee(3)).unwrap();
        assert!(t.tick());
        let other = ConsumableSpec {
            multiplier: Decimal::new(5, 0),
            duration_ticks: 99,
            price: 1,
        };
        assert_eq!(
            t.activate(ConsumableKind::Vacation, &other),
            Err(EconError::AlreadyActive)
        );
        assert_eq!(t.remaining(), 2);
        assert_eq!(t.current_multiplier(), Decimal::new(15, 1));
        assert_eq!(t.source(), Some(ConsumableKind::Coffee));
    }

    #[test]
    fn manual_ticks_expire_to_neutral() {
        let t = timer();
        t.activate(ConsumableKind::Coffee, &coffee(2)).unwrap();
        assert!(t.tick());
        assert!(!t.tick());
        assert_eq!(t.current_multiplier(), Decimal::ONE);
        assert_eq!(t.remaining(), 0);
        // can be used again once expired
        t.activate(ConsumableKind::Coffee, &coffee(2)).unwrap();
    }

    #[test]
    fn deactivate_is_idempotent() {
        let t = timer();
        t.deactivate();
        t.activate(ConsumableKind::Coffee, &coffee(5)).unwrap();
        t.deactivate();
        t.deactivate();
        assert!(!t.is_active());
        assert_eq!(t.current_multiplier(), Decimal::ONE);
    }

    #[tokio::test(start_paused = true)]
    async fn expires_after_duration() {
        let t = timer();
        t.activate(ConsumableKind::Coffee, &coffee(3)).unwrap();
        sleep(Duration::from_millis(2_500)).await;
        assert!(t.is_active());
        assert_eq!(t.remaining(), 1);
        sleep(Duration::from_secs(1)).await;
        assert!(!t.is_active());
        assert_eq!(t.current_multiplier(), Decimal::ONE);
    }

    #[tokio::test(start_paused = true)]
    async fn deactivated_timer_does_not_tick_into_next_buff() {
        let t = timer();
        t.activate(ConsumableKind::Coffee, &coffee(10)).unwrap();
        sleep(Duration::from_millis(500)).await;
        t.deactivate();
        t.activate(ConsumableKind::Coffee, &coffee(10)).unwrap();
        // one countdown, armed at 500ms, has fired at 1500ms
        sleep(Duration::from_millis(1_200)).await;
        assert_eq!(t.remaining(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_countdown() {
        let t = timer();
        t.activate(ConsumableKind::Coffee, &coffee(30)).unwrap();
        sleep(Duration::from_millis(1_500)).await;
        let shared = Arc::clone(&t.state);
        let task = lock(&t.state)
            .ticker
            .as_ref()
            .map(Ticker::liveness)
            .unwrap();
        assert!(task.is_alive());

        drop(t);
        // well before the next tick would be due
        sleep(Duration::from_millis(10)).await;
        assert!(!task.is_alive());

        let remaining = lock(&shared).remaining;
        sleep(Duration::from_secs(10)).await;
        assert_eq!(lock(&shared).remaining, remaining);
    }
}
