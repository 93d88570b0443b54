//! Combo meter that rises with actions and decays on a fixed cadence.

use crate::sync::lock;
use crate::ticker::{TickFlow, Ticker};
use idle_core::{FeverConfig, FeverDecay};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct FeverState {
    level: u32,
    running: bool,
    /// Bumped on every (re)arm and disarm; ticks from older armings no-op.
    epoch: u64,
    ticker: Option<Ticker>,
}

impl FeverState {
    fn disarm(&mut self) {
        self.epoch += 1;
        self.ticker = None;
    }

    /// One decay step. Reaching zero disarms the ticker.
    fn decay(&mut self, rule: FeverDecay) -> TickFlow {
        if !self.running || self.level == 0 {
            self.disarm();
            return TickFlow::Stop;
        }
        self.level = self.level.saturating_sub(rule.amount(self.level));
        debug!(level = self.level, "fever decayed");
        if self.level == 0 {
            self.disarm();
            return TickFlow::Stop;
        }
        TickFlow::Continue
    }
}

/// Fever level in `0..=max_level` and its multiplier.
#[derive(Debug)]
pub struct FeverMeter {
    config: FeverConfig,
    state: Arc<Mutex<FeverState>>,
}

impl FeverMeter {
    pub fn new(config: FeverConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(FeverState::default())),
        }
    }

    pub fn level(&self) -> u32 {
        lock(&self.state).level
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    /// Whether a decay task is currently armed.
    pub fn is_decaying(&self) -> bool {
        lock(&self.state).ticker.is_some()
    }

    pub fn current_multiplier(&self) -> Decimal {
        idle_econ::fever_multiplier(&self.config.multipliers, self.level())
    }

    /// Allows decay ticks. Idempotent.
    pub fn start(&self) {
        let mut state = lock(&self.state);
        if state.running {
            return;
        }
        state.running = true;
        if state.level > 0 {
            self.arm(&mut state);
        }
        info!("fever started");
    }

    /// Stops decay and resets the level to zero.
    pub fn stop(&self) {
        let mut state = lock(&self.state);
        state.running = false;
        state.level = 0;
        state.disarm();
        info!("fever stopped");
    }

    /// Raises the level (clamped) and restarts the decay countdown.
    pub fn gain(&self, amount: u32) -> u32 {
        let mut state = lock(&self.state);
        state.level = state
            .level
            .saturating_add(amount)
            .min(self.config.max_level);
        if state.running && state.level > 0 {
            self.arm(&mut state);
        }
        state.level
    }

    /// Applies one decay step now, as the periodic task would.
    pub fn decay_tick(&self) -> u32 {
        let mut state = lock(&self.state);
        state.decay(self.config.decay);
        state.level
    }

    #[cfg(test)]
    pub(crate) fn decay_task(&self) -> Option<crate::ticker::TaskLiveness> {
        lock(&self.state).ticker.as_ref().map(Ticker::liveness)
    }

    fn arm(&self, state: &mut FeverState) {
        state.epoch += 1;
        let epoch = state.epoch;
        let weak: Weak<Mutex<FeverState>> = Arc::downgrade(&self.state);
        let rule = self.config.decay;
        state.ticker = Ticker::spawn(
            "fever-decay",
            Duration::from_millis(self.config.decay_interval_ms),
            move || {
                let Some(shared) = weak.upgrade() else {
                    return TickFlow::Stop;
                };
                let mut state = lock(&shared);
                if state.epoch != epoch {
                    return TickFlow::Stop;
                }
                state.decay(rule)
            },
        );
    }
}

impl Drop for FeverMeter {
    fn drop(&mut self) {
        lock(&self.state).disarm();
    }
}
