//! Fade every lit channel down to zero.
//!
//! Resumable: `start` arms [`MAX_LEVEL`] decrement steps and each `step`
//! call performs at most one of them once its interval has elapsed, so the
//! main loop never blocks while the lights go out.

use embassy_time::Duration;

use super::{Effect, Timers};
use crate::dimming::{DimmingEngine, MAX_LEVEL};
use crate::timer_bank::slot;

#[derive(Debug, Clone)]
pub struct FadeOffEffect {
    /// Total fade duration
    period: Duration,
    /// Decrement steps still to run
    remaining: u8,
}

impl FadeOffEffect {
    pub const fn new(period: Duration) -> Self {
        Self {
            period,
            remaining: 0,
        }
    }

    /// Arm a full fade
    pub fn start(&mut self, timers: &mut Timers) {
        self.remaining = MAX_LEVEL;
        timers.reset(slot::FADE_OFF);
    }

    /// Check if a fade is in progress
    pub const fn is_active(&self) -> bool {
        self.remaining > 0
    }

    fn step_interval(&self) -> Duration {
        self.period / u32::from(MAX_LEVEL)
    }
}

impl<const N: usize> Effect<N> for FadeOffEffect {
    fn step(&mut self, timers: &mut Timers, leds: &mut DimmingEngine<N>) {
        if self.remaining == 0 {
            return;
        }
        if !timers.test(slot::FADE_OFF, self.step_interval()) {
            return;
        }
        for level in leds.levels_mut() {
            *level = level.saturating_sub(1);
        }
        self.remaining -= 1;
    }

    fn reset(&mut self, _timers: &mut Timers) {
        self.remaining = 0;
    }
}
