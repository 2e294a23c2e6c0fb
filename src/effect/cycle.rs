//! Round-robin cross-fade.
//!
//! One channel at a time brightens to full while the others dim out; every
//! period the next channel takes over.

use super::crossfade::{Crossfade, CrossfadeSlots};
use super::{CrossfadeTiming, Effect, Timers};
use crate::dimming::DimmingEngine;
use crate::timer_bank::slot;

#[derive(Debug, Clone)]
pub struct CycleEffect {
    timing: CrossfadeTiming,
    fade: Crossfade,
    /// Channel selected on the next period
    cursor: usize,
}

impl CycleEffect {
    /// Create the effect; call `reset` before the first step
    pub const fn new(timing: CrossfadeTiming) -> Self {
        Self {
            timing,
            fade: Crossfade::new(CrossfadeSlots {
                rise: slot::CYCLE_RISE,
                fall: slot::CYCLE_FALL,
                period: slot::CYCLE_PERIOD,
            }),
            cursor: 0,
        }
    }

    /// Switch between cadences (idle and rolling) without restarting
    pub fn set_timing(&mut self, timing: CrossfadeTiming) {
        self.timing = timing;
    }

    /// Cadence currently in use
    pub const fn timing(&self) -> CrossfadeTiming {
        self.timing
    }

    /// Channel currently rising, if any
    pub const fn rising(&self) -> Option<usize> {
        self.fade.rising()
    }
}

impl<const N: usize> Effect<N> for CycleEffect {
    fn step(&mut self, timers: &mut Timers, leds: &mut DimmingEngine<N>) {
        if N == 0 {
            return;
        }
        let cursor = &mut self.cursor;
        self.fade.step(&self.timing, timers, leds, || {
            let channel = *cursor % N;
            *cursor = (channel + 1) % N;
            Some(channel)
        });
    }

    fn reset(&mut self, timers: &mut Timers) {
        self.cursor = 1;
        self.fade.select(Some(0), timers);
    }
}
