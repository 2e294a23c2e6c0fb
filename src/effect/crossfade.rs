//! Shared rise/decay mechanics of the cycle and blink effects

use super::{CrossfadeTiming, Timers};
use crate::dimming::{DimmingEngine, MAX_LEVEL};

/// Timer slots a cross-fade owns
#[derive(Debug, Clone, Copy)]
pub(crate) struct CrossfadeSlots {
    pub(crate) rise: usize,
    pub(crate) fall: usize,
    pub(crate) period: usize,
}

/// One rising channel brightens while every other channel decays.
#[derive(Debug, Clone)]
pub(crate) struct Crossfade {
    slots: CrossfadeSlots,
    rising: Option<usize>,
}

impl Crossfade {
    pub(crate) const fn new(slots: CrossfadeSlots) -> Self {
        Self {
            slots,
            rising: None,
        }
    }

    /// Channel currently rising, if any
    pub(crate) const fn rising(&self) -> Option<usize> {
        self.rising
    }

    /// Make `channel` the rising one and restart all cadences
    pub(crate) fn select(&mut self, channel: Option<usize>, timers: &mut Timers) {
        self.rising = channel;
        timers.reset(self.slots.rise);
        timers.reset(self.slots.fall);
        timers.reset(self.slots.period);
    }

    /// Advance the cadences.
    ///
    /// `next` is asked for a new rising channel every `timing.period`.
    pub(crate) fn step<const N: usize>(
        &mut self,
        timing: &CrossfadeTiming,
        timers: &mut Timers,
        leds: &mut DimmingEngine<N>,
        next: impl FnOnce() -> Option<usize>,
    ) {
        if timers.test(self.slots.period, timing.period) {
            self.rising = next();
            timers.reset(self.slots.rise);
        }

        if timers.test(self.slots.fall, timing.fall_step()) {
            let rising = self.rising;
            for (channel, level) in leds.levels_mut().iter_mut().enumerate() {
                if Some(channel) != rising {
                    *level = level.saturating_sub(1);
                }
            }
        }

        let Some(channel) = self.rising else {
            return;
        };
        if timers.test(self.slots.rise, timing.rise_step()) {
            let level = leds.level(channel).saturating_add(1).min(MAX_LEVEL);
            leds.set(channel, level);
            if level >= MAX_LEVEL {
                self.rising = None;
            }
        }
    }
}
