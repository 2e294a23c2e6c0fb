//! LED effects built on the dimming engine.
//!
//! Effects are step functions called once per main-loop iteration. Each one
//! keeps its own private state and polls the timer slots it owns; none of
//! them block. Only one effect drives the brightness table at a time.

mod blink;
mod crossfade;
mod cycle;
mod fade_off;
mod solid;

use embassy_time::Duration;

pub use blink::BlinkEffect;
pub use cycle::CycleEffect;
pub use fade_off::FadeOffEffect;
pub use solid::SolidEffect;

use crate::dimming::{DimmingEngine, MAX_LEVEL};
use crate::timer_bank::{TimerBank, slot};

/// Timer bank sized for the die
pub type Timers = TimerBank<{ slot::COUNT }>;

pub trait Effect<const N: usize> {
    /// Advance the effect by one loop iteration
    fn step(&mut self, timers: &mut Timers, leds: &mut DimmingEngine<N>);

    /// Restart the effect from its initial state
    fn reset(&mut self, _timers: &mut Timers) {}
}

/// Timing of a cross-fade style effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossfadeTiming {
    /// Interval between selections of the rising channel
    pub period: Duration,
    /// Time for the rising channel to go from zero to full
    pub rise: Duration,
    /// Time for the other channels to decay from full to zero
    pub fall: Duration,
}

impl CrossfadeTiming {
    /// Interval between two rise steps
    pub fn rise_step(&self) -> Duration {
        self.rise / u32::from(MAX_LEVEL)
    }

    /// Interval between two decay steps
    pub fn fall_step(&self) -> Duration {
        self.fall / u32::from(MAX_LEVEL)
    }
}
