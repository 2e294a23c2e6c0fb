//! Breathing highlight on a single face

use super::crossfade::{Crossfade, CrossfadeSlots};
use super::{CrossfadeTiming, Effect, Timers};
use crate::dimming::DimmingEngine;
use crate::orientation::Face;
use crate::timer_bank::slot;

/// Cross-fade with the rising channel pinned to one face.
///
/// The face rises to full, then decays with the rest until the next period
/// re-arms it. With no face pinned every channel just decays.
#[derive(Debug, Clone)]
pub struct BlinkEffect {
    timing: CrossfadeTiming,
    fade: Crossfade,
    face: Option<Face>,
}

impl BlinkEffect {
    /// Create the effect with no face pinned
    pub const fn new(timing: CrossfadeTiming) -> Self {
        Self {
            timing,
            fade: Crossfade::new(CrossfadeSlots {
                rise: slot::BLINK_RISE,
                fall: slot::BLINK_FALL,
                period: slot::BLINK_PERIOD,
            }),
            face: None,
        }
    }

    /// Pin the highlight to `face` and start rising immediately
    pub fn pin(&mut self, face: Option<Face>, timers: &mut Timers) {
        self.face = face;
        self.fade.select(face.map(Face::index), timers);
    }

    /// Face the highlight is pinned to
    pub const fn face(&self) -> Option<Face> {
        self.face
    }

    /// Channel currently rising, if any
    pub const fn rising(&self) -> Option<usize> {
        self.fade.rising()
    }
}

impl<const N: usize> Effect<N> for BlinkEffect {
    fn step(&mut self, timers: &mut Timers, leds: &mut DimmingEngine<N>) {
        let face = self.face;
        self.fade
            .step(&self.timing, timers, leds, || face.map(Face::index));
    }

    fn reset(&mut self, timers: &mut Timers) {
        self.fade.select(self.face.map(Face::index), timers);
    }
}
