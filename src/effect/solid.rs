//! Single face lit at a fixed level, everything else off

use super::{Effect, Timers};
use crate::dimming::DimmingEngine;
use crate::orientation::Face;

#[derive(Debug, Clone)]
pub struct SolidEffect {
    face: Option<Face>,
    level: u8,
}

impl SolidEffect {
    pub const fn new(level: u8) -> Self {
        Self { face: None, level }
    }

    pub fn set_face(&mut self, face: Option<Face>) {
        self.face = face;
    }
}

impl<const N: usize> Effect<N> for SolidEffect {
    fn step(&mut self, _timers: &mut Timers, leds: &mut DimmingEngine<N>) {
        let lit = self.face.map(Face::index);
        for channel in 0..N {
            let level = if Some(channel) == lit { self.level } else { 0 };
            leds.set(channel, level);
        }
    }
}
