//! Software dimming engine.
//!
//! Each channel holds a brightness level that is turned into a binary output
//! every tick by comparing it against a shared sawtooth counter. Over one
//! counter period a channel at level `b` is on for `b` ticks out of
//! [`LEVELS`], which gives visually smooth dimming on plain GPIO outputs.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

/// Length of one duty cycle in ticks
pub const LEVELS: u8 = 16;

/// Highest brightness an effect may set
pub const MAX_LEVEL: u8 = LEVELS - 1;

const CYCLE_MASK: u8 = LEVELS - 1;

const _: () = assert!(LEVELS.is_power_of_two(), "LEVELS must be a power of two");

/// Slew limiter that moves the rendered level towards the target one step
/// at a time.
#[derive(Debug, Clone, Copy)]
struct Slew {
    interval: Duration,
    elapsed: Duration,
}

/// Per-channel brightness table and renderer.
#[derive(Debug, Clone)]
pub struct DimmingEngine<const N: usize> {
    /// Brightness written by the effects
    target: [u8; N],
    /// Brightness actually rendered (differs from `target` while slewing)
    rendered: [u8; N],
    /// Shared duty-cycle counter
    cycle: u8,
    slew: Option<Slew>,
}

impl<const N: usize> Default for DimmingEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DimmingEngine<N> {
    /// Create an engine with every channel off
    pub const fn new() -> Self {
        Self {
            target: [0; N],
            rendered: [0; N],
            cycle: 0,
            slew: None,
        }
    }

    /// Enable the slew limiter.
    ///
    /// Rendered levels then follow the brightness table by one step every
    /// `interval` instead of jumping to it.
    pub fn set_slew(&mut self, interval: Duration) {
        if self.slew.is_none() {
            self.rendered = self.target;
        }
        self.slew = Some(Slew {
            interval,
            elapsed: Duration::from_millis(0),
        });
    }

    /// Disable the slew limiter; rendered levels jump to their targets
    pub fn clear_slew(&mut self) {
        self.slew = None;
        self.rendered = self.target;
    }

    /// Check if the slew limiter is enabled
    pub const fn is_slewing(&self) -> bool {
        self.slew.is_some()
    }

    /// Set one channel, clamped to [`MAX_LEVEL`]
    pub fn set(&mut self, channel: usize, level: u8) {
        debug_assert!(channel < N, "dimming channel {channel} out of range");
        if let Some(slot) = self.target.get_mut(channel) {
            *slot = level.min(MAX_LEVEL);
        }
    }

    /// Get the target level of one channel
    pub fn level(&self, channel: usize) -> u8 {
        debug_assert!(channel < N, "dimming channel {channel} out of range");
        self.target.get(channel).copied().unwrap_or(0)
    }

    /// Brightness table
    pub const fn levels(&self) -> &[u8; N] {
        &self.target
    }

    /// Mutable brightness table.
    ///
    /// Writers are responsible for keeping levels within [`MAX_LEVEL`]; a
    /// level of [`LEVELS`] or more renders as always on.
    pub fn levels_mut(&mut self) -> &mut [u8; N] {
        &mut self.target
    }

    /// Levels as they are currently rendered
    pub const fn rendered(&self) -> &[u8; N] {
        if self.slew.is_some() {
            &self.rendered
        } else {
            &self.target
        }
    }

    /// Check if every channel is at zero
    pub fn is_dark(&self) -> bool {
        self.target.iter().all(|level| *level == 0)
    }

    /// Turn every channel off immediately, bypassing the slew limiter
    pub fn off(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[DimmingEngine.off] all channels off");
        self.target = [0; N];
        self.rendered = [0; N];
    }

    /// Render the outputs for a given duty-cycle counter value.
    ///
    /// A channel is on iff its level is greater than `cycle mod LEVELS`.
    pub fn render(&self, cycle: u8) -> [bool; N] {
        let phase = cycle & CYCLE_MASK;
        let levels = self.rendered();
        let mut outputs = [false; N];
        for (output, level) in outputs.iter_mut().zip(levels) {
            *output = *level > phase;
        }
        outputs
    }

    /// Advance one tick: step the slew limiter, render the outputs for the
    /// current counter value, then move the counter on.
    pub fn tick(&mut self, delta: Duration) -> [bool; N] {
        self.step_slew(delta);
        let outputs = self.render(self.cycle);
        self.cycle = self.cycle.wrapping_add(1) & CYCLE_MASK;
        outputs
    }

    fn step_slew(&mut self, delta: Duration) {
        let Some(slew) = self.slew.as_mut() else {
            return;
        };
        slew.elapsed += delta;
        if slew.elapsed < slew.interval {
            return;
        }
        slew.elapsed = Duration::from_millis(0);
        for (rendered, target) in self.rendered.iter_mut().zip(&self.target) {
            if *rendered < *target {
                *rendered += 1;
            } else if *rendered > *target {
                *rendered -= 1;
            }
        }
    }
}
