//! Bank of elapsed-time counters advanced by the periodic tick.
//!
//! Every timing decision in the core (fade cadences, sequence timeouts,
//! debounce windows, the power-off delay) is a non-blocking poll on one of
//! these slots. Slots are identified by index; the indices used by the die
//! are named in [`slot`] so that no two users share one.

use embassy_time::Duration;

const ZERO: Duration = Duration::from_millis(0);

/// Slot indices owned by the die components.
pub mod slot {
    /// Fade-off step cadence
    pub const FADE_OFF: usize = 0;
    /// Cycle effect: rising channel step cadence
    pub const CYCLE_RISE: usize = 1;
    /// Cycle effect: decay step cadence
    pub const CYCLE_FALL: usize = 2;
    /// Cycle effect: channel rotation
    pub const CYCLE_PERIOD: usize = 3;
    /// Blink effect: rising step cadence
    pub const BLINK_RISE: usize = 4;
    /// Blink effect: decay step cadence
    pub const BLINK_FALL: usize = 5;
    /// Blink effect: re-arm period
    pub const BLINK_PERIOD: usize = 6;
    /// Orientation debounce accumulator
    pub const DEBOUNCE: usize = 7;
    /// Age of the latest orientation sample
    pub const SAMPLE_AGE: usize = 8;
    /// Time the stable face has been held
    pub const FACE_HOLD: usize = 9;
    /// Power-on gesture timeout
    pub const SEQUENCE: usize = 10;
    /// Idle power-off delay
    pub const POWER_OFF: usize = 11;
    /// Result display duration
    pub const RESULT: usize = 12;

    /// Number of slots the die needs
    pub const COUNT: usize = 13;
}

/// Fixed-size bank of elapsed-time counters.
#[derive(Debug, Clone)]
pub struct TimerBank<const N: usize> {
    elapsed: [Duration; N],
}

impl<const N: usize> Default for TimerBank<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TimerBank<N> {
    /// Create a bank with every slot at zero
    pub const fn new() -> Self {
        Self { elapsed: [ZERO; N] }
    }

    /// Add `delta` to every slot.
    ///
    /// Called once per tick. In low-power mode `delta` is the longer tick
    /// period, standing in for the ticks that were skipped.
    pub fn advance(&mut self, delta: Duration) {
        for elapsed in &mut self.elapsed {
            *elapsed += delta;
        }
    }

    /// Time accumulated on `slot` since its last reset
    pub fn elapsed(&self, slot: usize) -> Duration {
        debug_assert!(slot < N, "timer slot {slot} out of range");
        self.elapsed.get(slot).copied().unwrap_or(ZERO)
    }

    /// Edge-triggered threshold check.
    ///
    /// Returns `true` and restarts the slot when at least `threshold` has
    /// elapsed. A zero threshold fires on every call.
    pub fn test(&mut self, slot: usize, threshold: Duration) -> bool {
        debug_assert!(slot < N, "timer slot {slot} out of range");
        let Some(elapsed) = self.elapsed.get_mut(slot) else {
            return false;
        };
        if *elapsed < threshold {
            return false;
        }
        *elapsed = ZERO;
        true
    }

    /// Restart `slot` from zero
    pub fn reset(&mut self, slot: usize) {
        debug_assert!(slot < N, "timer slot {slot} out of range");
        if let Some(elapsed) = self.elapsed.get_mut(slot) {
            *elapsed = ZERO;
        }
    }
}
