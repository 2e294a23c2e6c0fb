//! Tumble detection from face hold times.
//!
//! While the die is rolling the stable face changes every few hundred
//! milliseconds; at rest it does not change at all. The detector keeps the
//! last few hold intervals plus the one in progress and compares their
//! average against a threshold, which smooths over a single long pause in
//! the middle of a roll.

use embassy_time::Duration;
use heapless::HistoryBuffer;

use crate::effect::Timers;
use crate::timer_bank::slot;

/// Number of completed hold intervals kept
pub const HISTORY_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct RollDetector {
    threshold: Duration,
    history: HistoryBuffer<Duration, HISTORY_LEN>,
}

impl RollDetector {
    pub const fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            history: HistoryBuffer::new(),
        }
    }

    /// Fill the history with `baseline` and restart the current interval.
    ///
    /// With a baseline well above the threshold the die reads as at rest
    /// until several quick face changes have been seen.
    pub fn prime(&mut self, baseline: Duration, timers: &mut Timers) {
        for _ in 0..HISTORY_LEN {
            self.history.write(baseline);
        }
        timers.reset(slot::FACE_HOLD);
    }

    /// Close the current hold interval; call when the stable face changes
    pub fn record_change(&mut self, timers: &mut Timers) {
        self.history.write(timers.elapsed(slot::FACE_HOLD));
        timers.reset(slot::FACE_HOLD);
    }

    /// Average of the stored intervals and the one in progress
    pub fn average(&self, timers: &Timers) -> Duration {
        let current = timers.elapsed(slot::FACE_HOLD);
        let total = self
            .history
            .as_slice()
            .iter()
            .fold(current, |sum, interval| {
                sum.checked_add(*interval).unwrap_or(Duration::MAX)
            });
        #[allow(clippy::cast_possible_truncation)]
        let count = (self.history.len() + 1) as u32;
        total / count
    }

    /// Check if the die is tumbling
    pub fn is_rolling(&self, timers: &Timers) -> bool {
        self.average(timers) < self.threshold
    }
}
