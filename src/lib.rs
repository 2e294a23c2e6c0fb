#![no_std]

pub mod channel;
pub mod config;
pub mod die;
pub mod dimming;
pub mod effect;
pub mod orientation;
pub mod rolling;
pub mod state_machine;
pub mod timer_bank;

pub use channel::{SampleChannel, TrySendError};
pub use config::{ConfigError, DieConfig};
pub use die::{CHANNELS, Die, SharedDie};
pub use dimming::{DimmingEngine, LEVELS, MAX_LEVEL};
pub use effect::{CrossfadeTiming, Effect, Timers};
pub use orientation::{Face, Sample};
pub use state_machine::{LOW_POWER_TICK, NORMAL_TICK, OperatingState, PowerMode};
pub use timer_bank::TimerBank;
pub use embassy_time::Duration;

/// Abstract LED output trait
///
/// Implement this trait for the board's LED pins. The core only ever
/// switches a channel fully on or off; dimming is done in software.
pub trait OutputDriver {
    /// Switch one channel on or off
    fn set(&mut self, channel: usize, on: bool);

    /// Write a whole frame, one entry per channel
    fn write(&mut self, frame: &[bool]) {
        for (channel, on) in frame.iter().enumerate() {
            self.set(channel, *on);
        }
    }
}

/// Abstract tilt sensor trait
///
/// The finished reading is handed back through [`Die::deliver_sample`] or
/// [`SharedDie::on_sample`] once the conversion completes.
pub trait SensorDriver {
    /// Start an asynchronous three-axis conversion
    fn start_sample(&mut self);
}
