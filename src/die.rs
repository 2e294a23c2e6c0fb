//! The die context object.
//!
//! [`Die`] owns every piece of mutable state in the core: timer bank,
//! brightness table, orientation filter, state machine and power mode.
//! Three entry points touch it:
//!
//! - [`Die::tick`] from the periodic tick interrupt,
//! - [`Die::deliver_sample`] from the sample-completion interrupt,
//! - [`Die::run`] from the main loop after it wakes up.
//!
//! They take `&mut self`, so they cannot overlap. On a target where they
//! run from real interrupt handlers, [`SharedDie`] wraps the context in a
//! critical section and queues samples through a [`SampleChannel`].

use core::cell::RefCell;

use critical_section::Mutex;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::channel::SampleChannel;
use crate::config::{ConfigError, DieConfig};
use crate::dimming::DimmingEngine;
use crate::effect::{Effect, SolidEffect, Timers};
use crate::orientation::{Calibration, FACE_COUNT, Face, OrientationFilter, Sample};
use crate::state_machine::{OperatingState, PowerMode, StateMachine};
use crate::{OutputDriver, SensorDriver};

/// Number of LED channels, one per face
pub const CHANNELS: usize = FACE_COUNT;

/// Die control core
#[derive(Debug, Clone)]
pub struct Die {
    config: DieConfig,
    timers: Timers,
    leds: DimmingEngine<CHANNELS>,
    orientation: OrientationFilter,
    machine: StateMachine,
    /// Face-test display, only used when `config.face_test` is set
    solid: SolidEffect,
    ticks_since_sample: u8,
}

impl Die {
    /// Create the core.
    ///
    /// An invalid configuration panics in debug builds; release builds
    /// replace the offending values with defaults.
    pub fn new(config: DieConfig) -> Self {
        debug_assert!(config.validate().is_ok(), "invalid die configuration");
        #[cfg(feature = "esp32-log")]
        if let Err(error) = config.validate() {
            println!("[Die.new] invalid configuration: {:?}", error);
        }
        Self::build(config.sanitized())
    }

    /// Create the core, rejecting an invalid configuration
    pub fn try_new(config: DieConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: DieConfig) -> Self {
        let mut timers = Timers::new();
        let mut leds = DimmingEngine::new();
        let machine = StateMachine::new(config, &mut timers, &mut leds);
        if config.face_test {
            leds.set_slew(config.timings.slew);
        }
        Self {
            config,
            timers,
            leds,
            orientation: OrientationFilter::new(
                config.classifier,
                config.stability_window,
                config.stale_after,
            ),
            machine,
            solid: SolidEffect::new(config.timings.solid_level),
            ticks_since_sample: 0,
        }
    }

    /// Tick handler.
    ///
    /// Advances every timer by the current mode's tick period, renders the
    /// LED outputs and starts a new sample every `sampling` ticks.
    pub fn tick<O: OutputDriver, S: SensorDriver>(&mut self, output: &mut O, sensor: &mut S) {
        let mode = self.mode();
        let delta = mode.tick_period();
        self.timers.advance(delta);
        let frame = self.leds.tick(delta);
        output.write(&frame);

        let cadence = match mode {
            PowerMode::Normal => self.config.sampling.normal,
            PowerMode::LowPower => self.config.sampling.low_power,
        };
        self.ticks_since_sample = self.ticks_since_sample.saturating_add(1);
        if self.ticks_since_sample >= cadence {
            self.ticks_since_sample = 0;
            sensor.start_sample();
        }
    }

    /// Sample-completion handler
    pub fn deliver_sample(&mut self, sample: Sample) {
        self.orientation.deliver(sample, &mut self.timers);
    }

    /// One main-loop iteration.
    ///
    /// Returns the new power mode when it changed, so the caller can
    /// reprogram its tick source.
    pub fn run(&mut self) -> Option<PowerMode> {
        let face = self.orientation.update(&mut self.timers);

        if self.config.face_test {
            self.solid.set_face(face);
            self.solid.step(&mut self.timers, &mut self.leds);
            return None;
        }

        self.machine.step(face, &mut self.timers, &mut self.leds)
    }

    /// Current power mode; face-test mode always runs at the normal rate
    pub const fn mode(&self) -> PowerMode {
        if self.config.face_test {
            PowerMode::Normal
        } else {
            self.machine.mode()
        }
    }

    pub const fn state(&self) -> OperatingState {
        self.machine.state()
    }

    /// Debounced face
    pub const fn face(&self) -> Option<Face> {
        self.orientation.stable()
    }

    /// Brightness table
    pub const fn levels(&self) -> &[u8; CHANNELS] {
        self.leds.levels()
    }

    pub const fn leds(&self) -> &DimmingEngine<CHANNELS> {
        &self.leds
    }

    pub const fn timers(&self) -> &Timers {
        &self.timers
    }

    pub const fn machine(&self) -> &StateMachine {
        &self.machine
    }

    pub const fn orientation(&self) -> &OrientationFilter {
        &self.orientation
    }

    pub const fn config(&self) -> &DieConfig {
        &self.config
    }

    /// Use the latest sample as the level reference, Z axis up
    pub fn calibrate(&mut self, one_g: i16) -> Option<Calibration> {
        let sample = self.orientation.sample()?;
        let calibration = Calibration::from_level_sample(sample, one_g);
        self.orientation.set_calibration(calibration);
        Some(calibration)
    }
}

/// [`Die`] shared between interrupt handlers and the main loop.
///
/// Each entry point runs inside a critical section. Samples are queued by
/// the completion interrupt and handed to the core at the start of the next
/// main-loop iteration.
pub struct SharedDie<const QUEUE: usize> {
    die: Mutex<RefCell<Option<Die>>>,
    samples: SampleChannel<QUEUE>,
}

impl<const QUEUE: usize> SharedDie<QUEUE> {
    /// Create an empty slot, suitable for a `static`
    pub const fn new() -> Self {
        Self {
            die: Mutex::new(RefCell::new(None)),
            samples: SampleChannel::new(),
        }
    }

    /// Place the core into the slot, replacing any previous one
    pub fn install(&self, die: Die) {
        critical_section::with(|cs| {
            *self.die.borrow(cs).borrow_mut() = Some(die);
        });
    }

    /// Run `f` on the core; `None` when nothing is installed
    pub fn with<R>(&self, f: impl FnOnce(&mut Die) -> R) -> Option<R> {
        critical_section::with(|cs| self.die.borrow(cs).borrow_mut().as_mut().map(f))
    }

    /// Tick interrupt entry point
    pub fn on_tick<O: OutputDriver, S: SensorDriver>(&self, output: &mut O, sensor: &mut S) {
        self.with(|die| die.tick(output, sensor));
    }

    /// Sample-completion interrupt entry point.
    ///
    /// The newest sample always gets queued; when the queue is full the
    /// oldest pending one is evicted and returned.
    pub fn on_sample(&self, sample: Sample) -> Option<Sample> {
        self.samples.send_latest(sample)
    }

    /// Main-loop entry point: hand over the newest sample, then run one
    /// iteration
    pub fn run(&self) -> Option<PowerMode> {
        let latest = self.samples.receiver().take_latest();
        self.with(|die| {
            if let Some(sample) = latest {
                die.deliver_sample(sample);
            }
            die.run()
        })
        .flatten()
    }

    /// Samples waiting for the main loop
    pub fn pending_samples(&self) -> usize {
        self.samples.len()
    }
}

impl<const QUEUE: usize> Default for SharedDie<QUEUE> {
    fn default() -> Self {
        Self::new()
    }
}
