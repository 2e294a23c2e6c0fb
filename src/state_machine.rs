//! Top-level operating state machine.
//!
//! Evaluated once per main-loop iteration. Every guard is a non-blocking
//! check on the stable face, the rolling detector or a timer slot; entry
//! actions run exactly once when a state is entered.
//!
//! | State    | Leaves to | When                                   |
//! |----------|-----------|----------------------------------------|
//! | Off      | PowerOn1  | immediately                            |
//! | PowerOn1 | PowerOn2  | first gesture face is up               |
//! | PowerOn2 | PowerOn3  | second gesture face is up              |
//! | PowerOn3 | Idle      | third gesture face is up               |
//! | PowerOn2/3 | PowerOn1 | gesture timeout                       |
//! | Idle     | Rolling   | rolling condition                      |
//! | Idle     | Off       | power-off delay, after the fade-out    |
//! | Rolling  | Result    | rolling condition cleared              |
//! | Result   | Idle      | result display time elapsed            |

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::config::DieConfig;
use crate::dimming::DimmingEngine;
use crate::effect::{BlinkEffect, CycleEffect, Effect, FadeOffEffect, Timers};
use crate::orientation::Face;
use crate::rolling::RollDetector;
use crate::timer_bank::slot;

/// Tick period in normal mode
pub const NORMAL_TICK: Duration = Duration::from_millis(1);

/// Tick period in low-power mode
pub const LOW_POWER_TICK: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingState {
    /// Lights out, waiting to arm the wake gesture
    Off,
    /// Waiting for the first gesture face
    PowerOn1,
    /// Waiting for the second gesture face
    PowerOn2,
    /// Waiting for the third gesture face
    PowerOn3,
    /// Awake, slow cycle animation
    Idle,
    /// Tumbling, fast cycle animation
    Rolling,
    /// Showing the face that came up
    Result,
}

impl OperatingState {
    /// Check if the die has woken up
    pub const fn is_awake(self) -> bool {
        matches!(self, Self::Idle | Self::Rolling | Self::Result)
    }
}

/// Tick and sampling rate selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    Normal,
    LowPower,
}

impl PowerMode {
    /// Time represented by one tick in this mode
    pub const fn tick_period(self) -> Duration {
        match self {
            Self::Normal => NORMAL_TICK,
            Self::LowPower => LOW_POWER_TICK,
        }
    }

    /// Timer compare value producing this mode's tick from a timer clocked
    /// at `clock_hz`
    #[allow(clippy::cast_possible_truncation)]
    pub const fn timer_divider(self, clock_hz: u32) -> u32 {
        let period_us = self.tick_period().as_micros();
        ((clock_hz as u64 * period_us) / 1_000_000) as u32
    }
}

/// Operating state machine and the effects it drives
#[derive(Debug, Clone)]
pub struct StateMachine {
    config: DieConfig,
    state: OperatingState,
    mode: PowerMode,
    mode_changed: Option<PowerMode>,
    rolling: RollDetector,
    /// Stable face seen on the previous step
    previous_face: Option<Face>,
    /// Last stable face that was known
    last_face: Option<Face>,
    cycle: CycleEffect,
    blink: BlinkEffect,
    fade_off: FadeOffEffect,
    powering_down: bool,
}

impl StateMachine {
    /// Create the machine and run the entry action of
    /// `config.start_state`.
    ///
    /// Starting directly in an awake state also performs the wake-up
    /// actions (primed rolling history, normal mode). Starting in
    /// [`OperatingState::Rolling`] primes the history at the rolling
    /// threshold instead, so the die reads as tumbling until it settles.
    pub fn new<const N: usize>(
        config: DieConfig,
        timers: &mut Timers,
        leds: &mut DimmingEngine<N>,
    ) -> Self {
        let mut machine = Self {
            config,
            state: config.start_state,
            mode: PowerMode::LowPower,
            mode_changed: None,
            rolling: RollDetector::new(config.rolling.threshold),
            previous_face: None,
            last_face: None,
            cycle: CycleEffect::new(config.timings.idle),
            blink: BlinkEffect::new(config.timings.blink),
            fade_off: FadeOffEffect::new(config.timings.fade_off),
            powering_down: false,
        };
        if config.start_state.is_awake() {
            machine.wake(timers);
        }
        if config.start_state == OperatingState::Rolling {
            // Tumbling until one face has been held for about the threshold
            machine.rolling.prime(config.rolling.threshold, timers);
        }
        machine.enter(config.start_state, timers, leds);
        machine.mode_changed = None;
        machine
    }

    pub const fn state(&self) -> OperatingState {
        self.state
    }

    pub const fn mode(&self) -> PowerMode {
        self.mode
    }

    /// Check if the idle fade-out before power-off is running
    pub const fn is_powering_down(&self) -> bool {
        self.powering_down
    }

    /// Last stable face that was not unknown
    pub const fn last_face(&self) -> Option<Face> {
        self.last_face
    }

    pub const fn rolling(&self) -> &RollDetector {
        &self.rolling
    }

    pub const fn cycle(&self) -> &CycleEffect {
        &self.cycle
    }

    pub const fn blink(&self) -> &BlinkEffect {
        &self.blink
    }

    /// Advance one loop iteration with the current stable face.
    ///
    /// Returns the new power mode if this step switched it.
    pub fn step<const N: usize>(
        &mut self,
        face: Option<Face>,
        timers: &mut Timers,
        leds: &mut DimmingEngine<N>,
    ) -> Option<PowerMode> {
        self.track_face(face, timers);

        if let Some(next) = self.transition(face, timers, leds) {
            self.enter(next, timers, leds);
        }

        self.mode_changed.take()
    }

    fn track_face(&mut self, face: Option<Face>, timers: &mut Timers) {
        if face == self.previous_face {
            return;
        }
        self.previous_face = face;
        if face.is_some() {
            self.last_face = face;
        }
        // Gesture steps are not tumbling; only time them once awake.
        if !self.state.is_awake() {
            return;
        }
        self.rolling.record_change(timers);
        if self.state == OperatingState::Idle && !self.powering_down {
            timers.reset(slot::POWER_OFF);
        }
    }

    /// Run the current state's activity and evaluate its guards
    fn transition<const N: usize>(
        &mut self,
        face: Option<Face>,
        timers: &mut Timers,
        leds: &mut DimmingEngine<N>,
    ) -> Option<OperatingState> {
        let [first, second, third] = self.config.power_on.faces;
        let timeout = self.config.power_on.timeout;

        match self.state {
            OperatingState::Off => Some(OperatingState::PowerOn1),
            OperatingState::PowerOn1 => {
                (face == Some(first)).then_some(OperatingState::PowerOn2)
            }
            OperatingState::PowerOn2 => {
                if face == Some(second) {
                    Some(OperatingState::PowerOn3)
                } else if timers.test(slot::SEQUENCE, timeout) {
                    Some(OperatingState::PowerOn1)
                } else {
                    None
                }
            }
            OperatingState::PowerOn3 => {
                if face == Some(third) {
                    Some(OperatingState::Idle)
                } else if timers.test(slot::SEQUENCE, timeout) {
                    Some(OperatingState::PowerOn1)
                } else {
                    None
                }
            }
            OperatingState::Idle => self.idle(timers, leds),
            OperatingState::Rolling => {
                self.cycle.step(timers, leds);
                (!self.rolling.is_rolling(timers)).then_some(OperatingState::Result)
            }
            OperatingState::Result => {
                self.blink.step(timers, leds);
                timers
                    .test(slot::RESULT, self.config.result_display)
                    .then_some(OperatingState::Idle)
            }
        }
    }

    fn idle<const N: usize>(
        &mut self,
        timers: &mut Timers,
        leds: &mut DimmingEngine<N>,
    ) -> Option<OperatingState> {
        if self.powering_down {
            if self.fade_off.is_active() {
                self.fade_off.step(timers, leds);
                return None;
            }
            return Some(OperatingState::Off);
        }

        self.cycle.step(timers, leds);
        if self.rolling.is_rolling(timers) {
            return Some(OperatingState::Rolling);
        }
        if timers.test(slot::POWER_OFF, self.config.power_off_after) {
            #[cfg(feature = "esp32-log")]
            println!("[StateMachine.idle] idle timeout, fading out");
            self.powering_down = true;
            self.fade_off.start(timers);
        }
        None
    }

    /// Switch to `next` and run its entry action
    fn enter<const N: usize>(
        &mut self,
        next: OperatingState,
        timers: &mut Timers,
        leds: &mut DimmingEngine<N>,
    ) {
        #[cfg(feature = "esp32-log")]
        println!("[StateMachine.enter] {:?} -> {:?}", self.state, next);
        self.state = next;

        match next {
            OperatingState::Off => {
                leds.off();
                self.powering_down = false;
                Effect::<N>::reset(&mut self.fade_off, timers);
                self.set_mode(PowerMode::LowPower);
            }
            OperatingState::PowerOn1 => {
                self.set_mode(PowerMode::LowPower);
            }
            OperatingState::PowerOn2 => {
                timers.reset(slot::SEQUENCE);
            }
            OperatingState::PowerOn3 => {
                timers.reset(slot::SEQUENCE);
                self.wake(timers);
            }
            OperatingState::Idle => {
                timers.reset(slot::POWER_OFF);
                self.cycle.set_timing(self.config.timings.idle);
                Effect::<N>::reset(&mut self.cycle, timers);
            }
            OperatingState::Rolling => {
                self.cycle.set_timing(self.config.timings.rolling);
            }
            OperatingState::Result => {
                timers.reset(slot::RESULT);
                self.blink.pin(self.last_face, timers);
            }
        }
    }

    /// Wake-up actions: rolling history at rest, normal mode, power-off
    /// delay restarted
    fn wake(&mut self, timers: &mut Timers) {
        self.rolling.prime(self.config.rolling.baseline, timers);
        self.set_mode(PowerMode::Normal);
        timers.reset(slot::POWER_OFF);
    }

    fn set_mode(&mut self, mode: PowerMode) {
        if self.mode == mode {
            return;
        }
        #[cfg(feature = "esp32-log")]
        println!("[StateMachine.set_mode] {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.mode_changed = Some(mode);
    }
}
