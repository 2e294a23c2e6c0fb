//! Compile-time configuration of the die.
//!
//! Every threshold and duration the core uses lives here. [`DieConfig::DEFAULT`]
//! holds the values the firmware ships with; boards with a different sensor
//! mounting only need to swap [`ClassifierConfig`].

use embassy_time::Duration;

use crate::effect::CrossfadeTiming;
use crate::orientation::{ClassifierConfig, Face};
use crate::state_machine::OperatingState;

/// Faces that must be shown in order to wake the die
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerOnSequence {
    pub faces: [Face; 3],
    /// Maximum time between two steps of the gesture
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingConfig {
    /// Average face hold time below which the die counts as rolling
    pub threshold: Duration,
    /// Hold time the history is primed with on wake-up
    pub baseline: Duration,
}

impl RollingConfig {
    /// Check that a freshly primed history averages at or above the
    /// threshold even with the current interval at zero
    fn primed_at_rest(&self) -> bool {
        // An overflowing baseline is far above any threshold
        self.baseline
            .checked_mul(3)
            .is_none_or(|primed| primed / 4 >= self.threshold)
    }
}

/// Configuration for the light effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectTimings {
    /// Slow cycle while idle
    pub idle: CrossfadeTiming,
    /// Fast cycle while rolling
    pub rolling: CrossfadeTiming,
    /// Result highlight
    pub blink: CrossfadeTiming,
    /// Duration of the fade before powering off
    pub fade_off: Duration,
    /// Slew step interval in face-test mode
    pub slew: Duration,
    /// Level of the lit face in face-test mode
    pub solid_level: u8,
}

/// Ticks between two sample triggers in each power mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleCadence {
    pub normal: u8,
    pub low_power: u8,
}

/// Configuration for the die core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieConfig {
    pub classifier: ClassifierConfig,
    /// Time a face candidate must hold before it becomes stable
    pub stability_window: Duration,
    /// Samples older than this classify as unknown, `None` trusts the last
    /// sample forever
    pub stale_after: Option<Duration>,
    pub power_on: PowerOnSequence,
    pub rolling: RollingConfig,
    pub timings: EffectTimings,
    /// Idle time before fading out and powering off
    pub power_off_after: Duration,
    /// How long the result blinks before returning to idle
    pub result_display: Duration,
    pub sampling: SampleCadence,
    /// State the machine starts in
    pub start_state: OperatingState,
    /// Bypass the state machine and show the face that is up
    pub face_test: bool,
}

/// Reasons a [`DieConfig`] is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Classification threshold must be positive
    Threshold,
    /// Stability window must be non-zero
    StabilityWindow,
    /// Two consecutive power-on faces are the same
    PowerOnSequence,
    /// Rolling baseline must be above the rolling threshold
    RollingBaseline,
    /// Sample cadence must be at least one tick
    SampleCadence,
}

impl DieConfig {
    pub const DEFAULT: Self = Self {
        classifier: ClassifierConfig::DEFAULT,
        stability_window: Duration::from_millis(75),
        stale_after: Some(Duration::from_millis(250)),
        power_on: PowerOnSequence {
            faces: [Face::ALL[5], Face::ALL[0], Face::ALL[4]],
            timeout: Duration::from_millis(1500),
        },
        rolling: RollingConfig {
            threshold: Duration::from_millis(400),
            baseline: Duration::from_millis(1000),
        },
        timings: EffectTimings {
            idle: CrossfadeTiming {
                period: Duration::from_millis(1000),
                rise: Duration::from_millis(300),
                fall: Duration::from_millis(600),
            },
            rolling: CrossfadeTiming {
                period: Duration::from_millis(150),
                rise: Duration::from_millis(60),
                fall: Duration::from_millis(120),
            },
            blink: CrossfadeTiming {
                period: Duration::from_millis(600),
                rise: Duration::from_millis(150),
                fall: Duration::from_millis(300),
            },
            fade_off: Duration::from_millis(450),
            slew: Duration::from_millis(20),
            solid_level: 10,
        },
        power_off_after: Duration::from_millis(4000),
        result_display: Duration::from_millis(3000),
        sampling: SampleCadence {
            normal: 4,
            low_power: 1,
        },
        start_state: OperatingState::Off,
        face_test: false,
    };

    /// Check the configuration for values the core cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classifier.threshold <= 0 {
            return Err(ConfigError::Threshold);
        }
        if self.stability_window.as_ticks() == 0 {
            return Err(ConfigError::StabilityWindow);
        }
        let [a, b, c] = self.power_on.faces;
        if a == b || b == c {
            return Err(ConfigError::PowerOnSequence);
        }
        if !self.rolling.primed_at_rest() {
            return Err(ConfigError::RollingBaseline);
        }
        if self.sampling.normal == 0 || self.sampling.low_power == 0 {
            return Err(ConfigError::SampleCadence);
        }
        Ok(())
    }

    /// Replace rejected values with their defaults
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if self.classifier.threshold <= 0 {
            self.classifier.threshold = ClassifierConfig::DEFAULT.threshold;
        }
        if self.stability_window.as_ticks() == 0 {
            self.stability_window = Self::DEFAULT.stability_window;
        }
        let [a, b, c] = self.power_on.faces;
        if a == b || b == c {
            self.power_on.faces = Self::DEFAULT.power_on.faces;
        }
        if !self.rolling.primed_at_rest() {
            self.rolling = Self::DEFAULT.rolling;
        }
        self.sampling.normal = self.sampling.normal.max(1);
        self.sampling.low_power = self.sampling.low_power.max(1);
        self
    }
}

impl Default for DieConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
