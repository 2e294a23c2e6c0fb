//! Orientation filter: raw tilt samples to a debounced face.
//!
//! A sample is first corrected by the calibration offsets, then classified
//! by a list of ordered axis rules. The raw classification flickers near
//! face boundaries, so the externally visible face only changes after the
//! candidate has held steady for the stability window. Stability is measured
//! in time on a timer slot, not in samples, so it behaves the same in both
//! power modes.

use embassy_time::Duration;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::effect::Timers;
use crate::timer_bank::slot;

/// Number of faces on the die
pub const FACE_COUNT: usize = 6;

/// One of the six faces, `0..6`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Face(u8);

impl Face {
    /// All faces in index order
    pub const ALL: [Face; FACE_COUNT] = [Face(0), Face(1), Face(2), Face(3), Face(4), Face(5)];

    /// Create a face from its index, `None` when out of range
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < FACE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Index of the face, also the LED channel that marks it
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Three-axis signed accelerometer reading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Sample {
    /// Create a reading from raw axis values
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Value of one axis
    pub const fn axis(&self, axis: Axis) -> i16 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Which side of the threshold an axis must be on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Reading above `+threshold`
    Positive,
    /// Reading below `-threshold`
    Negative,
}

/// Maps one axis direction to a face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRule {
    pub axis: Axis,
    pub direction: Direction,
    pub face: Face,
}

impl AxisRule {
    pub const fn new(axis: Axis, direction: Direction, face: Face) -> Self {
        Self {
            axis,
            direction,
            face,
        }
    }

    fn matches(&self, sample: &Sample, threshold: i16) -> bool {
        let value = sample.axis(self.axis);
        match self.direction {
            Direction::Positive => value > threshold,
            Direction::Negative => value < threshold.saturating_neg(),
        }
    }
}

/// Per-axis offsets subtracted from every sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calibration {
    pub offset: Sample,
}

impl Calibration {
    /// Derive offsets from a sample taken at rest with the Z axis up.
    ///
    /// `one_g` is the reading the sensor reports for one g.
    pub const fn from_level_sample(sample: Sample, one_g: i16) -> Self {
        Self {
            offset: Sample {
                x: sample.x,
                y: sample.y,
                z: sample.z.saturating_sub(one_g),
            },
        }
    }

    pub const fn apply(&self, sample: Sample) -> Sample {
        Sample {
            x: sample.x.saturating_sub(self.offset.x),
            y: sample.y.saturating_sub(self.offset.y),
            z: sample.z.saturating_sub(self.offset.z),
        }
    }
}

/// Axis thresholds and the face assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Magnitude an axis must exceed to select a face
    pub threshold: i16,
    /// Rules evaluated in order, first match wins
    pub rules: [AxisRule; FACE_COUNT],
    /// Result when no rule matches, `None` for unknown
    pub fallback: Option<Face>,
    pub calibration: Calibration,
}

impl ClassifierConfig {
    /// 8-bit sensor at 255 per g, faces X+, X-, Y+, Y-, Z+, Z-
    pub const DEFAULT: Self = Self {
        threshold: 200,
        rules: [
            AxisRule::new(Axis::X, Direction::Positive, Face(0)),
            AxisRule::new(Axis::X, Direction::Negative, Face(1)),
            AxisRule::new(Axis::Y, Direction::Positive, Face(2)),
            AxisRule::new(Axis::Y, Direction::Negative, Face(3)),
            AxisRule::new(Axis::Z, Direction::Positive, Face(4)),
            AxisRule::new(Axis::Z, Direction::Negative, Face(5)),
        ],
        fallback: None,
        calibration: Calibration {
            offset: Sample::new(0, 0, 0),
        },
    };
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Classify a sample into a face candidate
pub fn classify(config: &ClassifierConfig, sample: Sample) -> Option<Face> {
    let sample = config.calibration.apply(sample);
    config
        .rules
        .iter()
        .find(|rule| rule.matches(&sample, config.threshold))
        .map(|rule| rule.face)
        .or(config.fallback)
}

/// Time-based debounce of the face candidate
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    candidate: Option<Face>,
    stable: Option<Face>,
}

impl Debouncer {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            candidate: None,
            stable: None,
        }
    }

    /// Feed the latest candidate and return the stable face.
    ///
    /// A changed candidate restarts the accumulator. An unchanged one is
    /// promoted once it has been held for the stability window.
    pub fn update(&mut self, candidate: Option<Face>, timers: &mut Timers) -> Option<Face> {
        if candidate != self.candidate {
            self.candidate = candidate;
            timers.reset(slot::DEBOUNCE);
            return self.stable;
        }

        if candidate != self.stable && timers.elapsed(slot::DEBOUNCE) >= self.window {
            #[cfg(feature = "esp32-log")]
            println!(
                "[Debouncer.update] stable face {:?} -> {:?}",
                self.stable, candidate
            );
            self.stable = candidate;
        }
        self.stable
    }

    /// Latest raw candidate
    pub const fn candidate(&self) -> Option<Face> {
        self.candidate
    }

    /// Debounced face
    pub const fn stable(&self) -> Option<Face> {
        self.stable
    }
}

/// Sample slot, classifier, staleness check and debounce in one place
#[derive(Debug, Clone)]
pub struct OrientationFilter {
    config: ClassifierConfig,
    stale_after: Option<Duration>,
    sample: Option<Sample>,
    debouncer: Debouncer,
}

impl OrientationFilter {
    pub const fn new(
        config: ClassifierConfig,
        window: Duration,
        stale_after: Option<Duration>,
    ) -> Self {
        Self {
            config,
            stale_after,
            sample: None,
            debouncer: Debouncer::new(window),
        }
    }

    /// Store a finished sample; restarts the staleness clock
    pub fn deliver(&mut self, sample: Sample, timers: &mut Timers) {
        self.sample = Some(sample);
        timers.reset(slot::SAMPLE_AGE);
    }

    /// Latest delivered sample
    pub const fn sample(&self) -> Option<Sample> {
        self.sample
    }

    /// Raw classification of the latest sample.
    ///
    /// Unknown when nothing was delivered yet or the sample is older than
    /// the staleness limit.
    pub fn candidate(&self, timers: &Timers) -> Option<Face> {
        let sample = self.sample?;
        if let Some(limit) = self.stale_after {
            if timers.elapsed(slot::SAMPLE_AGE) >= limit {
                return None;
            }
        }
        classify(&self.config, sample)
    }

    /// Re-evaluate the candidate and debounce it.
    ///
    /// Must run every loop iteration since stability depends on time.
    pub fn update(&mut self, timers: &mut Timers) -> Option<Face> {
        let candidate = self.candidate(timers);
        self.debouncer.update(candidate, timers)
    }

    /// Debounced face
    pub const fn stable(&self) -> Option<Face> {
        self.debouncer.stable()
    }

    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Replace the calibration offsets
    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.config.calibration = calibration;
    }
}
