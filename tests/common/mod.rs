#![allow(dead_code)]

use tilt_dice::{CHANNELS, Die, DieConfig, Face, OutputDriver, PowerMode, Sample, SensorDriver};

/// Reading that the default classifier maps to `face`
pub fn face_sample(face: Face) -> Sample {
    match face.index() {
        0 => Sample::new(255, 0, 0),
        1 => Sample::new(-255, 0, 0),
        2 => Sample::new(0, 255, 0),
        3 => Sample::new(0, -255, 0),
        4 => Sample::new(0, 0, 255),
        _ => Sample::new(0, 0, -255),
    }
}

pub fn face(index: u8) -> Face {
    Face::new(index).unwrap()
}

#[derive(Default)]
pub struct FrameOutput {
    pub frame: [bool; CHANNELS],
    pub writes: usize,
}

impl OutputDriver for FrameOutput {
    fn set(&mut self, channel: usize, on: bool) {
        self.frame[channel] = on;
        if channel == CHANNELS - 1 {
            self.writes += 1;
        }
    }
}

#[derive(Default)]
pub struct PendingSensor {
    pub pending: bool,
    pub requests: usize,
}

impl SensorDriver for PendingSensor {
    fn start_sample(&mut self) {
        self.pending = true;
        self.requests += 1;
    }
}

/// Drives a die the way the firmware does: tick, complete the requested
/// sample, run the main loop once.
pub struct Sim {
    pub die: Die,
    pub output: FrameOutput,
    pub sensor: PendingSensor,
    pub sample: Sample,
    pub mode_changes: Vec<PowerMode>,
}

impl Sim {
    pub fn new(config: DieConfig) -> Self {
        Self {
            die: Die::new(config),
            output: FrameOutput::default(),
            sensor: PendingSensor::default(),
            sample: Sample::default(),
            mode_changes: Vec::new(),
        }
    }

    pub fn show(&mut self, face: Face) {
        self.sample = face_sample(face);
    }

    pub fn step(&mut self) {
        self.die.tick(&mut self.output, &mut self.sensor);
        if self.sensor.pending {
            self.sensor.pending = false;
            self.die.deliver_sample(self.sample);
        }
        if let Some(mode) = self.die.run() {
            self.mode_changes.push(mode);
        }
    }

    pub fn run_for(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.step();
        }
    }

    /// Step until `done` holds; returns the number of steps taken
    pub fn run_until(&mut self, max_ticks: u32, done: impl Fn(&Die) -> bool) -> Option<u32> {
        for tick in 1..=max_ticks {
            self.step();
            if done(&self.die) {
                return Some(tick);
            }
        }
        None
    }
}
