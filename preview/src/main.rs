//! Desktop simulator for the tilt-dice core
//!
//! Drives the core through the same entry points the firmware uses: a tick
//! handler, a sample-completion handler and the main loop. The accelerometer
//! is replaced by face buttons and axis sliders.

use std::time::Instant as StdInstant;

use eframe::egui::{self};
use tilt_dice::{
    CHANNELS, Die, DieConfig, Face, MAX_LEVEL, OutputDriver, PowerMode, Sample, SensorDriver,
    SharedDie,
};

/// Sample queue size between the simulated interrupt and the main loop
const SAMPLE_QUEUE_SIZE: usize = 4;

/// Die shared between the simulated interrupts and the main loop
static DIE: SharedDie<SAMPLE_QUEUE_SIZE> = SharedDie::new();

/// One g in raw sensor units
const ONE_G: i16 = 255;

/// Radius of each LED circle in pixels
const LED_RADIUS: f32 = 22.0;

/// Time between faces while the simulated tumble runs
const TUMBLE_STEP_MS: u64 = 100;

/// Faces shown during a simulated tumble, in order
const TUMBLE: [u8; 8] = [0, 2, 1, 3, 5, 0, 4, 2];

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([640.0, 420.0])
            .with_title("Tilt Dice Simulator"),
        ..Default::default()
    };

    eframe::run_native(
        "tilt-dice-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

/// Counts how long each channel was on during one repaint
#[derive(Default)]
struct DutyOutput {
    on: [u32; CHANNELS],
    ticks: u32,
}

impl OutputDriver for DutyOutput {
    fn set(&mut self, channel: usize, on: bool) {
        self.on[channel] += u32::from(on);
        if channel == CHANNELS - 1 {
            self.ticks += 1;
        }
    }
}

impl DutyOutput {
    #[allow(clippy::cast_precision_loss)]
    fn duty(&self, channel: usize) -> f32 {
        if self.ticks == 0 {
            0.0
        } else {
            self.on[channel] as f32 / self.ticks as f32
        }
    }
}

/// Completes every requested conversion on the next main-loop pass
#[derive(Default)]
struct SimulatedSensor {
    pending: bool,
}

impl SensorDriver for SimulatedSensor {
    fn start_sample(&mut self) {
        self.pending = true;
    }
}

struct PreviewApp {
    sensor: SimulatedSensor,
    /// Accelerometer reading fed to the core
    sample: Sample,
    /// Synthetic time in microseconds not yet consumed by ticks
    pending_us: u64,
    /// Synthetic time in milliseconds
    t_ms: u64,
    /// Wall-clock reference for delta time
    last_frame: StdInstant,
    /// Whether the simulation is running
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
    /// Start of the running tumble, in synthetic milliseconds
    tumble_started: Option<u64>,
    face_test: bool,
    /// Last duty cycle per channel
    duty: [f32; CHANNELS],
    /// Power mode changes reported by the main loop
    mode_changes: usize,
}

impl PreviewApp {
    fn new() -> Self {
        DIE.install(Die::new(DieConfig::DEFAULT));
        Self {
            sensor: SimulatedSensor::default(),
            sample: face_sample(Face::ALL[4]),
            pending_us: 0,
            t_ms: 0,
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 1.0,
            tumble_started: None,
            face_test: false,
            duty: [0.0; CHANNELS],
            mode_changes: 0,
        }
    }

    /// Replace the core with a fresh one
    fn restart(&mut self) {
        let config = DieConfig {
            face_test: self.face_test,
            ..DieConfig::DEFAULT
        };
        DIE.install(Die::new(config));
        self.pending_us = 0;
        self.t_ms = 0;
        self.tumble_started = None;
        self.mode_changes = 0;
        self.last_frame = StdInstant::now();
    }

    /// Update synthetic time based on wall clock and time scale
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn update_time(&mut self) -> u64 {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        if !self.playing {
            return 0;
        }

        let delta_us = delta.as_secs_f64() * 1_000_000.0 * f64::from(self.time_scale);
        if delta_us.is_finite() {
            // At most a quarter second per repaint
            return delta_us.clamp(0.0, 250_000.0) as u64;
        }
        0
    }

    /// Feed the simulated tumble, if one is running
    fn update_tumble(&mut self) {
        let Some(started) = self.tumble_started else {
            return;
        };
        let step = (self.t_ms - started) / TUMBLE_STEP_MS;
        match usize::try_from(step).ok().and_then(|step| TUMBLE.get(step)) {
            Some(index) => {
                if let Some(face) = Face::new(*index) {
                    self.sample = face_sample(face);
                }
            }
            None => {
                // Land on a face derived from the clock
                let landed = u8::try_from(self.t_ms % 6).ok().and_then(Face::new);
                if let Some(face) = landed {
                    self.sample = face_sample(face);
                }
                self.tumble_started = None;
            }
        }
    }

    /// Run as many ticks as the elapsed synthetic time allows
    fn simulate(&mut self, delta_us: u64) -> DutyOutput {
        let mut output = DutyOutput::default();
        self.pending_us += delta_us;
        loop {
            let mode = DIE.with(|die| die.mode()).unwrap_or(PowerMode::LowPower);
            let period_us = mode.tick_period().as_micros();
            if self.pending_us < period_us {
                break;
            }
            self.pending_us -= period_us;
            self.t_ms += period_us / 1000;
            self.update_tumble();

            DIE.on_tick(&mut output, &mut self.sensor);
            if self.sensor.pending {
                self.sensor.pending = false;
                DIE.on_sample(self.sample);
            }
            if DIE.run().is_some() {
                self.mode_changes += 1;
            }
        }
        output
    }
}

/// Reading that the default classifier maps to `face`
fn face_sample(face: Face) -> Sample {
    match face.index() {
        0 => Sample::new(ONE_G, 0, 0),
        1 => Sample::new(-ONE_G, 0, 0),
        2 => Sample::new(0, ONE_G, 0),
        3 => Sample::new(0, -ONE_G, 0),
        4 => Sample::new(0, 0, ONE_G),
        _ => Sample::new(0, 0, -ONE_G),
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let delta_us = self.update_time();
        let output = self.simulate(delta_us);
        if output.ticks > 0 {
            for (channel, duty) in self.duty.iter_mut().enumerate() {
                *duty = output.duty(channel);
            }
        }

        ctx.request_repaint();

        let status = DIE.with(|die| (die.state(), die.mode(), die.face(), *die.levels()));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                // <PlaybackControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        if ui.button("⏮ Restart").clicked() {
                            self.restart();
                        }
                        if ui
                            .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                            .clicked()
                        {
                            self.playing = !self.playing;
                        }
                    });

                    ui.add_space(4.0);

                    let secs = self.t_ms / 1000;
                    let ms = self.t_ms % 1000;
                    ui.label(format!("Time: {secs}.{ms:03}s"));

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Speed:");
                        ui.add(egui::Slider::new(&mut self.time_scale, 0.1..=5.0).logarithmic(true));
                    });

                    ui.add_space(4.0);

                    if ui.checkbox(&mut self.face_test, "Face test").changed() {
                        self.restart();
                    }
                });
                // </PlaybackControls>
                ui.add_space(16.0);
                // <Status>
                ui.vertical(|ui| match status {
                    Some((state, mode, face, levels)) => {
                        ui.label(format!("State: {state:?}"));
                        ui.label(format!(
                            "Mode: {mode:?} ({} counts @ 1 MHz)",
                            mode.timer_divider(1_000_000)
                        ));
                        ui.label(match face {
                            Some(face) => format!("Face: {}", face.index()),
                            None => "Face: unknown".to_owned(),
                        });
                        ui.label(format!("Levels: {levels:?}"));
                        ui.label(format!("Mode changes: {}", self.mode_changes));
                    }
                    None => {
                        ui.label("No die installed");
                    }
                });
                // </Status>
            });

            ui.add_space(16.0);

            // <SensorControls>
            ui.horizontal(|ui| {
                ui.label("Face up:");
                for face in Face::ALL {
                    if ui.button(format!("{}", face.index())).clicked() {
                        self.tumble_started = None;
                        self.sample = face_sample(face);
                    }
                }
                ui.add_space(8.0);
                if ui.button("🎲 Roll").clicked() {
                    self.tumble_started = Some(self.t_ms);
                }
                if ui.button("Calibrate").clicked() {
                    DIE.with(|die| die.calibrate(ONE_G));
                }
            });

            ui.add_space(4.0);

            ui.horizontal(|ui| {
                for (label, value) in [
                    ("X", &mut self.sample.x),
                    ("Y", &mut self.sample.y),
                    ("Z", &mut self.sample.z),
                ] {
                    ui.label(label);
                    ui.add(egui::Slider::new(value, -2 * ONE_G..=2 * ONE_G));
                }
            });
            // </SensorControls>

            ui.add_space(16.0);

            // === LED Display ===
            let pitch = LED_RADIUS * 2.0 + 12.0;
            #[allow(clippy::cast_precision_loss)]
            let width = CHANNELS as f32 * pitch;
            let (response, painter) =
                ui.allocate_painter(egui::vec2(width, pitch * 1.5), egui::Sense::hover());
            let origin = response.rect.min;

            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss
            )]
            for (channel, duty) in self.duty.iter().enumerate() {
                let center = egui::pos2(
                    origin.x + channel as f32 * pitch + pitch / 2.0,
                    origin.y + pitch / 2.0,
                );
                let glow = (duty.clamp(0.0, 1.0) * 255.0) as u8;
                painter.circle_filled(center, LED_RADIUS, egui::Color32::from_rgb(glow, glow / 4, 0));
                painter.circle_stroke(
                    center,
                    LED_RADIUS,
                    egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
                );
                let level = status.map_or(0, |(_, _, _, levels)| levels[channel]);
                painter.text(
                    egui::pos2(center.x, center.y + LED_RADIUS + 10.0),
                    egui::Align2::CENTER_CENTER,
                    format!("{channel}: {level}/{MAX_LEVEL}"),
                    egui::FontId::monospace(11.0),
                    egui::Color32::GRAY,
                );
            }
        });
    }
}
