//! Device state and the handlers for the G/M command vocabulary.
//!
//! Motion itself is driven elsewhere; the handlers only record the requested
//! state so the motor task can pick it up.
//!
//! # Commands
//!
//! | Token   | Parameter | Effect |
//! |---------|-----------|--------|
//! | G0 / G1 | `A` angle | Relative move CW / CCW |
//! | G2 / G3 | `A` speed | Continuous rotation CW / CCW |
//! | G4      |           | Brake |
//! | G5      |           | Home (position := 0) |
//! | M0      |           | Stop everything |
//! | M1 / M2 | `A` value | Set speed / acceleration |
//! | M3 / M4 |           | Angle / step units |
//! | M5..M7  |           | Brake mode free / cool / hard |
//! | M8 / M9 |           | Closed loop on / off |
//! | M10..M14|           | Recording start / stop / add / play / pause |
//! | M15     |           | Request a `TLM` telemetry line |

use core::fmt::Write;

use defmt::{info, warn, Format};
use gcode_core::{Clock, CommandHandler, Engine, RegisterError, Request, Transport};
use gcode_proto::vocabulary::*;
use gcode_proto::{Line, ParamError};

/// Parameter carrying the angle or speed of a command.
const ARG: &str = "A";

/// Brake mode applied when the motor is idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Format)]
pub enum Brake {
    #[default]
    Free,
    Cool,
    Hard,
}

/// Unit of move distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Format)]
pub enum Unit {
    #[default]
    Angle,
    Step,
}

/// Requested device state, updated by the command handlers.
#[derive(Debug, Clone, Default, Format)]
pub struct Device {
    /// Target position.
    pub position: f32,
    /// Sum of all requested move distances.
    pub travelled: f32,
    /// Continuous rotation speed; negative is counter-clockwise.
    pub velocity: f32,
    pub speed: f32,
    pub acceleration: f32,
    pub unit: Unit,
    pub brake: Brake,
    pub closed_loop: bool,
    pub recording: bool,
    pub playing: bool,
    /// Positions added to the current recording.
    pub recorded: u16,
    /// Set by `M15`; the main loop answers with [`Device::telemetry`].
    pub report_requested: bool,
}

impl Device {
    /// Telemetry reply, e.g. `TLM P90 T450 S0`.
    pub fn telemetry(&self) -> Result<Line, core::fmt::Error> {
        let mut line = Line::new();
        write!(
            line,
            "TLM P{} T{} S{}",
            self.position as i32, self.travelled as i32, self.velocity as i32
        )?;
        Ok(line)
    }

    fn stop(&mut self) {
        self.velocity = 0.0;
        self.playing = false;
        self.recording = false;
    }
}

fn argument(req: &Request<'_>) -> Option<f32> {
    match req.value(ARG) {
        Ok(value) => Some(value),
        Err(ParamError::NotFound) => {
            warn!("{}: missing {} parameter", req.command(), ARG);
            None
        }
        Err(e) => {
            warn!("{}: bad {} parameter: {}", req.command(), ARG, e);
            None
        }
    }
}

/// G0..G5.
struct Motion;

impl CommandHandler<Device> for Motion {
    fn handle(&self, device: &mut Device, req: &Request<'_>) {
        match req.command() {
            Some(MOVE) | Some(MOVE_CCW) => {
                if let Some(angle) = argument(req) {
                    let delta = if req.command() == Some(MOVE) { angle } else { -angle };
                    device.velocity = 0.0;
                    device.position += delta;
                    device.travelled += angle.abs();
                    info!("move to {}", device.position);
                }
            }
            Some(CONTINUOUS) | Some(CONTINUOUS_CCW) => {
                if let Some(speed) = argument(req) {
                    device.velocity = if req.command() == Some(CONTINUOUS) {
                        speed
                    } else {
                        -speed
                    };
                    info!("continuous at {}", device.velocity);
                }
            }
            Some(BRAKE) => {
                device.velocity = 0.0;
                info!("brake ({})", device.brake);
            }
            Some(HOME) => {
                device.velocity = 0.0;
                device.position = 0.0;
                info!("home");
            }
            other => warn!("not a motion command: {}", other),
        }
    }
}

/// M0.
struct Stop;

impl CommandHandler<Device> for Stop {
    fn handle(&self, device: &mut Device, _req: &Request<'_>) {
        device.stop();
        info!("stop");
    }
}

/// M1..M9.
struct Settings;

impl CommandHandler<Device> for Settings {
    fn handle(&self, device: &mut Device, req: &Request<'_>) {
        match req.command() {
            Some(SET_SPEED) => {
                if let Some(speed) = argument(req) {
                    device.speed = speed;
                }
            }
            Some(SET_ACCEL) => {
                if let Some(acceleration) = argument(req) {
                    device.acceleration = acceleration;
                }
            }
            Some(SET_UNIT_ANGLE) => device.unit = Unit::Angle,
            Some(SET_UNIT_STEP) => device.unit = Unit::Step,
            Some(SET_BRAKE_FREE) => device.brake = Brake::Free,
            Some(SET_BRAKE_COOL) => device.brake = Brake::Cool,
            Some(SET_BRAKE_HARD) => device.brake = Brake::Hard,
            Some(CLOSED_LOOP_ENABLE) => device.closed_loop = true,
            Some(CLOSED_LOOP_DISABLE) => device.closed_loop = false,
            other => warn!("not a settings command: {}", other),
        }
        info!("settings: {}", device);
    }
}

/// M10..M14.
struct Recording;

impl CommandHandler<Device> for Recording {
    fn handle(&self, device: &mut Device, req: &Request<'_>) {
        match req.command() {
            Some(RECORD_START) => {
                device.recording = true;
                device.playing = false;
                device.recorded = 0;
            }
            Some(RECORD_STOP) => device.recording = false,
            Some(RECORD_ADD) if device.recording => {
                device.recorded = device.recorded.saturating_add(1);
            }
            Some(RECORD_ADD) => warn!("not recording, position not added"),
            Some(RECORD_PLAY) => device.playing = device.recorded > 0,
            Some(RECORD_PAUSE) => device.playing = false,
            other => warn!("not a recording command: {}", other),
        }
        info!(
            "recording={} playing={} positions={}",
            device.recording, device.playing, device.recorded
        );
    }
}

/// M15.
struct RequestData;

impl CommandHandler<Device> for RequestData {
    fn handle(&self, device: &mut Device, _req: &Request<'_>) {
        device.report_requested = true;
    }
}

/// Anything not in the vocabulary.
struct Unknown;

impl CommandHandler<Device> for Unknown {
    fn handle(&self, _device: &mut Device, req: &Request<'_>) {
        warn!("unknown command: {}", req.packet());
    }
}

static MOTION: Motion = Motion;
static STOP_HANDLER: Stop = Stop;
static SETTINGS: Settings = Settings;
static RECORDING: Recording = Recording;
static REQUEST_DATA_HANDLER: RequestData = RequestData;
static UNKNOWN: Unknown = Unknown;

/// Register the handlers for the whole G/M vocabulary.
pub fn register_vocabulary<T, K, const N: usize>(
    engine: &mut Engine<'static, T, K, Device, N>,
) -> Result<(), RegisterError>
where
    T: Transport,
    K: Clock,
{
    for token in MOTION_COMMANDS {
        engine.register(token, &MOTION)?;
    }

    for token in MISC_COMMANDS {
        match token {
            STOP => engine.register(token, &STOP_HANDLER)?,
            RECORD_START | RECORD_STOP | RECORD_ADD | RECORD_PLAY | RECORD_PAUSE => {
                engine.register(token, &RECORDING)?
            }
            REQUEST_DATA => engine.register(token, &REQUEST_DATA_HANDLER)?,
            _ => engine.register(token, &SETTINGS)?,
        }
    }

    engine.set_default(&UNKNOWN);
    Ok(())
}
