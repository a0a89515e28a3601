//! Command vocabulary and reply texts used by the motion controller.
//!
//! The engine itself does not interpret these tokens; they are what the
//! device firmware registers and what the web UI sends.

// Motion commands
pub const MOVE: &str = "G0";
pub const MOVE_CCW: &str = "G1";
pub const CONTINUOUS: &str = "G2";
pub const CONTINUOUS_CCW: &str = "G3";
pub const BRAKE: &str = "G4";
pub const HOME: &str = "G5";

// Miscellaneous commands
pub const STOP: &str = "M0"; // Stop everything
pub const SET_SPEED: &str = "M1";
pub const SET_ACCEL: &str = "M2";
pub const SET_UNIT_ANGLE: &str = "M3";
pub const SET_UNIT_STEP: &str = "M4";
pub const SET_BRAKE_FREE: &str = "M5";
pub const SET_BRAKE_COOL: &str = "M6";
pub const SET_BRAKE_HARD: &str = "M7";
pub const CLOSED_LOOP_ENABLE: &str = "M8";
pub const CLOSED_LOOP_DISABLE: &str = "M9";
pub const RECORD_START: &str = "M10";
pub const RECORD_STOP: &str = "M11";
pub const RECORD_ADD: &str = "M12";
pub const RECORD_PLAY: &str = "M13";
pub const RECORD_PAUSE: &str = "M14";
pub const REQUEST_DATA: &str = "M15";

/// All motion commands, `G0` to `G5`.
pub const MOTION_COMMANDS: [&str; 6] = [MOVE, MOVE_CCW, CONTINUOUS, CONTINUOUS_CCW, BRAKE, HOME];

/// All miscellaneous commands, `M0` to `M15`.
pub const MISC_COMMANDS: [&str; 16] = [
    STOP,
    SET_SPEED,
    SET_ACCEL,
    SET_UNIT_ANGLE,
    SET_UNIT_STEP,
    SET_BRAKE_FREE,
    SET_BRAKE_COOL,
    SET_BRAKE_HARD,
    CLOSED_LOOP_ENABLE,
    CLOSED_LOOP_DISABLE,
    RECORD_START,
    RECORD_STOP,
    RECORD_ADD,
    RECORD_PLAY,
    RECORD_PAUSE,
    REQUEST_DATA,
];

/// Default acknowledgement sent after a command is dispatched.
pub const DEFAULT_VALID_REPLY: &str = "OK";

/// Default prefix of error replies.
pub const DEFAULT_ERROR_REPLY: &str = "ERROR";

/// Rejection text used by the device firmware.
pub const INVALID_REPLY: &str = "NAY";

/// Serial baud rate of the device link.
pub const BAUD_RATE: u32 = 115_200;
