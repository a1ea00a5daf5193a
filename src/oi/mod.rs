// Open Interface protocol driver
//
// Provides:
// - Byte codec for the two's-complement wire fields
// - Serial transport with exact-count reads
// - Mode state machine gating actuation commands
// - Command encoding and sensor frame decoding
// - Dead-reckoning pose estimation

pub mod codec;
mod driver;
pub mod link;
mod mode;
mod opcode;
pub mod pose;
pub mod sensor;

pub use driver::{Roomba, TurnDir};
pub use link::{SerialLink, Transport};
pub use mode::Mode;
pub use opcode::Opcode;
pub use pose::{AngleUnit, DistanceUnit, PoseEstimator};
pub use sensor::{Sensor, SensorFrame, SensorValue};

/// Error type for every driver operation.
#[derive(Debug, thiserror::Error)]
pub enum OiError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out: expected {expected} sensor bytes, got {got}")]
    Timeout { expected: usize, got: usize },

    #[error("{op} requires SAFE or FULL mode (robot is in {mode:?})")]
    IllegalMode { op: &'static str, mode: Mode },

    #[error("cannot start in OFF mode; no command enters it")]
    InvalidStartMode,

    #[error("transport already closed")]
    Closed,

    #[error("no serial device found; pass a port explicitly")]
    PortNotFound,

    #[error("multiple serial devices found, pass one explicitly: {0:?}")]
    PortAmbiguous(Vec<String>),
}

pub type Result<T> = std::result::Result<T, OiError>;
