// Serial driver for iRobot Create / Roomba robots over the Open Interface
//
// The `oi` module is the protocol core: codec, transport, mode machine,
// command encoder, sensor decoder, and pose estimator. The rest is glue:
// port discovery, a terminal teleop, and a demo melody.

pub mod config;
pub mod oi;
pub mod port;
pub mod songs;
pub mod teleop;

pub use oi::{
    AngleUnit, DistanceUnit, Mode, OiError, Result, Roomba, Sensor, SensorFrame, SensorValue,
    TurnDir,
};
