// Sensor packet table and response decoding
//
// Each sensor maps to one Open Interface packet id with a fixed response
// width (1 or 2 bytes) and a fixed signedness. A poll asks for a list of
// sensors in one QUERY LIST frame; the robot answers with the packets
// concatenated in request order and nothing else, so the expected byte
// count is known before the read starts.

use super::codec::{bit_of_byte, i8_from_byte, i16_from_bytes};
use super::{OiError, Result};
use std::collections::HashMap;
use std::fmt;

/// A sensor the robot can report.
///
/// `LeftBump` and `RightBump` are views into single bits of the
/// bumps-and-wheel-drops packet; they share its packet id on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    BumpsWheelDrops,
    WallSeen,
    CliffLeft,
    CliffFrontLeft,
    CliffFrontRight,
    CliffRight,
    VirtualWall,
    DirtDetect,
    Distance,
    Angle,
    ChargingState,
    Voltage,
    Current,
    Temperature,
    Charge,
    Capacity,
    WallSignal,
    CliffLeftSignal,
    CliffFrontLeftSignal,
    CliffFrontRightSignal,
    CliffRightSignal,
    EncoderLeft,
    EncoderRight,
    LightBumpLeft,
    LightBumpFrontLeft,
    LightBumpCenterLeft,
    LightBumpCenterRight,
    LightBumpFrontRight,
    LightBumpRight,
    LeftBump,
    RightBump,
}

/// How a packet's bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    /// One byte, nonzero means true
    Flag,
    /// One bit of the bumps-and-wheel-drops byte
    BumpBit(i32),
    /// Unsigned magnitude, 1 or 2 bytes
    Unsigned,
    /// Two's-complement signed, 1 or 2 bytes
    Signed,
}

impl Sensor {
    /// Packet id sent in the request frame.
    pub fn packet_id(self) -> u8 {
        match self {
            Sensor::BumpsWheelDrops | Sensor::LeftBump | Sensor::RightBump => 7,
            Sensor::WallSeen => 8,
            Sensor::CliffLeft => 9,
            Sensor::CliffFrontLeft => 10,
            Sensor::CliffFrontRight => 11,
            Sensor::CliffRight => 12,
            Sensor::VirtualWall => 13,
            Sensor::DirtDetect => 15,
            Sensor::Distance => 19,
            Sensor::Angle => 20,
            Sensor::ChargingState => 21,
            Sensor::Voltage => 22,
            Sensor::Current => 23,
            Sensor::Temperature => 24,
            Sensor::Charge => 25,
            Sensor::Capacity => 26,
            Sensor::WallSignal => 27,
            Sensor::CliffLeftSignal => 28,
            Sensor::CliffFrontLeftSignal => 29,
            Sensor::CliffFrontRightSignal => 30,
            Sensor::CliffRightSignal => 31,
            Sensor::EncoderLeft => 43,
            Sensor::EncoderRight => 44,
            Sensor::LightBumpLeft => 46,
            Sensor::LightBumpFrontLeft => 47,
            Sensor::LightBumpCenterLeft => 48,
            Sensor::LightBumpCenterRight => 49,
            Sensor::LightBumpFrontRight => 50,
            Sensor::LightBumpRight => 51,
        }
    }

    /// Response width in bytes for this sensor's packet.
    pub fn width(self) -> usize {
        match self {
            Sensor::BumpsWheelDrops
            | Sensor::LeftBump
            | Sensor::RightBump
            | Sensor::WallSeen
            | Sensor::CliffLeft
            | Sensor::CliffFrontLeft
            | Sensor::CliffFrontRight
            | Sensor::CliffRight
            | Sensor::VirtualWall
            | Sensor::DirtDetect
            | Sensor::ChargingState
            | Sensor::Temperature => 1,
            _ => 2,
        }
    }

    fn kind(self) -> Kind {
        match self {
            Sensor::LeftBump => Kind::BumpBit(1),
            Sensor::RightBump => Kind::BumpBit(0),
            Sensor::WallSeen
            | Sensor::CliffLeft
            | Sensor::CliffFrontLeft
            | Sensor::CliffFrontRight
            | Sensor::CliffRight
            | Sensor::VirtualWall => Kind::Flag,
            Sensor::Distance
            | Sensor::Angle
            | Sensor::Current
            | Sensor::Temperature
            | Sensor::EncoderLeft
            | Sensor::EncoderRight => Kind::Signed,
            _ => Kind::Unsigned,
        }
    }

    /// Decode this sensor's bytes (length must equal [`Sensor::width`]).
    fn decode(self, bytes: &[u8]) -> SensorValue {
        match (self.kind(), bytes) {
            (Kind::Flag, [b]) => SensorValue::Bool(*b != 0),
            (Kind::BumpBit(n), [b]) => SensorValue::Bool(bit_of_byte(n, *b) == 1),
            (Kind::Unsigned, [b]) => SensorValue::Unsigned(*b as u16),
            (Kind::Unsigned, [hi, lo]) => {
                SensorValue::Unsigned(u16::from_be_bytes([*hi, *lo]))
            }
            (Kind::Signed, [b]) => SensorValue::Signed(i8_from_byte(*b) as i16),
            (Kind::Signed, [hi, lo]) => SensorValue::Signed(i16_from_bytes(*hi, *lo)),
            _ => unreachable!("sensor width mismatch"),
        }
    }
}

/// A decoded sensor reading, typed per the sensor's physical meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorValue {
    Bool(bool),
    Unsigned(u16),
    Signed(i16),
}

impl SensorValue {
    pub fn as_i32(self) -> i32 {
        match self {
            SensorValue::Bool(b) => b as i32,
            SensorValue::Unsigned(u) => u as i32,
            SensorValue::Signed(s) => s as i32,
        }
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Bool(b) => write!(f, "{}", *b as u8),
            SensorValue::Unsigned(u) => write!(f, "{u}"),
            SensorValue::Signed(s) => write!(f, "{s}"),
        }
    }
}

/// Total response length for a request naming `ids` in order.
pub fn response_len(ids: &[Sensor]) -> usize {
    ids.iter().map(|s| s.width()).sum()
}

/// One immutable snapshot of decoded sensor values.
///
/// Built from a complete response only; a short read never produces a
/// partially populated frame.
#[derive(Debug, Clone, Default)]
pub struct SensorFrame {
    values: HashMap<Sensor, SensorValue>,
}

impl SensorFrame {
    /// Decode a full response for `ids`, consuming each sensor's declared
    /// width in request order.
    pub fn decode(ids: &[Sensor], bytes: &[u8]) -> Result<SensorFrame> {
        let expected = response_len(ids);
        if bytes.len() != expected {
            return Err(OiError::Timeout {
                expected,
                got: bytes.len(),
            });
        }
        let mut values = HashMap::with_capacity(ids.len());
        let mut offset = 0;
        for &id in ids {
            let width = id.width();
            values.insert(id, id.decode(&bytes[offset..offset + width]));
            offset += width;
        }
        Ok(SensorFrame { values })
    }

    pub fn get(&self, id: Sensor) -> Option<SensorValue> {
        self.values.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
