// Open Interface command opcodes
//
// Byte values are fixed by the vendor documentation and must go out on
// the wire exactly as listed here.

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Start = 128,
    Safe = 131,
    Full = 132,
    Drive = 137,
    Motors = 138,
    Leds = 139,
    Song = 140,
    Play = 141,
    Sensors = 142,
    QueryList = 149,
}
