// Byte-level helpers for the Open Interface wire format
//
// Every multi-byte field in the protocol is big-endian two's complement.
// These helpers are deliberately infallible: out-of-range bit indices
// read as zero, matching how the rest of the driver treats sensor bytes.

/// Extract bit `n` (0 = least significant) of `byte`.
///
/// Returns 0 for `n` outside 0..=7 rather than panicking; callers index
/// bits straight out of sensor tables and a bad index means "not set".
pub fn bit_of_byte(n: i32, byte: u8) -> u8 {
    if (0..8).contains(&n) {
        (byte >> n) & 1
    } else {
        0
    }
}

/// Reinterpret one unsigned byte as a two's-complement signed value.
pub fn i8_from_byte(byte: u8) -> i8 {
    byte as i8
}

/// Reinterpret a big-endian (high, low) byte pair as a signed 16-bit value.
pub fn i16_from_bytes(high: u8, low: u8) -> i16 {
    i16::from_be_bytes([high, low])
}

/// Encode a signed 16-bit value as a big-endian (high, low) byte pair.
///
/// Exact inverse of [`i16_from_bytes`] over the whole i16 range.
pub fn bytes_from_i16(value: i16) -> (u8, u8) {
    let [high, low] = value.to_be_bytes();
    (high, low)
}
