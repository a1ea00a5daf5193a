// Star Wars main theme for the robot's beeper
//
// Notes are MIDI numbers (the Open Interface accepts 31..=127); durations
// are device ticks of 1/64 second. The theme is split into phrases of at
// most 16 notes, one per song slot.

use std::thread::sleep;
use std::time::Duration;

use crate::oi::{Result, Roomba, Transport};

// MIDI note numbers, fourth and fifth octave
pub const C4: u8 = 60;
pub const D4: u8 = 62;
pub const E4: u8 = 64;
pub const F4: u8 = 65;
pub const G4: u8 = 67;
pub const A4: u8 = 69;
pub const BB4: u8 = 70;
pub const B4: u8 = 71;
pub const C5: u8 = 72;
pub const D5: u8 = 74;
pub const E5: u8 = 76;
pub const F5: u8 = 77;
pub const G5: u8 = 79;

// Durations in 1/64-second ticks; one measure is 2.5 seconds
pub const MEASURE: u8 = 160;
pub const HALF: u8 = MEASURE / 2;
pub const Q: u8 = MEASURE / 4;
pub const E: u8 = MEASURE / 8;
pub const ED: u8 = (MEASURE as u16 * 3 / 16) as u8;
pub const S: u8 = MEASURE / 16;

/// Seconds per measure.
pub const MEASURE_TIME: f64 = MEASURE as f64 / 64.0;

/// The main theme, one phrase per song slot.
const PHRASES: [&[(u8, u8)]; 4] = [
    // pickup triplet into the fanfare
    &[(C4, E), (C4, E), (C4, E), (F4, HALF), (C5, HALF)],
    &[(BB4, E), (A4, E), (G4, E), (F5, HALF), (C5, Q)],
    &[(BB4, E), (A4, E), (G4, E), (F5, HALF), (C5, Q)],
    &[(BB4, E), (A4, E), (BB4, E), (G4, HALF), (G4, Q)],
];

fn phrase_seconds(notes: &[(u8, u8)]) -> f64 {
    let ticks: u32 = notes.iter().map(|&(_, d)| d as u32).sum();
    ticks as f64 / 64.0
}

/// Store the theme in slots 0..4 and play it through, blocking for each
/// phrase's duration so consecutive PLAY frames don't cut each other off.
pub fn play_star_wars<L: Transport>(robot: &mut Roomba<L>) -> Result<()> {
    for (slot, phrase) in PHRASES.iter().enumerate() {
        robot.set_song(slot as u8, phrase)?;
    }
    for (slot, phrase) in PHRASES.iter().enumerate() {
        robot.play_song(slot as u8)?;
        sleep(Duration::from_secs_f64(phrase_seconds(phrase) + 0.05));
    }
    Ok(())
}
