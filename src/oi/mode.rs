// Open Interface mode tracking
//
// The robot powers on in Off. START moves it to Passive (sensors only),
// SAFE and FULL grant actuation, with SAFE keeping the firmware's cliff
// and bumper cutoffs armed. There is no command back to Off; only power
// loss leaves Passive/Safe/Full, so the driver never transitions there.

/// Authority level the robot is currently granting over the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Off,
    Passive,
    Safe,
    Full,
}

impl Mode {
    /// True when actuation commands (drive, motors, LEDs, song playback)
    /// are accepted by the firmware.
    pub fn allows_actuation(self) -> bool {
        matches!(self, Mode::Safe | Mode::Full)
    }

    /// Mode for a raw mode value, `None` when the value is unrecognized.
    pub fn from_raw(raw: u8) -> Option<Mode> {
        match raw {
            0 => Some(Mode::Off),
            1 => Some(Mode::Passive),
            2 => Some(Mode::Safe),
            3 => Some(Mode::Full),
            _ => None,
        }
    }

    /// Human-readable label for a raw mode value; unrecognized values get
    /// a defined label instead of an error.
    pub fn label(raw: u8) -> &'static str {
        match Mode::from_raw(raw) {
            Some(Mode::Off) => "OFF_MODE",
            Some(Mode::Passive) => "PASSIVE_MODE",
            Some(Mode::Safe) => "SAFE_MODE",
            Some(Mode::Full) => "FULL_MODE",
            None => "UNKNOWN_MODE",
        }
    }
}
