// Serial parameters, settle delays, and physical limits
use std::time::Duration;

// Open Interface serial settings (Create 2 / Roomba 500+)
pub const BAUD_RATE: u32 = 115_200;

// Worst-case sensor response latency on the 500 series is well under
// 100ms; 500ms leaves margin for firmware that is busy cleaning.
pub const READ_TIMEOUT: Duration = Duration::from_millis(500);

// The firmware needs time to wake up after START before it accepts commands
pub const START_SETTLE: Duration = Duration::from_millis(500);

// Settle time after a SAFE/FULL transition
pub const MODE_SETTLE: Duration = Duration::from_millis(100);

// Drive limits from the Open Interface documentation
pub const MAX_VELOCITY_MM_S: i32 = 500;
pub const MAX_RADIUS_MM: i32 = 32_767;
pub const STRAIGHT_RADIUS_MM: i32 = 32_767;

// Distance between the drive wheels, used for spin-in-place velocity
pub const WHEEL_SPAN_MM: f64 = 258.0;

// Teleop speed limits
pub const MAX_FORWARD_CM_S: f64 = 50.0;
pub const MAX_ROTATION_DEG_S: f64 = 200.0;
pub const SPEED_INC_PERCENT: f64 = 10.0;
