// High-level driver for the robot's Open Interface
//
// Owns the serial link, tracks the mode state machine, encodes command
// frames, polls sensors, and keeps the dead-reckoning pose estimate.

use std::thread::sleep;
use tracing::{debug, info, warn};

use crate::config::{
    MAX_RADIUS_MM, MAX_VELOCITY_MM_S, MODE_SETTLE, START_SETTLE, STRAIGHT_RADIUS_MM,
    WHEEL_SPAN_MM,
};

use super::codec::bytes_from_i16;
use super::link::{SerialLink, Transport};
use super::mode::Mode;
use super::opcode::Opcode;
use super::pose::{AngleUnit, DistanceUnit, PoseEstimator};
use super::sensor::{response_len, Sensor, SensorFrame, SensorValue};
use super::{OiError, Result};

/// Spin direction used when driving with a zero turn radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnDir {
    Clockwise,
    CounterClockwise,
}

/// Maximum number of (note, duration) pairs one song slot holds.
const SONG_MAX_NOTES: usize = 16;
const SONG_MAX_SLOT: u8 = 15;

/// Driver for one robot on one serial link.
///
/// Generic over [`Transport`] so tests can substitute a mock link; real
/// callers use [`Roomba::open`].
pub struct Roomba<L: Transport = SerialLink> {
    link: L,
    mode: Mode,
    pose: PoseEstimator,
    closed: bool,
}

impl Roomba<SerialLink> {
    /// Open the serial port and bring the robot to `starting_mode`.
    ///
    /// Fails if the port cannot be opened or the mode cannot be reached.
    pub fn open(port_name: &str, starting_mode: Mode) -> Result<Self> {
        info!("Opening Open Interface on {}", port_name);
        let link = SerialLink::open(port_name)?;
        Self::with_link(link, starting_mode)
    }
}

impl<L: Transport> Roomba<L> {
    /// Build a driver over an already-open transport and reach
    /// `starting_mode`. `Mode::Off` is not reachable by command and is
    /// rejected up front.
    pub fn with_link(link: L, starting_mode: Mode) -> Result<Self> {
        if starting_mode == Mode::Off {
            return Err(OiError::InvalidStartMode);
        }
        let mut robot = Self {
            link,
            mode: Mode::Off,
            pose: PoseEstimator::new(),
            closed: false,
        };
        robot.start()?;
        match starting_mode {
            Mode::Passive | Mode::Off => {}
            Mode::Safe => robot.to_safe()?,
            Mode::Full => robot.to_full()?,
        }
        Ok(robot)
    }

    /// Mode the driver believes the robot is in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    // === Mode state machine ===

    /// Wake the Open Interface: Off -> Passive. Must precede every other
    /// command after power-on.
    pub fn start(&mut self) -> Result<()> {
        self.link.send(&[Opcode::Start as u8])?;
        sleep(START_SETTLE);
        self.mode = Mode::Passive;
        debug!("mode -> PASSIVE");
        Ok(())
    }

    /// Enter SAFE from Passive, Safe, or Full.
    pub fn to_safe(&mut self) -> Result<()> {
        if self.mode == Mode::Off {
            return Err(OiError::IllegalMode {
                op: "SAFE transition",
                mode: self.mode,
            });
        }
        self.link.send(&[Opcode::Safe as u8])?;
        sleep(MODE_SETTLE);
        self.mode = Mode::Safe;
        debug!("mode -> SAFE");
        Ok(())
    }

    /// Enter FULL (firmware safety cutoffs disabled) from Passive, Safe,
    /// or Full.
    pub fn to_full(&mut self) -> Result<()> {
        if self.mode == Mode::Off {
            return Err(OiError::IllegalMode {
                op: "FULL transition",
                mode: self.mode,
            });
        }
        self.link.send(&[Opcode::Full as u8])?;
        sleep(MODE_SETTLE);
        self.mode = Mode::Full;
        debug!("mode -> FULL");
        Ok(())
    }

    /// Reach SAFE no matter the current mode. START is harmless when the
    /// interface is already awake, so it is always sent first.
    pub fn to_safe_mode(&mut self) -> Result<()> {
        self.start()?;
        self.to_safe()
    }

    fn require_actuation(&self, op: &'static str) -> Result<()> {
        if self.mode.allows_actuation() {
            Ok(())
        } else {
            Err(OiError::IllegalMode {
                op,
                mode: self.mode,
            })
        }
    }

    // === Motion ===

    /// Low-level DRIVE frame: velocity in mm/s, turn radius in mm.
    ///
    /// Velocity is clamped to the robot's 500 mm/s limit and the radius
    /// to +/-32767. A radius of 0 means spin in place; `turn` picks the
    /// direction (the wire encodes it as radius -1 or 1).
    pub fn drive(&mut self, velocity_mm_s: i32, radius_mm: i32, turn: TurnDir) -> Result<()> {
        self.require_actuation("drive")?;
        let velocity = velocity_mm_s.clamp(-MAX_VELOCITY_MM_S, MAX_VELOCITY_MM_S) as i16;
        let mut radius = radius_mm.clamp(-MAX_RADIUS_MM, MAX_RADIUS_MM) as i16;
        if radius == 0 {
            radius = match turn {
                TurnDir::Clockwise => -1,
                TurnDir::CounterClockwise => 1,
            };
        }
        let (vel_high, vel_low) = bytes_from_i16(velocity);
        let (rad_high, rad_low) = bytes_from_i16(radius);
        debug!("drive vel={}mm/s radius={}mm", velocity, radius);
        self.link
            .send(&[Opcode::Drive as u8, vel_high, vel_low, rad_high, rad_low])
    }

    /// Set the robot's velocity: forward speed in cm/s, rotation rate in
    /// deg/s (positive = counter-clockwise). `go(0.0, 0.0)` stops.
    pub fn go(&mut self, cm_per_sec: f64, deg_per_sec: f64) -> Result<()> {
        if cm_per_sec == 0.0 {
            // Rotation only (or full stop): spin about the wheel midpoint
            let rad_per_sec = deg_per_sec.to_radians();
            let turn = if rad_per_sec >= 0.0 {
                TurnDir::CounterClockwise
            } else {
                TurnDir::Clockwise
            };
            let velocity = (rad_per_sec.abs() * WHEEL_SPAN_MM / 2.0).round() as i32;
            self.drive(velocity, 0, turn)
        } else if deg_per_sec == 0.0 {
            // Straight line
            let velocity = (10.0 * cm_per_sec).round() as i32;
            self.drive(velocity, STRAIGHT_RADIUS_MM, TurnDir::CounterClockwise)
        } else {
            // Arc whose radius follows from the two rates
            let rad_per_sec = deg_per_sec.to_radians();
            let velocity = 10.0 * cm_per_sec;
            let radius = velocity / rad_per_sec;
            self.drive(
                velocity.round() as i32,
                radius.round() as i32,
                TurnDir::CounterClockwise,
            )
        }
    }

    /// Stop all wheel motion.
    pub fn stop(&mut self) -> Result<()> {
        self.go(0.0, 0.0)
    }

    // === Actuators, LEDs, songs ===

    /// Switch the cleaning actuators on or off. One status byte:
    /// bit 0 = side brush, bit 1 = vacuum, bit 2 = main brush.
    pub fn motors(&mut self, side_brush: bool, main_brush: bool, vacuum: bool) -> Result<()> {
        self.require_actuation("motors")?;
        let status =
            (side_brush as u8) | ((vacuum as u8) << 1) | ((main_brush as u8) << 2);
        self.link.send(&[Opcode::Motors as u8, status])
    }

    /// Set the LEDs: power LED color (0 = green, 255 = red) and
    /// intensity, plus the play and advance indicator bits.
    pub fn set_leds(&mut self, color: u8, intensity: u8, play: bool, advance: bool) -> Result<()> {
        self.require_actuation("set_leds")?;
        let status = ((play as u8) << 1) | ((advance as u8) << 3);
        self.link
            .send(&[Opcode::Leds as u8, status, color, intensity])
    }

    /// Store a song in one of the 16 slots. Out-of-range slots are
    /// clamped and over-long songs truncated rather than rejected; an
    /// empty song sends nothing.
    pub fn set_song(&mut self, slot: u8, notes: &[(u8, u8)]) -> Result<()> {
        if notes.is_empty() {
            return Ok(());
        }
        let slot = slot.min(SONG_MAX_SLOT);
        let notes = if notes.len() > SONG_MAX_NOTES {
            warn!("song truncated to {} notes", SONG_MAX_NOTES);
            &notes[..SONG_MAX_NOTES]
        } else {
            notes
        };
        let mut frame = Vec::with_capacity(3 + 2 * notes.len());
        frame.push(Opcode::Song as u8);
        frame.push(slot);
        frame.push(notes.len() as u8);
        for &(note, duration) in notes {
            frame.push(note);
            frame.push(duration);
        }
        self.link.send(&frame)
    }

    /// Play a previously stored song slot.
    pub fn play_song(&mut self, slot: u8) -> Result<()> {
        self.require_actuation("play_song")?;
        self.link.send(&[Opcode::Play as u8, slot.min(SONG_MAX_SLOT)])
    }

    // === Sensors ===

    /// Poll `ids` in one request and decode the complete response.
    ///
    /// Exactly one read of the summed packet widths; a timeout or short
    /// read fails the whole poll and no partial frame is returned.
    pub fn sensors(&mut self, ids: &[Sensor]) -> Result<SensorFrame> {
        if ids.is_empty() {
            return Ok(SensorFrame::default());
        }
        if ids.len() == 1 {
            self.link
                .send(&[Opcode::Sensors as u8, ids[0].packet_id()])?;
        } else {
            let mut frame = Vec::with_capacity(2 + ids.len());
            frame.push(Opcode::QueryList as u8);
            frame.push(ids.len() as u8);
            frame.extend(ids.iter().map(|s| s.packet_id()));
            self.link.send(&frame)?;
        }
        let bytes = self.link.read_exact(response_len(ids))?;
        SensorFrame::decode(ids, &bytes)
    }

    // === Pose ===

    /// Poll the incremental distance and angle packets and fold them
    /// into the pose estimate. Returns the new (x, y, heading) in
    /// centimeters and radians.
    pub fn update_pose(&mut self) -> Result<(f64, f64, f64)> {
        let frame = self.sensors(&[Sensor::Distance, Sensor::Angle])?;
        let distance = match frame.get(Sensor::Distance) {
            Some(SensorValue::Signed(v)) => v,
            _ => 0,
        };
        let angle = match frame.get(Sensor::Angle) {
            Some(SensorValue::Signed(v)) => v,
            _ => 0,
        };
        self.pose.integrate(distance, angle);
        Ok(self.pose.get(DistanceUnit::Cm, AngleUnit::Radians))
    }

    /// Current pose estimate in the requested units.
    pub fn get_pose(&self, dist: DistanceUnit, angle: AngleUnit) -> (f64, f64, f64) {
        self.pose.get(dist, angle)
    }

    /// Overwrite the pose estimate.
    pub fn set_pose(&mut self, x: f64, y: f64, theta: f64, dist: DistanceUnit, angle: AngleUnit) {
        self.pose.set(x, y, theta, dist, angle);
    }

    /// Move the pose estimate back to the origin.
    pub fn reset_pose(&mut self) {
        self.pose.reset();
    }

    // === Teardown ===

    /// Best-effort stop of all motion and actuators, then release the
    /// serial handle. Safe to call more than once.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.mode.allows_actuation() {
            if let Err(e) = self.go(0.0, 0.0) {
                warn!("failed to stop wheels on close: {}", e);
            }
            if let Err(e) = self.motors(false, false, false) {
                warn!("failed to stop actuators on close: {}", e);
            }
        }
        self.link.close();
        info!("Open Interface closed");
    }
}

impl<L: Transport> Drop for Roomba<L> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory transport: records frames, serves queued response bytes.
    struct MockLink {
        writes: Vec<Vec<u8>>,
        reads: VecDeque<u8>,
        read_calls: usize,
        closed: bool,
    }

    impl MockLink {
        fn new() -> Self {
            Self {
                writes: Vec::new(),
                reads: VecDeque::new(),
                read_calls: 0,
                closed: false,
            }
        }
    }

    impl Transport for MockLink {
        fn send(&mut self, bytes: &[u8]) -> Result<()> {
            if self.closed {
                return Err(OiError::Closed);
            }
            self.writes.push(bytes.to_vec());
            Ok(())
        }

        fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
            self.read_calls += 1;
            if self.reads.len() < n {
                let got = self.reads.len();
                self.reads.clear();
                return Err(OiError::Timeout { expected: n, got });
            }
            Ok(self.reads.drain(..n).collect())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    fn make_robot(mode: Mode) -> Roomba<MockLink> {
        let mut robot = Roomba::with_link(MockLink::new(), mode).unwrap();
        robot.link.writes.clear();
        robot
    }

    #[test]
    fn test_construction_reaches_safe() {
        let robot = Roomba::with_link(MockLink::new(), Mode::Safe).unwrap();
        assert_eq!(robot.mode(), Mode::Safe);
        assert_eq!(robot.link.writes, vec![vec![128], vec![131]]);
    }

    #[test]
    fn test_construction_off_rejected() {
        assert!(matches!(
            Roomba::with_link(MockLink::new(), Mode::Off),
            Err(OiError::InvalidStartMode)
        ));
    }

    #[test]
    fn test_go_zero_sends_canonical_stop() {
        let mut robot = make_robot(Mode::Safe);
        robot.go(0.0, 0.0).unwrap();
        // DRIVE, velocity 0, radius 1 (zero-speed CCW spin)
        assert_eq!(robot.link.writes, vec![vec![137, 0, 0, 0, 1]]);
    }

    #[test]
    fn test_go_straight() {
        let mut robot = make_robot(Mode::Safe);
        robot.go(10.0, 0.0).unwrap();
        // 100 mm/s straight: radius 32767
        assert_eq!(robot.link.writes, vec![vec![137, 0, 100, 0x7F, 0xFF]]);
    }

    #[test]
    fn test_drive_clamps_velocity() {
        let mut robot = make_robot(Mode::Full);
        robot
            .drive(1000, STRAIGHT_RADIUS_MM, TurnDir::CounterClockwise)
            .unwrap();
        // clamped to 500 = 0x01F4
        assert_eq!(robot.link.writes, vec![vec![137, 1, 244, 0x7F, 0xFF]]);
    }

    #[test]
    fn test_drive_zero_radius_turn_dir() {
        let mut robot = make_robot(Mode::Safe);
        robot.drive(200, 0, TurnDir::Clockwise).unwrap();
        // radius -1 = 0xFFFF
        assert_eq!(robot.link.writes, vec![vec![137, 0, 200, 0xFF, 0xFF]]);
    }

    #[test]
    fn test_drive_requires_actuation_mode() {
        let mut robot = make_robot(Mode::Passive);
        let err = robot.go(10.0, 0.0).unwrap_err();
        assert!(matches!(err, OiError::IllegalMode { .. }));
        assert!(robot.link.writes.is_empty());
    }

    #[test]
    fn test_motors_all_on_and_off() {
        let mut robot = make_robot(Mode::Safe);
        robot.motors(true, true, true).unwrap();
        robot.motors(false, false, false).unwrap();
        assert_eq!(robot.link.writes, vec![vec![138, 7], vec![138, 0]]);
    }

    #[test]
    fn test_set_leds() {
        let mut robot = make_robot(Mode::Safe);
        robot.set_leds(128, 255, false, true).unwrap();
        // advance bit 3 set, play bit 1 clear
        assert_eq!(robot.link.writes, vec![vec![139, 8, 128, 255]]);
    }

    #[test]
    fn test_set_song_frame() {
        let mut robot = make_robot(Mode::Safe);
        robot.set_song(1, &[(60, 32), (64, 32)]).unwrap();
        assert_eq!(robot.link.writes, vec![vec![140, 1, 2, 60, 32, 64, 32]]);
    }

    #[test]
    fn test_set_song_empty_is_noop() {
        let mut robot = make_robot(Mode::Safe);
        robot.set_song(0, &[]).unwrap();
        assert!(robot.link.writes.is_empty());
    }

    #[test]
    fn test_set_song_clamps_slot() {
        let mut robot = make_robot(Mode::Safe);
        robot.set_song(20, &[(60, 32)]).unwrap();
        assert_eq!(robot.link.writes[0][1], 15);
    }

    #[test]
    fn test_set_song_truncates_to_sixteen_notes() {
        let mut robot = make_robot(Mode::Safe);
        let notes: Vec<(u8, u8)> = (0..20).map(|i| (60 + i as u8, 16)).collect();
        robot.set_song(0, &notes).unwrap();
        // opcode + slot + count + 16 pairs
        assert_eq!(robot.link.writes[0][2], 16);
        assert_eq!(robot.link.writes[0].len(), 3 + 32);
    }

    #[test]
    fn test_play_song() {
        let mut robot = make_robot(Mode::Safe);
        robot.play_song(3).unwrap();
        assert_eq!(robot.link.writes, vec![vec![141, 3]]);
    }

    #[test]
    fn test_sensor_poll_single_read() {
        let mut robot = make_robot(Mode::Safe);
        robot.link.reads.extend([0x00, 0x64, 0xFF, 0xF6, 0x02]);
        let ids = [Sensor::Distance, Sensor::Angle, Sensor::LeftBump];
        let frame = robot.sensors(&ids).unwrap();
        // one request frame, one read
        assert_eq!(robot.link.writes, vec![vec![149, 3, 19, 20, 7]]);
        assert_eq!(robot.link.read_calls, 1);
        assert_eq!(frame.get(Sensor::Distance), Some(SensorValue::Signed(100)));
        assert_eq!(frame.get(Sensor::Angle), Some(SensorValue::Signed(-10)));
        assert_eq!(frame.get(Sensor::LeftBump), Some(SensorValue::Bool(true)));
    }

    #[test]
    fn test_single_sensor_uses_sensors_opcode() {
        let mut robot = make_robot(Mode::Safe);
        robot.link.reads.extend([0x12, 0x34]);
        robot.sensors(&[Sensor::WallSignal]).unwrap();
        assert_eq!(robot.link.writes, vec![vec![142, 27]]);
    }

    #[test]
    fn test_short_read_fails_whole_poll() {
        let mut robot = make_robot(Mode::Safe);
        robot.link.reads.extend([0x00, 0x64, 0xFF]); // 3 of 4 bytes
        let err = robot.sensors(&[Sensor::Distance, Sensor::Angle]).unwrap_err();
        assert!(matches!(
            err,
            OiError::Timeout {
                expected: 4,
                got: 3
            }
        ));
    }

    #[test]
    fn test_update_pose_integrates_deltas() {
        let mut robot = make_robot(Mode::Safe);
        // distance 100 mm, angle 0 deg
        robot.link.reads.extend([0x00, 0x64, 0x00, 0x00]);
        let (x, y, th) = robot.update_pose().unwrap();
        assert!((x - 10.0).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
        assert!(th.abs() < 1e-9);
    }

    #[test]
    fn test_pose_roundtrip_through_driver() {
        let mut robot = make_robot(Mode::Safe);
        robot.set_pose(10.0, 20.0, 90.0, DistanceUnit::Cm, AngleUnit::Degrees);
        let (x, y, th) = robot.get_pose(DistanceUnit::Cm, AngleUnit::Degrees);
        assert!((x - 10.0).abs() < 1e-9);
        assert!((y - 20.0).abs() < 1e-9);
        assert!((th - 90.0).abs() < 1e-9);
        robot.reset_pose();
        assert_eq!(
            robot.get_pose(DistanceUnit::Cm, AngleUnit::Degrees),
            (0.0, 0.0, 0.0)
        );
    }

    #[test]
    fn test_to_safe_mode_from_passive() {
        let mut robot = make_robot(Mode::Passive);
        robot.to_safe_mode().unwrap();
        assert_eq!(robot.mode(), Mode::Safe);
        assert_eq!(robot.link.writes, vec![vec![128], vec![131]]);
    }

    #[test]
    fn test_close_stops_motion_and_is_idempotent() {
        let mut robot = make_robot(Mode::Safe);
        robot.close();
        assert_eq!(
            robot.link.writes,
            vec![vec![137, 0, 0, 0, 1], vec![138, 0]]
        );
        robot.close();
        assert_eq!(robot.link.writes.len(), 2);
        // Link is gone: later commands surface the closed transport
        assert!(matches!(
            robot.motors(true, false, false),
            Err(OiError::Closed)
        ));
    }
}
