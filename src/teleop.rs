// Terminal teleop: drive the robot from a keyboard over SSH
//
// Raw-mode key handling with a 200ms poll so sensor reads keep flowing
// between keystrokes. Movement keys toggle: pressing w while driving
// forward stops, pressing it while stopped drives forward.

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::thread::sleep;
use std::time::Duration;

use crate::config::{MAX_FORWARD_CM_S, MAX_ROTATION_DEG_S, SPEED_INC_PERCENT};
use crate::oi::{Mode, Result, Roomba, Sensor, SensorValue, Transport};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

const SENSORS_TO_POLL: [Sensor; 11] = [
    Sensor::WallSignal,
    Sensor::WallSeen,
    Sensor::LeftBump,
    Sensor::RightBump,
    Sensor::EncoderLeft,
    Sensor::EncoderRight,
    Sensor::CliffLeftSignal,
    Sensor::CliffFrontLeftSignal,
    Sensor::CliffFrontRightSignal,
    Sensor::CliffRightSignal,
    Sensor::DirtDetect,
];

fn sensor_name(sensor: Sensor) -> &'static str {
    match sensor {
        Sensor::WallSignal => "Wall Signal",
        Sensor::WallSeen => "Wall IR",
        Sensor::LeftBump => "Left Bump",
        Sensor::RightBump => "Right Bump",
        Sensor::EncoderLeft => "Encoder L",
        Sensor::EncoderRight => "Encoder R",
        Sensor::CliffLeftSignal => "Cliff L",
        Sensor::CliffFrontLeftSignal => "Cliff FL",
        Sensor::CliffFrontRightSignal => "Cliff FR",
        Sensor::CliffRightSignal => "Cliff R",
        Sensor::DirtDetect => "Dirt",
        _ => "?",
    }
}

fn print_help() {
    let lines = [
        "--- Roomba teleop ---",
        "  w/s   forward / backward (toggle, press again to stop)",
        "  a/d   rotate left / right (toggle, press again to stop)",
        "  x     stop all movement",
        "  +/-   increase / decrease speed",
        "  m     toggle main brush",
        "  v     toggle vacuum",
        "  o     toggle side brush",
        "  space reset pose",
        "  q     quit",
    ];
    for line in lines {
        print!("{line}\r\n");
    }
    let _ = io::stdout().flush();
}

/// Open the robot in SAFE mode and run the keyboard loop until `q`.
pub fn run(port: &str) -> Result<()> {
    let mut robot = Roomba::open(port, Mode::Safe)?;
    robot.reset_pose();

    print_help();
    enable_raw_mode()?;
    let result = control_loop(&mut robot);
    disable_raw_mode()?;
    robot.close();
    println!("Disconnected.");
    result
}

fn control_loop<L: Transport>(robot: &mut Roomba<L>) -> Result<()> {
    let mut fwd_speed = MAX_FORWARD_CM_S / 2.0;
    let mut rot_speed = MAX_ROTATION_DEG_S / 2.0;
    let mut robot_dir: i32 = 0;
    let mut robot_rot: i32 = 0;
    let mut side_brush = false;
    let mut main_brush = false;
    let mut vacuum = false;
    let mut prev_senses: HashMap<Sensor, SensorValue> = HashMap::new();

    print!("Speed: fwd={fwd_speed:.0} rot={rot_speed:.0}\r\n");
    let _ = io::stdout().flush();

    loop {
        if event::poll(POLL_INTERVAL)? {
            let Event::Key(KeyEvent { code, kind, .. }) = event::read()? else {
                continue;
            };
            if kind != KeyEventKind::Press && kind != KeyEventKind::Repeat {
                continue;
            }

            let mut update_robot = true;
            match code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('w') => robot_dir = if robot_dir == 1 { 0 } else { 1 },
                KeyCode::Char('s') => robot_dir = if robot_dir == -1 { 0 } else { -1 },
                KeyCode::Char('a') => robot_rot = if robot_rot == 1 { 0 } else { 1 },
                KeyCode::Char('d') => robot_rot = if robot_rot == -1 { 0 } else { -1 },
                KeyCode::Char('x') => {
                    robot_dir = 0;
                    robot_rot = 0;
                }
                KeyCode::Char('+') | KeyCode::Char('=') => {
                    fwd_speed = (fwd_speed + MAX_FORWARD_CM_S * SPEED_INC_PERCENT / 100.0)
                        .min(MAX_FORWARD_CM_S);
                    rot_speed = (rot_speed + MAX_ROTATION_DEG_S * SPEED_INC_PERCENT / 100.0)
                        .min(MAX_ROTATION_DEG_S);
                    print!("Speed: fwd={fwd_speed:.0} rot={rot_speed:.0}\r\n");
                }
                KeyCode::Char('-') => {
                    fwd_speed =
                        (fwd_speed - MAX_FORWARD_CM_S * SPEED_INC_PERCENT / 100.0).max(0.0);
                    rot_speed =
                        (rot_speed - MAX_ROTATION_DEG_S * SPEED_INC_PERCENT / 100.0).max(0.0);
                    print!("Speed: fwd={fwd_speed:.0} rot={rot_speed:.0}\r\n");
                }
                KeyCode::Char('m') => main_brush = !main_brush,
                KeyCode::Char('v') => vacuum = !vacuum,
                KeyCode::Char('o') => side_brush = !side_brush,
                KeyCode::Char(' ') => {
                    robot.reset_pose();
                    print!("Pose reset\r\n");
                    update_robot = false;
                }
                _ => {
                    print_help();
                    update_robot = false;
                }
            }
            let _ = io::stdout().flush();

            if update_robot {
                robot.go(robot_dir as f64 * fwd_speed, robot_rot as f64 * rot_speed)?;
                robot.motors(side_brush, main_brush, vacuum)?;
                sleep(Duration::from_millis(100));
            }
        }

        // Poll sensors; a failed poll is transient, skip this cycle
        let senses = match robot.sensors(&SENSORS_TO_POLL) {
            Ok(frame) => frame,
            Err(_) => {
                print!("! Sensor read error\r\n");
                let _ = io::stdout().flush();
                continue;
            }
        };

        // Print only values that changed since the previous frame
        let mut changed = Vec::new();
        for id in SENSORS_TO_POLL {
            let value = senses.get(id);
            if value != prev_senses.get(&id).copied() {
                if let Some(value) = value {
                    changed.push(format!("{}={}", sensor_name(id), value));
                    prev_senses.insert(id, value);
                }
            }
        }
        if !changed.is_empty() {
            print!("{}\r\n", changed.join("  "));
            let _ = io::stdout().flush();
        }
    }

    Ok(())
}
