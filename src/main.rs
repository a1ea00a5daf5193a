use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use roomba_oi::oi::{Mode, Result, Roomba};
use roomba_oi::{port, songs, teleop};

#[derive(Parser)]
#[command(name = "roomba-oi", about = "Drive a Roomba over its serial Open Interface")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive the robot from the keyboard
    Teleop {
        /// Serial port path (auto-detected when omitted)
        #[arg(long)]
        port: Option<String>,
    },
    /// Play the Star Wars theme on the robot's beeper
    Song {
        /// Serial port path (auto-detected when omitted)
        #[arg(long)]
        port: Option<String>,
    },
    /// List candidate serial ports
    Ports,
}

fn resolve_port(port: Option<String>) -> Result<String> {
    match port {
        Some(p) => Ok(p),
        None => port::find_port(),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Teleop { port } => {
            let port = resolve_port(port)?;
            teleop::run(&port)
        }
        Command::Song { port } => {
            let port = resolve_port(port)?;
            let mut robot = Roomba::open(&port, Mode::Safe)?;
            songs::play_star_wars(&mut robot)?;
            robot.close();
            Ok(())
        }
        Command::Ports => {
            for name in port::usb_candidates()? {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
