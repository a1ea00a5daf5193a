// Serial port discovery
//
// The robot's USB serial adapter is expected to be the only USB serial
// device on the machine. Anything else is a setup problem the user has
// to resolve by passing the port explicitly, so zero and many matches
// are both fatal.

use serialport::SerialPortType;
use tracing::debug;

use crate::oi::{OiError, Result};

/// Return the robot's port path, requiring exactly one USB serial device.
pub fn find_port() -> Result<String> {
    let candidates = usb_candidates()?;
    debug!("serial candidates: {:?}", candidates);
    pick_port(candidates)
}

/// All USB serial device paths, sorted, for the `ports` subcommand.
pub fn usb_candidates() -> Result<Vec<String>> {
    let mut names: Vec<String> = serialport::available_ports()?
        .into_iter()
        .filter(|p| matches!(p.port_type, SerialPortType::UsbPort(_)))
        .map(|p| p.port_name)
        .collect();
    names.sort();
    Ok(names)
}

fn pick_port(mut candidates: Vec<String>) -> Result<String> {
    match candidates.len() {
        0 => Err(OiError::PortNotFound),
        1 => Ok(candidates.remove(0)),
        _ => Err(OiError::PortAmbiguous(candidates)),
    }
}
