//! Interactive smoke test against a real E3631A on a serial port.
//!
//! Pick a port, then the demo identifies the supply, programs the P6V output and reads
//! it back. Run with `RUST_LOG=trace` to see the SCPI traffic.

use inquire::Select;
use keysight_e3631a::limits::LimitBound;
use keysight_e3631a::psu::E3631aPsu;
use keysight_e3631a::transport::SerialSettings;
use keysight_e3631a::types::{Channel, Quantity};

const DEMO_VOLTAGE: f64 = 3.3;
const DEMO_CURRENT_LIMIT: f64 = 0.1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let ports = serialport::available_ports()?;
    let names: Vec<String> = ports.into_iter().map(|p| p.port_name).collect();
    if names.is_empty() {
        eprintln!("No serial ports found.");
        return Ok(());
    }
    let port = Select::new("Select the port the E3631A is attached to:", names).prompt()?;

    let settings = SerialSettings::new(port);
    let mut psu = E3631aPsu::open(&settings, true)?;
    println!("Connected: {}", psu.identify()?);

    // Clamp this session to a cautious bound before programming anything.
    psu.set_instance_limit(
        Channel::P6V,
        Quantity::Voltage,
        LimitBound::new(0.0, 5.0),
    )?;

    psu.set_current(Channel::P6V, DEMO_CURRENT_LIMIT)?;
    psu.set_voltage(Channel::P6V, DEMO_VOLTAGE)?;
    println!(
        "P6V programmed to {:.4} V / {:.4} A (read back from the instrument)",
        psu.get_voltage(Channel::P6V)?,
        psu.get_current(Channel::P6V)?
    );

    let (code, message) = psu.system_error()?;
    println!("Instrument error queue: {code},\"{message}\"");

    psu.local_mode()?;
    Ok(())
}
