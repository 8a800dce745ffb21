//! Opening the serial link to the instrument.
//!
//! The driver core is generic over any `Read + Write` byte interface; this module
//! provides the real one, a [`serialport`] port configured from [`SerialSettings`].
//! Closing is handled by ownership: dropping the port releases it, and
//! [`crate::psu::E3631aPsu::into_inner`] hands it back if the caller wants to reuse it.

use std::time::Duration;

use serialport::SerialPort;

use crate::error::Result;
use crate::types::{BaudRate, DataBits, Parity};

/// Default response timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Serial-link parameters for one instrument.
///
/// Stop bits are not configurable: the E3631A hardware always uses two.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Port identifier, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    pub baud_rate: BaudRate,
    pub parity: Parity,
    pub data_bits: DataBits,
    /// How long one exchange waits for a terminated response.
    pub timeout: Duration,
}

impl SerialSettings {
    /// Settings for `port` with the instrument's defaults: 9600 baud, no parity,
    /// 8 data bits, 15 second timeout.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: BaudRate::default(),
            parity: Parity::default(),
            data_bits: DataBits::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Open the serial port described by `settings`.
///
/// Fails with [`crate::error::Error::Connection`] if the port cannot be opened; that is
/// fatal to session construction.
pub fn open(settings: &SerialSettings) -> Result<Box<dyn SerialPort>> {
    let parity = match settings.parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    };
    let data_bits = match settings.data_bits {
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    };
    let port = serialport::new(&settings.port, settings.baud_rate.into())
        .parity(parity)
        .data_bits(data_bits)
        .stop_bits(serialport::StopBits::Two)
        .timeout(settings.timeout)
        .open()?;
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_the_instrument() {
        let settings = SerialSettings::new("/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, BaudRate::_9600);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.timeout, Duration::from_secs(15));
    }
}
