//! This module contains the small enums shared across the driver: the instrument's
//! outputs and quantities, and the serial-link configuration values the hardware
//! accepts.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use strum_macros::EnumIter;

use crate::error::Error;

/// The three independent outputs of the E3631A.
///
/// The set is fixed by the hardware and is not user-extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Channel {
    /// 0 to +6 V output.
    P6V,
    /// 0 to +25 V output.
    P25V,
    /// -25 to 0 V output.
    N25V,
}

impl Channel {
    /// The channel name as it appears in SCPI commands and responses.
    pub const fn as_str(self) -> &'static str {
        match self {
            Channel::P6V => "P6V",
            Channel::P25V => "P25V",
            Channel::N25V => "N25V",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Channel::P6V => 0,
            Channel::P25V => 1,
            Channel::N25V => 2,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "P6V" => Ok(Channel::P6V),
            "P25V" => Ok(Channel::P25V),
            "N25V" => Ok(Channel::N25V),
            _ => Err(Error::Parse {
                response: s.to_string(),
                expected: "channel name",
            }),
        }
    }
}

/// The two quantities that can be read or written per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Quantity {
    Voltage,
    Current,
}

impl Quantity {
    pub(crate) const fn index(self) -> usize {
        match self {
            Quantity::Voltage => 0,
            Quantity::Current => 1,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Voltage => f.write_str("voltage"),
            Quantity::Current => f.write_str("current"),
        }
    }
}

/// All baud rates supported by the E3631A's RS-232 interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u32")]
#[repr(u32)]
pub enum BaudRate {
    _300 = 300,
    _600 = 600,
    _1200 = 1200,
    _2400 = 2400,
    _4800 = 4800,
    /// This is the instrument's default baud rate.
    _9600 = 9600,
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate::_9600
    }
}

impl From<BaudRate> for u32 {
    fn from(value: BaudRate) -> Self {
        value as u32
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            300 => Ok(BaudRate::_300),
            600 => Ok(BaudRate::_600),
            1200 => Ok(BaudRate::_1200),
            2400 => Ok(BaudRate::_2400),
            4800 => Ok(BaudRate::_4800),
            9600 => Ok(BaudRate::_9600),
            other => Err(format!("unsupported baud rate: {other}")),
        }
    }
}

/// Parity modes the instrument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Word sizes the instrument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
#[repr(u8)]
pub enum DataBits {
    Seven = 7,
    Eight = 8,
}

impl Default for DataBits {
    fn default() -> Self {
        DataBits::Eight
    }
}

impl TryFrom<u8> for DataBits {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(format!("data bits must be 7 or 8, got {other}")),
        }
    }
}
