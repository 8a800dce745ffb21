//! The SCPI vocabulary of the E3631A: command constants, command builders and response
//! parsers.
//!
//! Commands use the mixed-case long form from the programming manual (`APPLy`,
//! `SYSTem:ERRor?`). The instrument accepts either form; keeping the long form makes
//! logged traffic easy to match against the manual.

use crate::error::{Error, Result};
use crate::types::Channel;

pub const IDENTIFY: &str = "*IDN?";
pub const CLEAR_STATUS: &str = "*CLS";
pub const RESET: &str = "*RST";
pub const SYSTEM_ERROR: &str = "SYSTem:ERRor?";
pub const SYSTEM_VERSION: &str = "SYSTem:VERSion?";
pub const REMOTE_MODE: &str = "SYSTem:REMote";
pub const LOCAL_MODE: &str = "SYSTem:LOCal";
pub const BEEP: &str = "SYSTem:BEEPer:IMMediate";
pub const SELECTED_OUTPUT: &str = "INSTrument:SELect?";

/// Number of decimal digits the supply resolves internally. Values are rounded to this
/// resolution before being formatted onto the wire.
pub const SUPPLY_RESOLVED_DIGITS: i32 = 4;

/// Round a value to the supply's internal resolution.
pub fn round_to_resolution(value: f64) -> f64 {
    let scale = 10f64.powi(SUPPLY_RESOLVED_DIGITS);
    (value * scale).round() / scale
}

/// Build an `APPLy` command selecting `channel` and programming both its voltage and
/// current limit in one exchange.
pub fn apply(channel: Channel, volts: f64, amps: f64) -> String {
    format!("APPLy {channel},{volts:.6},{amps:.6}")
}

/// Build the matching `APPLy?` query, which reports the programmed voltage and current
/// of `channel` as a comma-separated pair.
pub fn apply_query(channel: Channel) -> String {
    format!("APPLy? {channel}")
}

/// Parse an `APPLy?` reply into `(volts, amps)`.
///
/// The instrument quotes the fields (`"6.000000","1.000000"`); the quotes are optional
/// here so hand-typed test fixtures stay readable.
pub fn parse_apply_reply(reply: &str) -> Result<(f64, f64)> {
    let malformed = || Error::Parse {
        response: reply.to_string(),
        expected: "voltage,current pair",
    };
    let (volts, amps) = reply.split_once(',').ok_or_else(malformed)?;
    let volts = parse_field(volts).ok_or_else(malformed)?;
    let amps = parse_field(amps).ok_or_else(malformed)?;
    Ok((volts, amps))
}

/// Parse a `SYSTem:ERRor?` reply into `(code, message)`, e.g. `-113,"Undefined header"`.
pub fn parse_error_reply(reply: &str) -> Result<(i32, String)> {
    let malformed = || Error::Parse {
        response: reply.to_string(),
        expected: "error code,message pair",
    };
    let (code, message) = reply.split_once(',').ok_or_else(malformed)?;
    let code: i32 = code.trim().parse().map_err(|_| malformed())?;
    let message = message.trim().trim_matches('"').to_string();
    Ok((code, message))
}

fn parse_field(field: &str) -> Option<f64> {
    field.trim().trim_matches('"').parse().ok()
}
