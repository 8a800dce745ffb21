//! Our error types for the E3631A driver.

use thiserror::Error;

use crate::limits::LimitBound;
use crate::types::{Channel, Quantity};

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for E3631A communications and limit checking.
#[derive(Error, Debug)]
pub enum Error {
    /// The serial connection could not be opened. Fatal to session construction.
    #[error("failed to open serial connection: {0}")]
    Connection(#[from] serialport::Error),
    /// An I/O error occurred while talking to the instrument.
    #[error("serial communication error: {0}")]
    Serial(#[from] std::io::Error),
    /// The instrument started a response but never sent the line terminator within the
    /// configured window. The transport is left open; the caller decides what to do.
    #[error("timed out waiting for a terminated response")]
    Timeout,
    /// A response could not be interpreted as the expected type.
    #[error("could not parse response {response:?} as {expected}")]
    Parse {
        response: String,
        expected: &'static str,
    },
    /// A requested value violates the currently active limit bound. Nothing was sent.
    #[error("{quantity} {value} is outside the active {channel} bound {bound}")]
    OutOfRange {
        channel: Channel,
        quantity: Quantity,
        value: f64,
        bound: LimitBound,
    },
    /// The instrument read back a different value than the one just commanded. Possibly
    /// another session or the front panel changed the output underneath us.
    #[error("read-back mismatch on {channel} {quantity}: wrote {expected}, instrument reports {observed}")]
    Reconciliation {
        channel: Channel,
        quantity: Quantity,
        expected: f64,
        observed: f64,
    },
    /// A limit bound was assigned with `min > max`.
    #[error("limit bound has min {min} greater than max {max}")]
    InvalidBound { min: f64, max: f64 },
}
