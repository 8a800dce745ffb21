//! This crate provides an interface for communicating with and controlling the Keysight
//! (formerly Agilent/HP) E3631A triple-output bench power supply.
//!
//! The E3631A exposes three independent outputs:
//! * `P6V` - 0 to +6 V, 0 to 5 A
//! * `P25V` - 0 to +25 V, 0 to 1 A
//! * `N25V` - -25 to 0 V, 0 to 1 A
//!
//! It speaks plain-text SCPI over RS-232. Every voltage or current write is validated
//! against a three-tier limit chain (per-instance override, process-wide user override,
//! factory specification) before anything reaches the wire, and is read back from the
//! instrument afterwards so that a supply reporting a different state than commanded is
//! surfaced as an error instead of silently trusted.
//!
//! The driver core ([`psu::E3631aPsu`]) is generic over any byte interface implementing
//! [`std::io::Read`] + [`std::io::Write`], so it can run against a real serial port (see
//! [`transport`]) or a scripted mock in tests.
//!
//! The serial link on the instrument side is fixed by the hardware to:
//! * Data bits: 7 or 8
//! * Stop bits: 2
//! * Parity: none, even or odd
//! * Baud rate: 300 to 9600
//!
//! The protocol is half-duplex request/response; a session borrows itself mutably for
//! every exchange, so concurrent commands on one session are unrepresentable. Multiple
//! sessions addressing the same physical port are not coordinated in any way - that is a
//! documented limitation of the instrument interface, not something this crate papers
//! over.

pub mod config;
pub mod error;
pub mod limits;
pub mod psu;
pub mod transport;
pub mod types;

mod scpi;

#[cfg(test)]
mod mock_serial;
