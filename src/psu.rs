use std::io::{self, Read, Write};
use std::str::FromStr;

use log::{trace, warn};
use serialport::SerialPort;

use crate::config::PsuConfig;
use crate::error::{Error, Result};
use crate::limits::{self, LimitBound, OverrideTable};
use crate::scpi;
use crate::transport::{self, SerialSettings};
use crate::types::{Channel, Quantity};

/// Absolute tolerance used when reconciling a read-back value against the value just
/// commanded. Values are rounded to the supply's 1e-4 resolution before transmission,
/// so this only absorbs formatting noise; any real disagreement is well above it.
pub const READBACK_TOLERANCE: f64 = 1e-6;

/// Number of confirmation beeps sent during construction when beeping is enabled.
const STARTUP_BEEPS: usize = 3;

/// One session with an E3631A, generic over any byte interface which implements
/// [`std::io::Read`] + [`std::io::Write`].
///
/// Every voltage/current write resolves the active limit bound (instance override, else
/// process-wide user override, else factory specification), refuses out-of-range values
/// before anything is transmitted, and reads the programmed value back from the
/// instrument afterwards. A read-back that disagrees with the commanded value fails with
/// [`Error::Reconciliation`] rather than being silently trusted.
///
/// Sessions are independent: two sessions on the same physical port do not see each
/// other's instance limits or cached values, and the crate does not arbitrate between
/// them.
pub struct E3631aPsu<S: Read + Write> {
    interface: S,
    overrides: OverrideTable,
    /// Last programmed value per (channel, quantity). Advisory only - the instrument is
    /// the authority - but the `APPLy` command programs voltage and current together, so
    /// a write to one quantity re-sends the cached counterpart.
    last_values: [[f64; 2]; 3],
}

impl<S: Read + Write> E3631aPsu<S> {
    /// Create a session over an already-open interface without any startup handshake.
    pub fn new(interface: S) -> Self {
        Self {
            interface,
            overrides: OverrideTable::new(),
            last_values: [[0.0; 2]; 3],
        }
    }

    /// Create a session and run the startup handshake: identify the instrument, switch
    /// it to remote mode, and optionally beep three times for confirmation.
    ///
    /// An instrument that answers neither the version nor the identification query is
    /// reported with a warning, not an error - the session stays usable, though
    /// subsequent queries are likely to fail too.
    pub fn connect(interface: S, beep: bool) -> Result<Self> {
        let mut psu = Self::new(interface);
        let version = psu.exchange(scpi::SYSTEM_VERSION)?;
        if version.is_empty() && psu.exchange(scpi::IDENTIFY)?.is_empty() {
            warn!(
                "no response to the identification query; the instrument may not be \
                 communicating and some operations may fail"
            );
        } else {
            psu.exchange(scpi::REMOTE_MODE)?;
        }
        if beep {
            for _ in 0..STARTUP_BEEPS {
                psu.beep()?;
            }
        }
        Ok(psu)
    }

    /// Consume the session and hand back the underlying interface.
    pub fn into_inner(self) -> S {
        self.interface
    }

    /// Read the programmed voltage of `channel` from the instrument.
    pub fn get_voltage(&mut self, channel: Channel) -> Result<f64> {
        Ok(self.query_pair(channel)?.0)
    }

    /// Read the programmed current limit of `channel` from the instrument.
    pub fn get_current(&mut self, channel: Channel) -> Result<f64> {
        Ok(self.query_pair(channel)?.1)
    }

    /// Program the voltage of `channel`, limit-checked and read back afterwards.
    pub fn set_voltage(&mut self, channel: Channel, volts: f64) -> Result<()> {
        self.set_value(channel, Quantity::Voltage, volts)
    }

    /// Program the current limit of `channel`, limit-checked and read back afterwards.
    pub fn set_current(&mut self, channel: Channel, amps: f64) -> Result<()> {
        self.set_value(channel, Quantity::Current, amps)
    }

    /// Send an arbitrary SCPI command verbatim and return the raw response, trimmed of
    /// its line terminator but otherwise unparsed. No limit checking is applied; what
    /// goes over the wire is the caller's responsibility.
    pub fn send_command(&mut self, command: &str) -> Result<String> {
        self.exchange(command)
    }

    /// Pop the next entry from the instrument's error queue as `(code, message)`.
    /// `(0, "No error")` means the queue is empty.
    pub fn system_error(&mut self) -> Result<(i32, String)> {
        let reply = self.exchange(scpi::SYSTEM_ERROR)?;
        scpi::parse_error_reply(&reply)
    }

    /// Clear the instrument's event registers and error queue.
    pub fn clear_status(&mut self) -> Result<()> {
        self.exchange(scpi::CLEAR_STATUS)?;
        Ok(())
    }

    /// Reset the instrument to its power-on state.
    pub fn reset(&mut self) -> Result<()> {
        self.exchange(scpi::RESET)?;
        Ok(())
    }

    /// Query the identification string.
    pub fn identify(&mut self) -> Result<String> {
        self.exchange(scpi::IDENTIFY)
    }

    /// Query the SCPI version the instrument implements.
    pub fn version(&mut self) -> Result<String> {
        self.exchange(scpi::SYSTEM_VERSION)
    }

    /// Beep once.
    pub fn beep(&mut self) -> Result<()> {
        self.exchange(scpi::BEEP)?;
        Ok(())
    }

    /// Put the instrument under remote control. The front-panel local key still wins.
    pub fn remote_mode(&mut self) -> Result<()> {
        self.exchange(scpi::REMOTE_MODE)?;
        Ok(())
    }

    /// Return the instrument to front-panel control.
    pub fn local_mode(&mut self) -> Result<()> {
        self.exchange(scpi::LOCAL_MODE)?;
        Ok(())
    }

    /// Query which output is currently selected on the front panel.
    pub fn selected_output(&mut self) -> Result<Channel> {
        let reply = self.exchange(scpi::SELECTED_OUTPUT)?;
        Channel::from_str(&reply)
    }

    /// The session's own limit for an entry: its instance override if set, else the
    /// factory value. Does not consult the process-wide user table.
    pub fn instance_limit(&self, channel: Channel, quantity: Quantity) -> LimitBound {
        self.overrides
            .get(channel, quantity)
            .unwrap_or_else(|| limits::factory_limit(channel, quantity))
    }

    /// Install an instance override for an entry. Rejects `min > max`.
    pub fn set_instance_limit(
        &mut self,
        channel: Channel,
        quantity: Quantity,
        bound: LimitBound,
    ) -> Result<()> {
        self.overrides.set(channel, quantity, bound)
    }

    /// Remove an instance override, falling back to the user/factory tiers.
    pub fn clear_instance_limit(&mut self, channel: Channel, quantity: Quantity) {
        self.overrides.clear(channel, quantity);
    }

    /// The bound the next write to this entry will be validated against, resolved
    /// through all three tiers.
    pub fn active_limit(&self, channel: Channel, quantity: Quantity) -> LimitBound {
        limits::resolve(channel, quantity, &self.overrides)
    }

    /// Last value observed or programmed for an entry. Advisory bookkeeping only; use
    /// the getters for authoritative values.
    pub fn last_known(&self, channel: Channel, quantity: Quantity) -> f64 {
        self.last_values[channel.index()][quantity.index()]
    }

    fn set_value(&mut self, channel: Channel, quantity: Quantity, value: f64) -> Result<()> {
        let bound = limits::resolve(channel, quantity, &self.overrides);
        if !bound.contains(value) {
            return Err(Error::OutOfRange {
                channel,
                quantity,
                value,
                bound,
            });
        }
        let value = scpi::round_to_resolution(value);
        let [volts, amps] = match quantity {
            Quantity::Voltage => [value, self.last_values[channel.index()][1]],
            Quantity::Current => [self.last_values[channel.index()][0], value],
        };
        self.exchange(&scpi::apply(channel, volts, amps))?;

        // Read back and refuse to trust an instrument reporting a different state than
        // commanded, e.g. because another session or the front panel intervened.
        let (observed_volts, observed_amps) = self.query_pair(channel)?;
        let observed = match quantity {
            Quantity::Voltage => observed_volts,
            Quantity::Current => observed_amps,
        };
        if (observed - value).abs() > READBACK_TOLERANCE {
            return Err(Error::Reconciliation {
                channel,
                quantity,
                expected: value,
                observed,
            });
        }
        Ok(())
    }

    fn query_pair(&mut self, channel: Channel) -> Result<(f64, f64)> {
        let reply = self.exchange(&scpi::apply_query(channel))?;
        let (volts, amps) = scpi::parse_apply_reply(&reply)?;
        self.last_values[channel.index()] = [volts, amps];
        Ok((volts, amps))
    }

    /// One half-duplex exchange: write the terminated command, then collect the response
    /// line. A silent instrument yields `Ok("")`, which is the normal outcome for pure
    /// write commands; a response that starts but never reaches its terminator within
    /// the port's timeout is a [`Error::Timeout`].
    fn exchange(&mut self, command: &str) -> Result<String> {
        trace!("--> {command}");
        let mut framed = Vec::with_capacity(command.len() + 1);
        framed.extend_from_slice(command.as_bytes());
        framed.push(b'\n');
        self.interface.write_all(&framed)?;
        self.interface.flush()?;

        let mut raw: Vec<u8> = Vec::new();
        let mut byte = [0u8; 1];
        loop {
            match self.interface.read(&mut byte) {
                Ok(0) => break,
                Ok(_) => {
                    raw.push(byte[0]);
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    break
                }
                Err(e) => return Err(Error::Serial(e)),
            }
        }
        if !raw.is_empty() && raw.last() != Some(&b'\n') {
            return Err(Error::Timeout);
        }
        let response = String::from_utf8_lossy(&raw)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        trace!("<-- {response:?}");
        Ok(response)
    }
}

impl E3631aPsu<Box<dyn SerialPort>> {
    /// Open the serial port described by `settings` and run the startup handshake.
    pub fn open(settings: &SerialSettings, beep: bool) -> Result<Self> {
        let port = transport::open(settings)?;
        Self::connect(port, beep)
    }

    /// Construct a session from configuration data: open the port, handshake, and apply
    /// whichever instance limit overrides the configuration carries.
    pub fn open_with_config(config: &PsuConfig) -> Result<Self> {
        let overrides = config.instance_overrides()?;
        let mut psu = Self::open(&config.serial_settings(), config.beep)?;
        psu.overrides = overrides;
        Ok(psu)
    }
}
