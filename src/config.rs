//! Configuration-map construction.
//!
//! [`PsuConfig`] deserializes from any flat mapping (TOML table, JSON object, ...) and
//! carries the transport parameters plus up to twelve instance limit overrides. The
//! override keys accept the traditional upper-case spelling (`MIN_P6V_VOLTAGE`, ...) as
//! aliases so existing configuration files keep working. Missing keys fall back to the
//! factory values.

use std::time::Duration;

use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::error::Result;
use crate::limits::{factory_limit, LimitBound, OverrideTable};
use crate::transport::{SerialSettings, DEFAULT_TIMEOUT_SECS};
use crate::types::{BaudRate, Channel, DataBits, Parity, Quantity};

/// Everything needed to construct a session from configuration data.
#[derive(Debug, Clone, Deserialize)]
pub struct PsuConfig {
    /// Port identifier, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    #[serde(default)]
    pub baud_rate: BaudRate,
    #[serde(default)]
    pub parity: Parity,
    #[serde(default)]
    pub data_bits: DataBits,
    /// Response timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether construction sends the startup confirmation beeps.
    #[serde(default = "default_beep")]
    pub beep: bool,

    #[serde(default, alias = "MIN_P6V_VOLTAGE")]
    pub min_p6v_voltage: Option<f64>,
    #[serde(default, alias = "MAX_P6V_VOLTAGE")]
    pub max_p6v_voltage: Option<f64>,
    #[serde(default, alias = "MIN_P25V_VOLTAGE")]
    pub min_p25v_voltage: Option<f64>,
    #[serde(default, alias = "MAX_P25V_VOLTAGE")]
    pub max_p25v_voltage: Option<f64>,
    #[serde(default, alias = "MIN_N25V_VOLTAGE")]
    pub min_n25v_voltage: Option<f64>,
    #[serde(default, alias = "MAX_N25V_VOLTAGE")]
    pub max_n25v_voltage: Option<f64>,
    #[serde(default, alias = "MIN_P6V_CURRENT")]
    pub min_p6v_current: Option<f64>,
    #[serde(default, alias = "MAX_P6V_CURRENT")]
    pub max_p6v_current: Option<f64>,
    #[serde(default, alias = "MIN_P25V_CURRENT")]
    pub min_p25v_current: Option<f64>,
    #[serde(default, alias = "MAX_P25V_CURRENT")]
    pub max_p25v_current: Option<f64>,
    #[serde(default, alias = "MIN_N25V_CURRENT")]
    pub min_n25v_current: Option<f64>,
    #[serde(default, alias = "MAX_N25V_CURRENT")]
    pub max_n25v_current: Option<f64>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_beep() -> bool {
    true
}

impl PsuConfig {
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            parity: self.parity,
            data_bits: self.data_bits,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Build the instance override table from whichever limit keys were present.
    ///
    /// A pair with only one side given borrows the other side from the factory bound.
    pub(crate) fn instance_overrides(&self) -> Result<OverrideTable> {
        let mut table = OverrideTable::new();
        for channel in Channel::iter() {
            for quantity in Quantity::iter() {
                let (min, max) = self.override_fields(channel, quantity);
                if min.is_none() && max.is_none() {
                    continue;
                }
                let factory = factory_limit(channel, quantity);
                let bound = LimitBound::new(
                    min.unwrap_or(factory.min),
                    max.unwrap_or(factory.max),
                );
                table.set(channel, quantity, bound)?;
            }
        }
        Ok(table)
    }

    fn override_fields(&self, channel: Channel, quantity: Quantity) -> (Option<f64>, Option<f64>) {
        match (channel, quantity) {
            (Channel::P6V, Quantity::Voltage) => (self.min_p6v_voltage, self.max_p6v_voltage),
            (Channel::P25V, Quantity::Voltage) => (self.min_p25v_voltage, self.max_p25v_voltage),
            (Channel::N25V, Quantity::Voltage) => (self.min_n25v_voltage, self.max_n25v_voltage),
            (Channel::P6V, Quantity::Current) => (self.min_p6v_current, self.max_p6v_current),
            (Channel::P25V, Quantity::Current) => (self.min_p25v_current, self.max_p25v_current),
            (Channel::N25V, Quantity::Current) => (self.min_n25v_current, self.max_n25v_current),
        }
    }
}
