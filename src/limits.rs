//! Limit tables and the three-tier limit resolution policy.
//!
//! Every write to the instrument is validated against the bound returned by [`resolve`],
//! which checks, in order:
//!
//! 1. the session's own instance override,
//! 2. the process-wide user override (shared by every session in the process),
//! 3. the factory specification compiled into this module.
//!
//! Override presence is tracked explicitly with `Option` per entry, so setting an
//! override to the factory value is still an override, and clearing it restores the
//! lower tier. Resolution happens fresh on every validation; nothing is cached.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::error::{Error, Result};
use crate::types::{Channel, Quantity};

/// An inclusive `[min, max]` bound for one (channel, quantity) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitBound {
    pub min: f64,
    pub max: f64,
}

impl LimitBound {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Like [`LimitBound::new`], but rejects `min > max`.
    pub fn checked(min: f64, max: f64) -> Result<Self> {
        if min > max {
            Err(Error::InvalidBound { min, max })
        } else {
            Ok(Self { min, max })
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl fmt::Display for LimitBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Factory specification for one (channel, quantity) pair.
///
/// Values are from the E3631A user's guide output-specification table and match the
/// instrument's `MIN`/`MAX` programming parameters.
pub const fn factory_limit(channel: Channel, quantity: Quantity) -> LimitBound {
    match (channel, quantity) {
        (Channel::P6V, Quantity::Voltage) => LimitBound::new(0.0, 6.0),
        (Channel::P25V, Quantity::Voltage) => LimitBound::new(0.0, 25.0),
        (Channel::N25V, Quantity::Voltage) => LimitBound::new(-25.0, 0.0),
        (Channel::P6V, Quantity::Current) => LimitBound::new(0.0, 5.0),
        (Channel::P25V, Quantity::Current) => LimitBound::new(0.0, 1.0),
        (Channel::N25V, Quantity::Current) => LimitBound::new(0.0, 1.0),
    }
}

const ENTRY_COUNT: usize = 6;

const fn entry_index(channel: Channel, quantity: Quantity) -> usize {
    channel.index() * 2 + quantity.index()
}

/// A table of optional limit overrides, one slot per (channel, quantity) pair.
///
/// Used both for the per-session instance limits and for the process-wide user limits.
/// An empty slot means "fall through to the next tier".
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: [Option<LimitBound>; ENTRY_COUNT],
}

impl OverrideTable {
    pub const fn new() -> Self {
        Self {
            entries: [None; ENTRY_COUNT],
        }
    }

    pub fn get(&self, channel: Channel, quantity: Quantity) -> Option<LimitBound> {
        self.entries[entry_index(channel, quantity)]
    }

    /// Install an override. Rejects `min > max`.
    pub fn set(&mut self, channel: Channel, quantity: Quantity, bound: LimitBound) -> Result<()> {
        let bound = LimitBound::checked(bound.min, bound.max)?;
        self.entries[entry_index(channel, quantity)] = Some(bound);
        Ok(())
    }

    pub fn clear(&mut self, channel: Channel, quantity: Quantity) {
        self.entries[entry_index(channel, quantity)] = None;
    }
}

// Process-wide user limits, shared by every session in the process. The mutex is the
// explicit synchronization point for multi-threaded processes; single-threaded callers
// pay one uncontended lock per validation.
static USER_LIMITS: Mutex<OverrideTable> = Mutex::new(OverrideTable::new());

fn user_limits() -> std::sync::MutexGuard<'static, OverrideTable> {
    // A poisoned table still holds valid bounds; keep serving them.
    USER_LIMITS.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Install a process-wide user override, visible to every session that has no instance
/// override for the same entry.
pub fn set_user_limit(channel: Channel, quantity: Quantity, bound: LimitBound) -> Result<()> {
    user_limits().set(channel, quantity, bound)
}

/// Remove a process-wide user override, restoring the factory default for sessions
/// without their own override.
pub fn clear_user_limit(channel: Channel, quantity: Quantity) {
    user_limits().clear(channel, quantity);
}

/// The process-wide limit for an entry: the user override if present, else factory.
pub fn user_limit(channel: Channel, quantity: Quantity) -> LimitBound {
    user_limits()
        .get(channel, quantity)
        .unwrap_or_else(|| factory_limit(channel, quantity))
}

/// Resolve the currently active bound for one entry: instance override, else user
/// override, else factory default.
pub fn resolve(channel: Channel, quantity: Quantity, instance: &OverrideTable) -> LimitBound {
    if let Some(bound) = instance.get(channel, quantity) {
        return bound;
    }
    if let Some(bound) = user_limits().get(channel, quantity) {
        return bound;
    }
    factory_limit(channel, quantity)
}
