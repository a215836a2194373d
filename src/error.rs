//! Unified error types for the CapSense node.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! startup path's error handling uniform.  All variants are `Copy` so they
//! can be carried through cycle reports and events without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the node funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus transaction failed.
    Bus(BusError),
    /// A sensor driver failed to initialise or read.
    Sensor(SensorError),
    /// A fixed-capacity table (job table, ring, outbox) is full.
    CapacityExceeded,
    /// Configuration is invalid.
    Config(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::CapacityExceeded => write!(f, "capacity exceeded"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

/// Transaction-level failure on the shared two-wire bus.
///
/// Always recoverable: the affected read is skipped for this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The device did not acknowledge its address or a data byte.
    Nack,
    /// Another controller won arbitration.
    ArbitrationLoss,
    /// The transaction did not complete within the bounded wait.
    Timeout,
    /// Misplaced start/stop condition or similar bus-level fault.
    Bus,
    /// Any other platform driver failure.
    Other,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "no acknowledge"),
            Self::ArbitrationLoss => write!(f, "arbitration lost"),
            Self::Timeout => write!(f, "transaction timed out"),
            Self::Bus => write!(f, "bus fault"),
            Self::Other => write!(f, "driver error"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction behind a read failed; no data this cycle.
    Read(BusError),
    /// The chip-identification register held an unexpected value.
    UnexpectedDevice { found: u8 },
    /// A read was attempted before calibration was loaded.
    NotInitialized,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(e) => write!(f, "read failed ({e})"),
            Self::UnexpectedDevice { found } => {
                write!(f, "unexpected chip id 0x{found:02x}")
            }
            Self::NotInitialized => write!(f, "not initialised"),
        }
    }
}

impl From<BusError> for SensorError {
    fn from(e: BusError) -> Self {
        Self::Read(e)
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Node-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
