//! Shared two-wire bus transport.
//!
//! Every sensor driver talks to its device through [`RegisterBus`]: one call
//! is one complete addressed transaction bounded by start/stop conditions.
//!
//! ```text
//!  read:  S | addr+W | reg | Sr | addr+R | d0 .. dN(NACK) | P
//!  write: S | addr+W | reg | d0 .. dN                      | P
//! ```
//!
//! The transport keeps no in-flight state.  Methods take `&mut self`, so the
//! borrow checker enforces the one-transaction-at-a-time discipline; the
//! cooperative control loop never needs a lock around the bus.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, Operation};
use log::debug;

use crate::error::BusError;

/// Register-oriented access to devices on the shared bus.
pub trait RegisterBus {
    /// Burst-read `buf.len()` bytes starting at `register`.
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError>;

    /// Write `data` starting at `register`.
    fn write(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), BusError>;

    /// Address-only probe.  `true` if a device acknowledged.
    fn probe(&mut self, address: u8) -> bool;
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        (**self).read(address, register, buf)
    }

    fn write(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), BusError> {
        (**self).write(address, register, data)
    }

    fn probe(&mut self, address: u8) -> bool {
        (**self).probe(address)
    }
}

/// [`RegisterBus`] over any `embedded-hal` 1.0 I2C controller.
///
/// The per-transaction timeout lives in the platform driver
/// (see [`BUS_TIMEOUT_MS`](crate::config::BUS_TIMEOUT_MS)); a timed-out
/// transfer surfaces here as [`BusError::Timeout`] or [`BusError::Other`]
/// depending on how the HAL classifies it.
pub struct I2cBus<I> {
    i2c: I,
}

impl<I: I2c> I2cBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Give the controller back (e.g. to reconfigure the clock).
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> RegisterBus for I2cBus<I> {
    fn read(&mut self, address: u8, register: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c
            .write_read(address, &[register], buf)
            .map_err(|e| classify(e.kind()))
    }

    fn write(&mut self, address: u8, register: u8, data: &[u8]) -> Result<(), BusError> {
        // Adjacent writes in one transaction are sent back-to-back without a
        // repeated start, so the register pointer and payload share one frame.
        let reg = [register];
        let mut ops = [Operation::Write(&reg), Operation::Write(data)];
        self.i2c
            .transaction(address, &mut ops)
            .map_err(|e| classify(e.kind()))
    }

    fn probe(&mut self, address: u8) -> bool {
        let present = self.i2c.write(address, &[]).is_ok();
        debug!("i2c: probe 0x{:02x} -> {}", address, present);
        present
    }
}

/// Map the HAL's error classification onto the node's bus taxonomy.
pub fn classify(kind: ErrorKind) -> BusError {
    match kind {
        ErrorKind::NoAcknowledge(_) => BusError::Nack,
        ErrorKind::ArbitrationLoss => BusError::ArbitrationLoss,
        ErrorKind::Bus => BusError::Bus,
        _ => BusError::Other,
    }
}
