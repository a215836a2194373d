//! Activity LEDs as [`Indicator`]s.
//!
//! Any `embedded-hal` output pin works.  Pin errors are logged and otherwise
//! ignored: a stuck LED must never interrupt a sampling cycle.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::Indicator;

pub struct PinIndicator<P> {
    pin: P,
    name: &'static str,
}

impl<P: OutputPin> PinIndicator<P> {
    /// Wrap `pin` and drive it low.
    pub fn new(pin: P, name: &'static str) -> Self {
        let mut ind = Self { pin, name };
        ind.set(false);
        ind
    }
}

impl<P: OutputPin> Indicator for PinIndicator<P> {
    fn set(&mut self, active: bool) {
        let result = if active {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            warn!("indicator '{}': pin write failed", self.name);
        }
    }
}
