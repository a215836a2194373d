//! FDC1004 four-channel capacitance-to-digital converter.
//!
//! The device is optional on the bus: initialisation only logs the
//! identification registers and never fails the driver.  Each read is a
//! single 8-byte burst covering the four result registers, interpreted as
//! signed 16-bit big-endian values scaled to the configured full-scale range.
//!
//! Saturation detection is not implemented; the flag is always `false` and
//! is kept in the API as the extension point for it.

use log::{debug, info, warn};

use crate::bus::RegisterBus;
use crate::error::SensorError;
use crate::sample::CHANNELS;

/// 7-bit bus address.
pub const ADDRESS: u8 = 0x50;

const REG_RESULT_BASE: u8 = 0x00;
const REG_MANUFACTURER_ID: u8 = 0xFE;
const REG_DEVICE_ID: u8 = 0xFF;

/// Raw full-scale count of a signed 16-bit result.
const RAW_FULL_SCALE: f32 = 32768.0;

/// One capacitance read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacitance {
    pub picofarads: [f32; CHANNELS],
    pub saturated: bool,
}

impl Capacitance {
    /// Degraded value for a failed read.  Not a valid zero reading.
    pub const ZERO: Self = Self {
        picofarads: [0.0; CHANNELS],
        saturated: false,
    };
}

/// Identification registers, `None` where the read failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceIds {
    pub manufacturer: Option<u16>,
    pub device: Option<u16>,
}

/// Convert one raw result to picofarads.
pub fn raw_to_pf(raw: i16, full_scale_pf: f32) -> f32 {
    (f32::from(raw) / RAW_FULL_SCALE) * full_scale_pf
}

pub struct CapacitanceSensor {
    full_scale_pf: f32,
}

impl CapacitanceSensor {
    pub fn new(full_scale_pf: f32) -> Self {
        Self { full_scale_pf }
    }

    pub fn full_scale_pf(&self) -> f32 {
        self.full_scale_pf
    }

    /// Best-effort presence check.  Read failures degrade to warnings.
    pub fn initialize(&mut self, bus: &mut impl RegisterBus) -> DeviceIds {
        let manufacturer = read_id(bus, REG_MANUFACTURER_ID, "manufacturer");
        let device = read_id(bus, REG_DEVICE_ID, "device");
        if let (Some(m), Some(d)) = (manufacturer, device) {
            info!("fdc: manuf_id=0x{:04x} device_id=0x{:04x}", m, d);
        }
        DeviceIds {
            manufacturer,
            device,
        }
    }

    /// Reserved for measurement/channel configuration.  Leaves the
    /// power-on defaults untouched.
    pub fn configure_default(&mut self, _bus: &mut impl RegisterBus) {
        debug!("fdc: configure_default is a no-op, power-on defaults kept");
    }

    /// Burst-read all four result registers.
    ///
    /// On failure the caller gets `Err`; [`Capacitance::ZERO`] is the value to
    /// fall back on, and it must not be mistaken for a real zero reading.
    pub fn read_channels(
        &mut self,
        bus: &mut impl RegisterBus,
    ) -> Result<Capacitance, SensorError> {
        let mut buf = [0u8; 2 * CHANNELS];
        if let Err(e) = bus.read(ADDRESS, REG_RESULT_BASE, &mut buf) {
            warn!("fdc: failed to read result registers: {}", e);
            return Err(SensorError::Read(e));
        }

        let mut picofarads = [0.0f32; CHANNELS];
        for (pf, raw) in picofarads.iter_mut().zip(buf.chunks_exact(2)) {
            *pf = raw_to_pf(i16::from_be_bytes([raw[0], raw[1]]), self.full_scale_pf);
        }

        debug!("fdc: raw={:02x?}", buf);
        info!(
            "fdc: {:.3} pF, {:.3} pF, {:.3} pF, {:.3} pF",
            picofarads[0], picofarads[1], picofarads[2], picofarads[3]
        );

        Ok(Capacitance {
            picofarads,
            saturated: false,
        })
    }
}

fn read_id(bus: &mut impl RegisterBus, register: u8, what: &str) -> Option<u16> {
    let mut buf = [0u8; 2];
    match bus.read(ADDRESS, register, &mut buf) {
        Ok(()) => Some(u16::from_be_bytes(buf)),
        Err(e) => {
            warn!("fdc: failed to read {} id: {}", what, e);
            None
        }
    }
}
