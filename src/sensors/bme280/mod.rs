//! BME280 temperature / humidity / pressure sensor.
//!
//! ## Lifecycle
//!
//! [`EnvironmentSensor::initialize`] verifies the chip ID, loads the factory
//! trim into a fresh [`Calibration`], and configures continuous measurement.
//! The new calibration is only swapped in once every step has succeeded, so
//! a failed re-initialisation leaves the previous set intact and a reader
//! never sees a half-loaded one.  Both initialise and read take `&mut self`,
//! which rules out re-initialising while a read is in flight.

pub mod calibration;
pub mod compensation;

use log::{debug, error, info};

use crate::bus::RegisterBus;
use crate::error::SensorError;

pub use calibration::Calibration;
pub use compensation::Environment;
use compensation::{RawReading, compensate};

/// 7-bit bus address (SDO tied low).
pub const ADDRESS: u8 = 0x76;

/// Expected contents of the chip-ID register.
pub const CHIP_ID: u8 = 0x60;

const REG_CALIB_00: u8 = 0x88;
const REG_CHIP_ID: u8 = 0xD0;
const REG_CALIB_26: u8 = 0xE1;
const REG_CTRL_HUM: u8 = 0xF2;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
const REG_MEAS: u8 = 0xF7;

/// Oversampling ×1 encoding.
const OSRS_X1: u8 = 0b001;
/// Normal (continuous) mode.
const MODE_NORMAL: u8 = 0b11;

/// Register writes issued by `initialize`, in bus order.
///
/// ctrl_hum only latches on the next ctrl_meas write, so it has to go first.
pub const CONFIG_SEQUENCE: [(u8, u8); 3] = [
    (REG_CTRL_HUM, OSRS_X1),
    (REG_CTRL_MEAS, (OSRS_X1 << 5) | (OSRS_X1 << 2) | MODE_NORMAL),
    // filter off, t_standby 0.5 ms
    (REG_CONFIG, 0x00),
];

#[derive(Default)]
pub struct EnvironmentSensor {
    calibration: Option<Calibration>,
}

impl EnvironmentSensor {
    pub fn new() -> Self {
        Self { calibration: None }
    }

    pub fn is_initialized(&self) -> bool {
        self.calibration.is_some()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Verify the device, load calibration and start continuous conversion.
    pub fn initialize(&mut self, bus: &mut impl RegisterBus) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        bus.read(ADDRESS, REG_CHIP_ID, &mut id).map_err(|e| {
            error!("bme: chip id read failed: {}", e);
            SensorError::Read(e)
        })?;
        if id[0] != CHIP_ID {
            error!("bme: unexpected chip id 0x{:02x}", id[0]);
            return Err(SensorError::UnexpectedDevice { found: id[0] });
        }

        let mut block1 = [0u8; calibration::BLOCK1_LEN];
        bus.read(ADDRESS, REG_CALIB_00, &mut block1).map_err(|e| {
            error!("bme: calib block 1 read failed: {}", e);
            SensorError::Read(e)
        })?;
        let mut block2 = [0u8; calibration::BLOCK2_LEN];
        bus.read(ADDRESS, REG_CALIB_26, &mut block2).map_err(|e| {
            error!("bme: calib block 2 read failed: {}", e);
            SensorError::Read(e)
        })?;
        let cal = Calibration::decode(&block1, &block2);

        for (reg, value) in CONFIG_SEQUENCE {
            bus.write(ADDRESS, reg, &[value]).map_err(|e| {
                error!("bme: write 0x{:02x} failed: {}", reg, e);
                SensorError::Read(e)
            })?;
        }

        self.calibration = Some(cal);
        info!("bme: initialised (id=0x{:02x})", id[0]);
        Ok(())
    }

    /// Burst-read the measurement registers and compensate.
    pub fn read(&mut self, bus: &mut impl RegisterBus) -> Result<Environment, SensorError> {
        let Some(cal) = self.calibration else {
            debug!("bme: read skipped, not initialized");
            return Err(SensorError::NotInitialized);
        };

        let mut buf = [0u8; 8];
        if let Err(e) = bus.read(ADDRESS, REG_MEAS, &mut buf) {
            debug!("bme: measurement read failed: {}", e);
            return Err(SensorError::Read(e));
        }

        let env = Environment::from(compensate(&cal, RawReading::from_burst(&buf)));
        info!(
            "bme: T={:.2}C H={:.2}% P={:.2} hPa",
            env.temperature_c, env.humidity_pct, env.pressure_hpa
        );
        Ok(env)
    }
}
