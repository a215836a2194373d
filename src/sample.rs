//! The per-cycle measurement record.

use serde::{Deserialize, Serialize};

/// Number of capacitance channels on the sensor.
pub const CHANNELS: usize = 4;

/// `flags` bit: the capacitance front-end reported saturation.
pub const FLAG_CAP_SATURATED: u16 = 1 << 0;

/// One sampling-cycle result.
///
/// Built default-zeroed by the sampler and filled field by field; fields
/// whose sensor failed this cycle stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Monotonic milliseconds since boot.
    pub timestamp_ms: u64,
    pub capacitance_pf: [f32; CHANNELS],
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub pressure_hpa: f32,
    pub flags: u16,
}

impl Sample {
    /// An all-zero sample stamped with `timestamp_ms`.
    pub fn at(timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            ..Self::default()
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.flags & FLAG_CAP_SATURATED != 0
    }
}
