//! System configuration parameters
//!
//! Runtime-tunable timing and scaling for the acquisition node, plus the
//! compile-time capacities of the fixed-size tables.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sample ring capacity (samples).
pub const RING_CAPACITY: usize = 64;

/// Scheduler job-table capacity.
pub const MAX_JOBS: usize = 12;

/// Depth of the outbound publish hand-off queue.
pub const PUBLISH_QUEUE_DEPTH: usize = 128;

/// Bounded wait for a single bus transaction (milliseconds).
pub const BUS_TIMEOUT_MS: u32 = 20;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Sampling ---
    /// Sampling cycle period (milliseconds)
    pub sample_period_ms: u32,
    /// Samples to average per reading (reserved; the pipeline does not average yet)
    pub averaging_count: u8,
    /// Capacitance full-scale range (picofarads)
    pub full_scale_pf: f32,

    // --- Downstream jobs ---
    /// Publish drain period (milliseconds)
    pub publish_period_ms: u32,
    /// Persist buffered samples to the record store
    pub storage_enabled: bool,
    /// Storage flush period (milliseconds)
    pub flush_period_ms: u32,
    /// Connectivity status report period (milliseconds)
    pub link_report_period_ms: u32,

    // --- Bus ---
    /// I2C clock frequency (Hz)
    pub bus_frequency_hz: u32,

    // --- Control loop ---
    /// Sleep between polls when no job is registered (milliseconds)
    pub loop_idle_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // Sampling
            sample_period_ms: 1000, // 1 Hz
            averaging_count: 4,
            full_scale_pf: 15.0,

            // Downstream
            publish_period_ms: 200,
            storage_enabled: false, // no card fitted on current boards
            flush_period_ms: 5000,
            link_report_period_ms: 10_000,

            // Bus
            bus_frequency_hz: 400_000,

            // Control loop
            loop_idle_ms: 10,
        }
    }
}

impl NodeConfig {
    /// Reject values that would stall the scheduler or produce nonsense units.
    pub fn validate(&self) -> Result<()> {
        if self.sample_period_ms == 0 {
            return Err(Error::Config("sample_period_ms must be non-zero"));
        }
        if self.publish_period_ms == 0
            || self.flush_period_ms == 0
            || self.link_report_period_ms == 0
        {
            return Err(Error::Config("job periods must be non-zero"));
        }
        if !(self.full_scale_pf.is_finite() && self.full_scale_pf > 0.0) {
            return Err(Error::Config("full_scale_pf must be positive"));
        }
        if self.averaging_count == 0 {
            return Err(Error::Config("averaging_count must be at least 1"));
        }
        if self.bus_frequency_hz == 0 {
            return Err(Error::Config("bus_frequency_hz must be non-zero"));
        }
        Ok(())
    }
}
