//! One sampling cycle: drive both sensors, assemble a [`Sample`], buffer it.
//!
//! The two sensors are read independently; a failure in one never blocks
//! the other.  Failed fields stay at zero (degrade-to-zero, not
//! repeat-last) and the failure is emitted as a [`NodeEvent`].  A full ring
//! drops the new sample: delivery is at-most-once and best-effort.

use log::{debug, info, warn};

use crate::app::events::{NodeEvent, SensorKind};
use crate::app::ports::{EventSink, Indicator};
use crate::bus::RegisterBus;
use crate::config::NodeConfig;
use crate::error::SensorError;
use crate::ring::SampleRing;
use crate::sample::{FLAG_CAP_SATURATED, Sample};
use crate::sensors::bme280::{self, EnvironmentSensor};
use crate::sensors::fdc1004::{self, CapacitanceSensor, DeviceIds};

/// Outcome of [`Sampler::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    pub capacitance: DeviceIds,
    pub environment: Result<(), SensorError>,
}

/// Outcome of one [`Sampler::run_cycle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    pub sample: Sample,
    pub capacitance: Result<(), SensorError>,
    pub environment: Result<(), SensorError>,
    /// `false` if the ring was full and the sample was dropped.
    pub pushed: bool,
}

pub struct Sampler {
    capacitance: CapacitanceSensor,
    environment: EnvironmentSensor,
}

impl Sampler {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            capacitance: CapacitanceSensor::new(config.full_scale_pf),
            environment: EnvironmentSensor::new(),
        }
    }

    /// Bring up both sensors.  Neither failure is fatal: the capacitance
    /// check is best-effort and a missing environmental sensor just leaves
    /// its fields at zero every cycle.
    pub fn initialize(&mut self, bus: &mut impl RegisterBus, sink: &mut dyn EventSink) -> InitReport {
        for (name, addr) in [("fdc1004", fdc1004::ADDRESS), ("bme280", bme280::ADDRESS)] {
            if bus.probe(addr) {
                info!("sampler: {} present at 0x{:02x}", name, addr);
            } else {
                warn!("sampler: no ACK from {} at 0x{:02x}", name, addr);
            }
        }

        let capacitance = self.capacitance.initialize(bus);
        self.capacitance.configure_default(bus);

        let environment = self.environment.initialize(bus);
        if let Err(error) = environment {
            warn!("sampler: environment sensor init failed ({}); continuing without it", error);
            sink.emit(&NodeEvent::SensorUnavailable {
                sensor: SensorKind::Environment,
                error,
            });
        }

        InitReport {
            capacitance,
            environment,
        }
    }

    pub fn environment_ready(&self) -> bool {
        self.environment.is_initialized()
    }

    /// Run one cycle at `now_ms` and push the result into `ring`.
    pub fn run_cycle<const N: usize>(
        &mut self,
        bus: &mut impl RegisterBus,
        now_ms: u64,
        ring: &mut SampleRing<N>,
        sensing: &mut dyn Indicator,
        sink: &mut dyn EventSink,
    ) -> CycleReport {
        let mut sample = Sample::at(now_ms);

        sensing.set(true);

        let capacitance = match self.capacitance.read_channels(bus) {
            Ok(c) => {
                sample.capacitance_pf = c.picofarads;
                if c.saturated {
                    sample.flags |= FLAG_CAP_SATURATED;
                }
                Ok(())
            }
            Err(error) => {
                sink.emit(&NodeEvent::ReadDegraded {
                    sensor: SensorKind::Capacitance,
                    error,
                    timestamp_ms: now_ms,
                });
                Err(error)
            }
        };

        let environment = match self.environment.read(bus) {
            Ok(env) => {
                sample.temperature_c = env.temperature_c;
                sample.humidity_pct = env.humidity_pct;
                sample.pressure_hpa = env.pressure_hpa;
                Ok(())
            }
            Err(error) => {
                sink.emit(&NodeEvent::ReadDegraded {
                    sensor: SensorKind::Environment,
                    error,
                    timestamp_ms: now_ms,
                });
                Err(error)
            }
        };

        sensing.set(false);

        let pushed = ring.push(sample);
        if pushed {
            debug!("sampler: sample pushed, pending={}", ring.len());
            sink.emit(&NodeEvent::SampleBuffered {
                sample,
                pending: ring.len(),
            });
        } else {
            warn!("sampler: ring full, sample at {}ms dropped", now_ms);
            sink.emit(&NodeEvent::SampleDropped {
                timestamp_ms: now_ms,
                pending: ring.len(),
            });
        }

        CycleReport {
            sample,
            capacitance,
            environment,
            pushed,
        }
    }
}
