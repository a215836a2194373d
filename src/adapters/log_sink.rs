//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing pipeline events to the `log` facade
//! (UART / USB-CDC in production).  A telemetry adapter would implement the
//! same trait.

use log::{debug, info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;
use crate::error::SensorError;

/// Adapter that logs every [`NodeEvent`] as a one-line tagged record.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Started { jobs } => {
                info!("START | jobs={}", jobs);
            }
            NodeEvent::SensorUnavailable { sensor, error } => {
                warn!("SENSOR | {:?} unavailable: {}", sensor, error);
            }
            NodeEvent::ReadDegraded {
                sensor,
                error: SensorError::NotInitialized,
                timestamp_ms,
            } => {
                // Already reported once as SensorUnavailable at startup.
                debug!("SENSOR | t={}ms {:?} unavailable, fields zeroed", timestamp_ms, sensor);
            }
            NodeEvent::ReadDegraded {
                sensor,
                error,
                timestamp_ms,
            } => {
                warn!("SENSOR | t={}ms {:?} read degraded: {}", timestamp_ms, sensor, error);
            }
            NodeEvent::SampleBuffered { sample, pending } => {
                info!(
                    "SAMPLE | t={}ms | C=[{:.3} {:.3} {:.3} {:.3}]pF | \
                     T={:.2}\u{00b0}C H={:.2}% P={:.2}hPa | flags=0x{:04x} | pending={}",
                    sample.timestamp_ms,
                    sample.capacitance_pf[0],
                    sample.capacitance_pf[1],
                    sample.capacitance_pf[2],
                    sample.capacitance_pf[3],
                    sample.temperature_c,
                    sample.humidity_pct,
                    sample.pressure_hpa,
                    sample.flags,
                    pending,
                );
            }
            NodeEvent::SampleDropped {
                timestamp_ms,
                pending,
            } => {
                warn!("RING | full, dropped t={}ms (pending={})", timestamp_ms, pending);
            }
            NodeEvent::Published { count, pending } => {
                info!("PUB | handed off {} (pending={})", count, pending);
            }
            NodeEvent::PublishBackpressure { pending } => {
                warn!("PUB | queue full (pending={})", pending);
            }
            NodeEvent::Flushed { count, pending } => {
                info!("STORE | wrote {} (pending={})", count, pending);
            }
            NodeEvent::RecordDropped {
                timestamp_ms,
                pending,
            } => {
                warn!("STORE | backlog full, dropped t={}ms (pending={})", timestamp_ms, pending);
            }
            NodeEvent::StoreFailed { error, pending } => {
                warn!("STORE | write failed: {} (pending={})", error, pending);
            }
            NodeEvent::RecordEncodeFailed { timestamp_ms } => {
                warn!("STORE | encode failed, dropped t={}ms", timestamp_ms);
            }
            NodeEvent::Link {
                connected,
                rssi_dbm,
            } => match rssi_dbm {
                Some(rssi) => info!("LINK | connected={} rssi={}dBm", connected, rssi),
                None => info!("LINK | connected={}", connected),
            },
        }
    }
}
