//! Outbound pipeline events.
//!
//! The [`Node`](super::node::Node) and [`Sampler`](crate::sampler::Sampler)
//! emit these through the [`EventSink`](super::ports::EventSink) port.  Every
//! absorbed error ends up here so that nothing is dropped without a
//! diagnostic.

use crate::error::SensorError;
use crate::sample::Sample;

use super::ports::StoreError;

/// Which sensor an event concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Capacitance,
    Environment,
}

/// Structured events emitted by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// Startup finished; carries the number of registered jobs.
    Started { jobs: usize },

    /// A sensor could not be brought up; the node keeps running without it.
    SensorUnavailable { sensor: SensorKind, error: SensorError },

    /// A per-cycle read failed and the affected fields were left at zero.
    ReadDegraded {
        sensor: SensorKind,
        error: SensorError,
        timestamp_ms: u64,
    },

    /// A sampling cycle completed and its sample was buffered.
    SampleBuffered { sample: Sample, pending: usize },

    /// The ring was full; the new sample was discarded.
    SampleDropped { timestamp_ms: u64, pending: usize },

    /// The publish drain handed samples to the publish client.
    Published { count: usize, pending: usize },

    /// The publish client refused a sample; it stays buffered.
    PublishBackpressure { pending: usize },

    /// The flush job wrote records to storage.
    Flushed { count: usize, pending: usize },

    /// The storage backlog was full; the new record was discarded.
    RecordDropped { timestamp_ms: u64, pending: usize },

    /// A storage write failed; the sample stays buffered.
    StoreFailed { error: StoreError, pending: usize },

    /// A sample could not be encoded into a storage record and was discarded.
    RecordEncodeFailed { timestamp_ms: u64 },

    /// Periodic connectivity report.
    Link { connected: bool, rssi_dbm: Option<i8> },
}
