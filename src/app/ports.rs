//! Port traits: the boundary between the acquisition pipeline and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Node (pipeline)
//! ```
//!
//! Everything the pipeline consumes but does not own (time, indicator
//! lines, the publish client, persistent storage, link status, and the
//! observability sink) is reached through one of these traits, so the
//! whole pipeline runs on the host against mocks.

use crate::sample::Sample;
use crate::scheduler::JobId;

use super::events::NodeEvent;

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Never goes backwards.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Presence indicators
// ───────────────────────────────────────────────────────────────

/// A binary activity signal ("sensing", "writing").  Only the level matters.
pub trait Indicator {
    fn set(&mut self, active: bool);
}

// ───────────────────────────────────────────────────────────────
// Publish client (store-and-forward transport)
// ───────────────────────────────────────────────────────────────

/// Hand-off point to the publish client.
pub trait PublishPort {
    /// Whether the transport currently has a broker session.
    fn is_connected(&self) -> bool;

    /// Queue one sample for publication.  `false` if the queue is full.
    fn enqueue(&mut self, sample: Sample) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Persistent record storage
// ───────────────────────────────────────────────────────────────

/// Append-only sink for encoded sample records.
///
/// The pipeline hands over opaque byte records; the on-media layout is the
/// adapter's concern.
pub trait RecordStore {
    fn append(&mut self, record: &[u8]) -> Result<(), StoreError>;
}

// ───────────────────────────────────────────────────────────────
// Connectivity
// ───────────────────────────────────────────────────────────────

/// Read-only view of the network link for periodic status reports.
pub trait LinkStatus {
    fn is_connected(&self) -> bool;

    /// Received signal strength, if the link reports one.
    fn rssi_dbm(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Event sink
// ───────────────────────────────────────────────────────────────

/// The pipeline emits structured [`NodeEvent`]s through this port.
/// Adapters decide where they go (serial log, telemetry topic, ...).
pub trait EventSink {
    fn emit(&mut self, event: &NodeEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate
// ───────────────────────────────────────────────────────────────

/// Callback the [`Scheduler`](crate::scheduler::Scheduler) invokes for each
/// due job.  Runs synchronously and to completion before the next job is
/// checked.
pub trait JobDelegate {
    fn on_job_due(&mut self, job: JobId, label: &'static str, now_ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`RecordStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// The medium is not mounted or not present.
    Unavailable,
    /// No space left for the record.
    Full,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
