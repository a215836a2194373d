//! The acquisition node.  Owns the pipeline and dispatches scheduled jobs.
//!
//! [`Node`] owns the bus, the sampler, the sample ring, the storage backlog
//! and the scheduler.  Everything else arrives per poll through [`Ports`],
//! keeping the node testable with mock adapters.
//!
//! ```text
//!              ┌───────────────────────── Node ──────────────────────────┐
//!   now_ms ──▶ │ Scheduler ──▶ sample ──▶ Sampler ─┬─▶ SampleRing        │
//!              │                                   └─▶ records (storage) │
//!              │           ──▶ publish ◀── SampleRing ──▶ PublishPort    │
//!              │           ──▶ flush   ◀── records    ──▶ RecordStore    │
//!              │           ──▶ link ─────────────────────▶ EventSink     │
//!              └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Publishing and storage are independent consumers: with storage enabled
//! every sample reaches both, whatever the link state.

use log::{debug, info, warn};

use crate::bus::RegisterBus;
use crate::config::{NodeConfig, RING_CAPACITY};
use crate::error::Result;
use crate::ring::SampleRing;
use crate::sampler::{CycleReport, InitReport, Sampler};
use crate::scheduler::{JobId, Scheduler};

use super::events::NodeEvent;
use super::ports::{EventSink, Indicator, JobDelegate, LinkStatus, PublishPort, RecordStore};

/// Upper bound on one postcard-encoded [`Sample`](crate::sample::Sample).
pub const RECORD_MAX_LEN: usize = 64;

/// The external collaborators a poll may touch.
pub struct Ports<'a> {
    /// "Sensing active" line, high for the duration of a sampling cycle.
    pub sensing: &'a mut dyn Indicator,
    /// "Writing active" line, high while records are being flushed.
    pub writing: &'a mut dyn Indicator,
    pub publisher: &'a mut dyn PublishPort,
    pub store: &'a mut dyn RecordStore,
    pub link: &'a dyn LinkStatus,
    pub sink: &'a mut dyn EventSink,
}

/// Scheduler handles for the node's jobs.
#[derive(Debug, Clone, Copy)]
pub struct Jobs {
    pub sample: JobId,
    pub publish: JobId,
    /// Only registered when storage is enabled.
    pub flush: Option<JobId>,
    pub link: JobId,
}

pub struct Node<B, const R: usize = RING_CAPACITY> {
    bus: B,
    sampler: Sampler,
    ring: SampleRing<R>,
    /// Storage backlog.  Fed every sample alongside `ring` when the flush
    /// job is registered, so publishing never starves the record store.
    records: SampleRing<R>,
    scheduler: Scheduler,
    jobs: Jobs,
    last_cycle: Option<CycleReport>,
    idle_ms: u64,
}

impl<B: RegisterBus, const R: usize> Node<B, R> {
    /// Validate `config` and register every job, first due one period after
    /// `now_ms`.  Job-table overflow is a startup error.
    pub fn new(config: &NodeConfig, bus: B, now_ms: u64) -> Result<Self> {
        config.validate()?;

        let mut scheduler = Scheduler::new();
        let jobs = Jobs {
            sample: scheduler.register("sample", config.sample_period_ms, now_ms)?,
            publish: scheduler.register("publish", config.publish_period_ms, now_ms)?,
            flush: if config.storage_enabled {
                Some(scheduler.register("flush", config.flush_period_ms, now_ms)?)
            } else {
                info!("Node: storage disabled, flush job not registered");
                None
            },
            link: scheduler.register("link", config.link_report_period_ms, now_ms)?,
        };

        Ok(Self {
            bus,
            sampler: Sampler::new(config),
            ring: SampleRing::new(),
            records: SampleRing::new(),
            scheduler,
            jobs,
            last_cycle: None,
            idle_ms: u64::from(config.loop_idle_ms),
        })
    }

    /// Bring up the sensors.  Never fatal; see [`Sampler::initialize`].
    pub fn initialize(&mut self, sink: &mut dyn EventSink) -> InitReport {
        let report = self.sampler.initialize(&mut self.bus, sink);
        sink.emit(&NodeEvent::Started {
            jobs: self.scheduler.len(),
        });
        info!("Node started with {} jobs", self.scheduler.len());
        report
    }

    /// Run every job due at `now_ms`.  Returns how many ran.
    pub fn poll_once(&mut self, now_ms: u64, ports: &mut Ports<'_>) -> usize {
        let Self {
            bus,
            sampler,
            ring,
            records,
            scheduler,
            jobs,
            last_cycle,
            ..
        } = self;
        let mut dispatch = Dispatch {
            bus,
            sampler,
            ring,
            records,
            jobs: *jobs,
            last_cycle,
            ports,
        };
        scheduler.poll_once(now_ms, &mut dispatch)
    }

    /// How long the control loop may sleep before the next deadline.
    pub fn next_wake_in(&self, now_ms: u64) -> u64 {
        self.scheduler.next_due_in(now_ms).unwrap_or(self.idle_ms)
    }

    pub fn jobs(&self) -> Jobs {
        self.jobs
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn ring(&self) -> &SampleRing<R> {
        &self.ring
    }

    pub fn ring_mut(&mut self) -> &mut SampleRing<R> {
        &mut self.ring
    }

    /// Samples waiting for the flush job.  Always empty with storage off.
    pub fn records(&self) -> &SampleRing<R> {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut SampleRing<R> {
        &mut self.records
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Report of the most recent sampling cycle.
    pub fn last_cycle(&self) -> Option<&CycleReport> {
        self.last_cycle.as_ref()
    }
}

// ───────────────────────────────────────────────────────────────
// Job dispatch
// ───────────────────────────────────────────────────────────────

/// Borrows the node's parts for the duration of one scheduler pass.
struct Dispatch<'n, 'p, B, const R: usize> {
    bus: &'n mut B,
    sampler: &'n mut Sampler,
    ring: &'n mut SampleRing<R>,
    records: &'n mut SampleRing<R>,
    jobs: Jobs,
    last_cycle: &'n mut Option<CycleReport>,
    ports: &'n mut Ports<'p>,
}

impl<B: RegisterBus, const R: usize> JobDelegate for Dispatch<'_, '_, B, R> {
    fn on_job_due(&mut self, job: JobId, label: &'static str, now_ms: u64) {
        if job == self.jobs.sample {
            self.sample(now_ms);
        } else if job == self.jobs.publish {
            self.publish();
        } else if Some(job) == self.jobs.flush {
            self.flush();
        } else if job == self.jobs.link {
            self.link();
        } else {
            warn!("Node: no handler for job '{}'", label);
        }
    }
}

impl<B: RegisterBus, const R: usize> Dispatch<'_, '_, B, R> {
    fn sample(&mut self, now_ms: u64) {
        let report = self.sampler.run_cycle(
            &mut *self.bus,
            now_ms,
            self.ring,
            self.ports.sensing,
            self.ports.sink,
        );
        if self.jobs.flush.is_some() && !self.records.push(report.sample) {
            warn!("storage backlog full, record at {}ms dropped", now_ms);
            self.ports.sink.emit(&NodeEvent::RecordDropped {
                timestamp_ms: now_ms,
                pending: self.records.len(),
            });
        }
        *self.last_cycle = Some(report);
    }

    /// Hand buffered samples to the publish client while it is connected
    /// and accepting.  A refused sample stays at the head of the ring.
    fn publish(&mut self) {
        if !self.ports.publisher.is_connected() {
            debug!("publish: not connected, {} pending", self.ring.len());
            return;
        }

        let mut count = 0;
        while let Some(sample) = self.ring.peek().copied() {
            if !self.ports.publisher.enqueue(sample) {
                self.ports.sink.emit(&NodeEvent::PublishBackpressure {
                    pending: self.ring.len(),
                });
                break;
            }
            self.ring.pop();
            count += 1;
        }

        if count > 0 {
            self.ports.sink.emit(&NodeEvent::Published {
                count,
                pending: self.ring.len(),
            });
        }
    }

    /// Persist the storage backlog as postcard records, with the "writing"
    /// indicator held high for the duration.
    fn flush(&mut self) {
        if self.records.is_empty() {
            return;
        }

        self.ports.writing.set(true);
        let mut count = 0;
        let mut buf = [0u8; RECORD_MAX_LEN];
        while let Some(sample) = self.records.peek().copied() {
            let record = match postcard::to_slice(&sample, &mut buf) {
                Ok(r) => r,
                Err(e) => {
                    warn!("flush: encode failed ({:?}), dropping sample", e);
                    self.records.pop();
                    self.ports.sink.emit(&NodeEvent::RecordEncodeFailed {
                        timestamp_ms: sample.timestamp_ms,
                    });
                    continue;
                }
            };
            if let Err(error) = self.ports.store.append(record) {
                self.ports.sink.emit(&NodeEvent::StoreFailed {
                    error,
                    pending: self.records.len(),
                });
                break;
            }
            self.records.pop();
            count += 1;
        }
        self.ports.writing.set(false);

        if count > 0 {
            self.ports.sink.emit(&NodeEvent::Flushed {
                count,
                pending: self.records.len(),
            });
        }
    }

    fn link(&mut self) {
        self.ports.sink.emit(&NodeEvent::Link {
            connected: self.ports.link.is_connected(),
            rssi_dbm: self.ports.link.rssi_dbm(),
        });
    }
}
