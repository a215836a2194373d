//! Cooperative periodic job scheduler.
//!
//! A fixed table of `(label, period, next_due)` entries polled from the
//! single control loop.  The scheduler knows nothing about what the jobs do:
//! when one is due it calls [`JobDelegate::on_job_due`] and the owner
//! dispatches on the [`JobId`].
//!
//! ```text
//!   register ──▶ waiting(next_due) ──▶ due ──▶ run ──▶ next_due += period
//!                      ▲                                      │
//!                      └──────────────────────────────────────┘
//! ```
//!
//! Rescheduling accumulates from the previous deadline rather than from
//! "now", so poll jitter never turns into long-term drift.  A job stalled
//! for several periods catches up at one run per poll.

use heapless::Vec;
use log::{debug, info};

use crate::app::ports::JobDelegate;
use crate::config::MAX_JOBS;
use crate::error::{Error, Result};

/// Handle returned by [`Scheduler::register`]; index into the job table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(u8);

impl JobId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Job {
    label: &'static str,
    period_ms: u32,
    next_due_ms: u64,
}

impl Job {
    /// Wraparound-safe "deadline reached or passed".
    fn is_due(&self, now_ms: u64) -> bool {
        now_ms.wrapping_sub(self.next_due_ms) as i64 >= 0
    }
}

/// Fixed-capacity job table.  Jobs are never removed.
pub struct Scheduler<const N: usize = MAX_JOBS> {
    jobs: Vec<Job, N>,
}

impl<const N: usize> Default for Scheduler<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Scheduler<N> {
    pub const fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Add a periodic job, first due at `now_ms + period_ms`.
    ///
    /// Fails with [`Error::CapacityExceeded`] when the table is full and
    /// with [`Error::Config`] for a zero period.
    pub fn register(&mut self, label: &'static str, period_ms: u32, now_ms: u64) -> Result<JobId> {
        if period_ms == 0 {
            return Err(Error::Config("job period must be non-zero"));
        }
        let id = JobId(u8::try_from(self.jobs.len()).map_err(|_| Error::CapacityExceeded)?);
        self.jobs
            .push(Job {
                label,
                period_ms,
                next_due_ms: now_ms.wrapping_add(u64::from(period_ms)),
            })
            .map_err(|_| Error::CapacityExceeded)?;
        info!(
            "Scheduler: registered '{}' every {}ms at slot {}",
            label,
            period_ms,
            id.index()
        );
        Ok(id)
    }

    /// Run every due job once, in registration order.  Returns how many ran.
    pub fn poll_once(&mut self, now_ms: u64, delegate: &mut dyn JobDelegate) -> usize {
        let mut ran = 0;
        for (i, job) in self.jobs.iter_mut().enumerate() {
            if !job.is_due(now_ms) {
                continue;
            }
            debug!("Scheduler: '{}' due at {} (now {})", job.label, job.next_due_ms, now_ms);
            delegate.on_job_due(JobId(i as u8), job.label, now_ms);
            job.next_due_ms = job.next_due_ms.wrapping_add(u64::from(job.period_ms));
            ran += 1;
        }
        ran
    }

    /// Milliseconds until the earliest deadline (0 if something is overdue),
    /// or `None` with no jobs registered.
    pub fn next_due_in(&self, now_ms: u64) -> Option<u64> {
        self.jobs
            .iter()
            .map(|j| {
                if j.is_due(now_ms) {
                    0
                } else {
                    j.next_due_ms.wrapping_sub(now_ms)
                }
            })
            .min()
    }

    pub fn next_due_ms(&self, id: JobId) -> Option<u64> {
        self.jobs.get(id.index()).map(|j| j.next_due_ms)
    }

    pub fn label(&self, id: JobId) -> Option<&'static str> {
        self.jobs.get(id.index()).map(|j| j.label)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
