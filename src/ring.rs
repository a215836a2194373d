//! Bounded FIFO of samples between the sampler and downstream drain jobs.
//!
//! One producer (the sampler job) and consumers (publish / flush jobs) that
//! all run on the same cooperative loop, so no locking is involved.  If a
//! second execution context ever pushes or pops, wrap the ring in a
//! critical-section mutex first.

use heapless::Deque;

use crate::config::RING_CAPACITY;
use crate::sample::Sample;

/// Fixed-capacity circular buffer of [`Sample`]s.
///
/// Overflow policy is drop-newest: [`push`](Self::push) on a full ring
/// rejects the incoming sample and leaves buffered samples untouched.
pub struct SampleRing<const N: usize = RING_CAPACITY> {
    slots: Deque<Sample, N>,
}

impl<const N: usize> Default for SampleRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleRing<N> {
    pub const fn new() -> Self {
        Self {
            slots: Deque::new(),
        }
    }

    /// Append a sample.  Returns `false` (and changes nothing) if full.
    pub fn push(&mut self, sample: Sample) -> bool {
        self.slots.push_back(sample).is_ok()
    }

    /// Remove the oldest sample.
    pub fn pop(&mut self) -> Option<Sample> {
        self.slots.pop_front()
    }

    /// Oldest sample without removing it.
    pub fn peek(&self) -> Option<&Sample> {
        self.slots.front()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
