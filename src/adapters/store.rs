//! Record store adapters.
//!
//! The storage medium itself (SD card over SPI) lives outside the pipeline.
//! [`NoStore`] stands in on boards without a card; [`MemoryStore`] keeps
//! records in RAM for simulation and bring-up.

use heapless::Vec;

use crate::app::node::RECORD_MAX_LEN;
use crate::app::ports::{RecordStore, StoreError};

/// Always unavailable.
#[derive(Default)]
pub struct NoStore;

impl RecordStore for NoStore {
    fn append(&mut self, _record: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Bounded in-RAM record log.
pub struct MemoryStore<const N: usize> {
    records: Vec<Vec<u8, RECORD_MAX_LEN>, N>,
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryStore<N> {
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &[u8]> {
        self.records.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<const N: usize> RecordStore for MemoryStore<N> {
    fn append(&mut self, record: &[u8]) -> Result<(), StoreError> {
        let rec = Vec::from_slice(record).map_err(|()| StoreError::IoError)?;
        self.records.push(rec).map_err(|_| StoreError::Full)
    }
}
