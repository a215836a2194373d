//! CapSense node firmware library.
//!
//! Exposes the acquisition pipeline (bus transport, sensor drivers, sampler,
//! sample ring, scheduler) for integration testing on the host.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`.

#![deny(unused_must_use)]

pub mod app;
pub mod bus;
pub mod config;
pub mod error;
pub mod ring;
pub mod sample;
pub mod sampler;
pub mod scheduler;
pub mod sensors;

pub mod adapters;
pub mod pins;
