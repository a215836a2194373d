//! Application core: the acquisition pipeline behind port traits.
//!
//! [`node::Node`] owns the bus, sampler, ring and scheduler and dispatches
//! due jobs.  All interaction with the rest of the system happens through
//! the traits in [`ports`], keeping this layer testable without hardware.

pub mod events;
pub mod node;
pub mod ports;
