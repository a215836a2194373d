//! Sensor drivers on the shared bus.
//!
//! | Driver    | Device   | Produces                              |
//! |-----------|----------|---------------------------------------|
//! | `fdc1004` | FDC1004  | 4 × capacitance (pF) + saturation     |
//! | `bme280`  | BME280   | temperature / humidity / pressure     |
//!
//! Drivers own no bus handle; each operation borrows the bus for the
//! duration of its transactions, so the sampler can drive both from one
//! owner without interior mutability.

pub mod bme280;
pub mod fdc1004;
