//! GPIO assignments for the CapSense board (ESP32-C3).
//!
//! The firmware entry point references this module
//! rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// I²C bus (FDC1004 @ 0x50, BME280 @ 0x76)
// ---------------------------------------------------------------------------

pub const I2C_SCL_GPIO: i32 = 3;
pub const I2C_SDA_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Activity LEDs
// ---------------------------------------------------------------------------

/// High while a sampling cycle is reading the sensors.
pub const LED_SENSE_GPIO: i32 = 0;
/// High while buffered samples are being written to storage.
pub const LED_WRITE_GPIO: i32 = 8;
