//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter     | Implements              | Connects to                 |
//! |-------------|-------------------------|-----------------------------|
//! | `indicator` | Indicator               | Activity LEDs (OutputPin)   |
//! | `log_sink`  | EventSink               | Serial log output           |
//! | `store`     | RecordStore             | RAM log / no card           |
//! | `time`      | Clock                   | ESP32 system timer          |
//! | `uplink`    | PublishPort, LinkStatus | Wi-Fi + publish client      |

pub mod indicator;
pub mod log_sink;
pub mod store;
pub mod time;
pub mod uplink;
