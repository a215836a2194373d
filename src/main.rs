//! CapSense node firmware entry point (ESP32-C3).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  I2cBus<I2cDriver>   PinIndicator x2   Uplink   NoStore      │
//! │  (RegisterBus)       (Indicator)       (Publish) (Records)   │
//! │  MonotonicClock      LogEventSink      StationLink           │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │  Node: Scheduler · Sampler · SampleRing            │      │
//! │  └────────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use core::time::Duration;

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use log::{debug, error, info, warn};

use capsense::adapters::indicator::PinIndicator;
use capsense::adapters::log_sink::LogEventSink;
use capsense::adapters::store::NoStore;
use capsense::adapters::time::MonotonicClock;
use capsense::adapters::uplink::Uplink;
use capsense::app::node::{Node, Ports};
use capsense::app::ports::{Clock, LinkStatus};
use capsense::bus::I2cBus;
use capsense::config::{BUS_TIMEOUT_MS, NodeConfig};
use capsense::pins;

/// Station link state read straight from the Wi-Fi driver.
struct StationLink;

impl LinkStatus for StationLink {
    fn is_connected(&self) -> bool {
        self.rssi_dbm().is_some()
    }

    fn rssi_dbm(&self) -> Option<i8> {
        let mut ap_info = esp_idf_svc::sys::wifi_ap_record_t::default();
        // SAFETY: ap_info is a valid out-parameter for the duration of the call.
        let rc = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        (rc == esp_idf_svc::sys::ESP_OK).then_some(ap_info.rssi)
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("CapSense node v{}", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::default();
    if let Err(e) = config.validate() {
        error!("invalid configuration: {}", e);
        return Err(anyhow::anyhow!("invalid configuration: {e}"));
    }

    // ── 2. I²C bus ────────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new()
        .baudrate(Hertz(config.bus_frequency_hz))
        .timeout(Duration::from_millis(u64::from(BUS_TIMEOUT_MS)).into());

    // SAFETY: pin numbers come from the board map and are not claimed elsewhere.
    let (sda, scl) = unsafe {
        (
            AnyIOPin::new(pins::I2C_SDA_GPIO),
            AnyIOPin::new(pins::I2C_SCL_GPIO),
        )
    };
    let driver = match I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_config) {
        Ok(d) => d,
        Err(e) => {
            // Nothing can be sampled without the bus; the watchdog resets us.
            error!("I2C init failed: {} - halting", e);
            #[allow(clippy::empty_loop)]
            loop {}
        }
    };
    info!(
        "I2C up: SDA={} SCL={} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        config.bus_frequency_hz
    );

    // ── 3. Indicators ─────────────────────────────────────────
    // SAFETY: as above.
    let (sense_pin, write_pin) = unsafe {
        (
            AnyOutputPin::new(pins::LED_SENSE_GPIO),
            AnyOutputPin::new(pins::LED_WRITE_GPIO),
        )
    };
    let mut sensing = PinIndicator::new(PinDriver::output(sense_pin)?, "sense");
    let mut writing = PinIndicator::new(PinDriver::output(write_pin)?, "write");

    // ── 4. Remaining adapters ─────────────────────────────────
    let clock = MonotonicClock::new();
    let mut uplink: Uplink = Uplink::new();
    let mut store = NoStore;
    let link = StationLink;
    let mut sink = LogEventSink::new();

    if config.storage_enabled {
        warn!("storage enabled but no card driver is fitted; records will be refused");
    }

    // ── 5. Pipeline ───────────────────────────────────────────
    let mut node: Node<_> = Node::new(&config, I2cBus::new(driver), clock.now_ms())
        .map_err(|e| anyhow::anyhow!("node setup failed: {e}"))?;
    let report = node.initialize(&mut sink);
    info!(
        "sensors: fdc1004 ids={:?} bme280={}",
        report.capacitance,
        if report.environment.is_ok() { "ok" } else { "absent" }
    );

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        uplink.set_connected(link.is_connected(), link.rssi_dbm());

        let mut ports = Ports {
            sensing: &mut sensing,
            writing: &mut writing,
            publisher: &mut uplink,
            store: &mut store,
            link: &link,
            sink: &mut sink,
        };
        node.poll_once(clock.now_ms(), &mut ports);

        // TODO: hand queued samples to the MQTT client once it is linked in.
        let discarded = uplink.discard_pending();
        if discarded > 0 {
            debug!("uplink: no broker client, discarded {} published samples", discarded);
        }

        let wait = node.next_wake_in(clock.now_ms()).max(1);
        FreeRtos::delay_ms(u32::try_from(wait).unwrap_or(u32::MAX));
    }
}
