//! End-to-end tests for the Scheduler → Sampler → SampleRing → publish /
//! flush pipeline, driven through [`Node`] with mock collaborators.

use capsense::app::events::{NodeEvent, SensorKind};
use capsense::app::node::Node;
use capsense::app::ports::{Clock, StoreError};
use capsense::config::NodeConfig;
use capsense::error::{BusError, Error, SensorError};
use capsense::sample::Sample;
use capsense::scheduler::Scheduler;
use capsense::sensors::{bme280, fdc1004};

use crate::mock_hw::{ManualClock, MockBus, MockPublisher, MockStore, Rig};

fn started_node(bus: MockBus, config: &NodeConfig, rig: &mut Rig) -> Node<MockBus> {
    let mut node = Node::new(config, bus, 0).unwrap();
    node.initialize(&mut rig.sink);
    rig.sink.clear();
    node
}

fn buffered(rig: &Rig) -> usize {
    rig.sink
        .count(|e| matches!(e, NodeEvent::SampleBuffered { .. }))
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn startup_registers_jobs_and_reports_sensors() {
    let mut rig = Rig::new();
    let mut node: Node<MockBus> = Node::new(&NodeConfig::default(), MockBus::board(), 0).unwrap();

    let report = node.initialize(&mut rig.sink);

    assert_eq!(report.capacitance.manufacturer, Some(0x5449));
    assert_eq!(report.environment, Ok(()));
    assert!(node.jobs().flush.is_none(), "storage is off by default");
    assert_eq!(node.scheduler().len(), 3);
    assert_eq!(rig.sink.events, vec![NodeEvent::Started { jobs: 3 }]);

    // Humidity control is written before measurement control.
    let writes = node.bus_mut().writes_to(bme280::ADDRESS);
    assert_eq!(
        writes,
        vec![(0xF2, vec![0x01]), (0xF4, vec![0x27]), (0xF5, vec![0x00])]
    );
}

#[test]
fn missing_environment_sensor_is_not_fatal() {
    let mut bus = MockBus::board();
    bus.set_failing(bme280::ADDRESS, true);
    let mut rig = Rig::new();
    let mut node: Node<MockBus> = Node::new(&NodeConfig::default(), bus, 0).unwrap();

    let report = node.initialize(&mut rig.sink);

    assert_eq!(
        report.environment,
        Err(SensorError::Read(BusError::Nack))
    );
    assert!(rig.sink.events.contains(&NodeEvent::SensorUnavailable {
        sensor: SensorKind::Environment,
        error: SensorError::Read(BusError::Nack),
    }));
    assert!(rig.sink.events.contains(&NodeEvent::Started { jobs: 3 }));
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let config = NodeConfig {
        sample_period_ms: 0,
        ..NodeConfig::default()
    };
    assert!(matches!(
        Node::<MockBus>::new(&config, MockBus::board(), 0),
        Err(Error::Config(_))
    ));
}

#[test]
fn job_table_overflow_is_a_startup_error() {
    let mut sched: Scheduler<2> = Scheduler::new();
    sched.register("a", 100, 0).unwrap();
    sched.register("b", 100, 0).unwrap();
    assert_eq!(sched.register("c", 100, 0), Err(Error::CapacityExceeded));
    assert_eq!(sched.len(), 2);
}

// ── Sampling cadence ──────────────────────────────────────────

#[test]
fn first_sample_fires_one_period_after_start() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    node.poll_once(999, &mut rig.ports());
    assert_eq!(buffered(&rig), 0);

    node.poll_once(1000, &mut rig.ports());
    assert_eq!(buffered(&rig), 1);
    assert_eq!(node.ring().peek().map(|s| s.timestamp_ms), Some(1000));

    node.poll_once(1999, &mut rig.ports());
    assert_eq!(buffered(&rig), 1, "no second sample before 2000");

    node.poll_once(2000, &mut rig.ports());
    assert_eq!(buffered(&rig), 2);
    assert_eq!(
        node.scheduler().next_due_ms(node.jobs().sample),
        Some(3000)
    );
}

#[test]
fn late_poll_keeps_cadence_anchored() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    // 37 ms of jitter does not shift the next deadline.
    node.poll_once(1037, &mut rig.ports());
    assert_eq!(
        node.scheduler().next_due_ms(node.jobs().sample),
        Some(2000)
    );
}

#[test]
fn stalled_loop_catches_up_one_run_per_poll() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    // Three sample periods elapse before the next poll.
    node.poll_once(3500, &mut rig.ports());
    assert_eq!(buffered(&rig), 1);
    node.poll_once(3500, &mut rig.ports());
    node.poll_once(3500, &mut rig.ports());
    assert_eq!(buffered(&rig), 3);
    node.poll_once(3500, &mut rig.ports());
    assert_eq!(buffered(&rig), 3, "caught up, next due at 4000");
}

#[test]
fn next_wake_tracks_earliest_deadline() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let node = started_node(MockBus::board(), &config, &mut rig);

    // publish (200 ms) is the earliest job.
    assert_eq!(node.next_wake_in(0), 200);
    assert_eq!(node.next_wake_in(150), 50);
    assert_eq!(node.next_wake_in(250), 0);
}

// ── Sample content ────────────────────────────────────────────

#[test]
fn sample_carries_both_sensors() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    node.poll_once(1000, &mut rig.ports());

    let s = *node.ring().peek().unwrap();
    assert_eq!(s.timestamp_ms, 1000);
    assert!((s.capacitance_pf[0] - 7.5).abs() < 1e-5);
    assert!((s.capacitance_pf[1] + 7.5).abs() < 1e-5);
    assert_eq!(s.capacitance_pf[2], 0.0);
    assert!((s.capacitance_pf[3] - 15.0).abs() < 1e-3);
    assert!((s.temperature_c - 25.08).abs() < 1e-4);
    assert!((s.pressure_hpa - 1006.53).abs() < 1e-2);
    assert!((s.humidity_pct - 55.0).abs() < 1e-2);
    assert_eq!(s.flags, 0);
    assert!(!s.is_saturated());

    // Sensing indicator pulsed exactly once around the reads.
    assert_eq!(rig.sensing.levels, vec![true, false]);
}

#[test]
fn capacitance_failure_still_buffers_a_sample() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);
    node.bus_mut().set_failing(fdc1004::ADDRESS, true);

    node.poll_once(1000, &mut rig.ports());

    let report = node.last_cycle().unwrap();
    assert_eq!(
        report.capacitance,
        Err(SensorError::Read(BusError::Nack))
    );
    assert!(report.environment.is_ok());
    assert!(report.pushed);

    let s = node.ring().peek().unwrap();
    assert_eq!(s.capacitance_pf, [0.0; 4]);
    assert!((s.temperature_c - 25.08).abs() < 1e-4);
    assert!(rig.sink.events.contains(&NodeEvent::ReadDegraded {
        sensor: SensorKind::Capacitance,
        error: SensorError::Read(BusError::Nack),
        timestamp_ms: 1000,
    }));
    assert_eq!(rig.sensing.levels, vec![true, false]);
}

#[test]
fn environment_failure_leaves_zeros() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);
    node.bus_mut().set_failing(bme280::ADDRESS, true);

    node.poll_once(1000, &mut rig.ports());

    let s = node.ring().peek().unwrap();
    assert!((s.capacitance_pf[0] - 7.5).abs() < 1e-5);
    assert_eq!(s.temperature_c, 0.0);
    assert_eq!(s.humidity_pct, 0.0);
    assert_eq!(s.pressure_hpa, 0.0);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            NodeEvent::ReadDegraded {
                sensor: SensorKind::Environment,
                ..
            }
        )),
        1
    );
}

#[test]
fn uninitialized_environment_sensor_degrades_every_cycle() {
    let config = NodeConfig::default();
    let mut bus = MockBus::board();
    bus.set_failing(bme280::ADDRESS, true);
    let mut rig = Rig::new();
    let mut node = started_node(bus, &config, &mut rig);
    // Device comes back, but was never initialized.
    node.bus_mut().set_failing(bme280::ADDRESS, false);

    node.poll_once(1000, &mut rig.ports());

    let report = node.last_cycle().unwrap();
    assert_eq!(report.environment, Err(SensorError::NotInitialized));
    assert_eq!(report.sample.temperature_c, 0.0);
    assert_eq!(node.bus_mut().reads_of(bme280::ADDRESS, 0xF7), 0);
}

// ── Ring overflow ─────────────────────────────────────────────

#[test]
fn full_ring_drops_newest() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    for t in 0..64 {
        assert!(node.ring_mut().push(Sample::at(t)));
    }

    node.poll_once(1000, &mut rig.ports());

    assert_eq!(node.ring().len(), 64);
    assert_eq!(node.ring().peek().map(|s| s.timestamp_ms), Some(0));
    assert!(!node.last_cycle().unwrap().pushed);
    assert!(rig.sink.events.contains(&NodeEvent::SampleDropped {
        timestamp_ms: 1000,
        pending: 64,
    }));
}

// ── Publish drain ─────────────────────────────────────────────

#[test]
fn publish_waits_for_connection() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);
    node.ring_mut().push(Sample::at(1));

    node.poll_once(200, &mut rig.ports());
    assert!(rig.publisher.sent.is_empty());
    assert_eq!(node.ring().len(), 1);

    rig.publisher.connected = true;
    node.poll_once(400, &mut rig.ports());
    assert_eq!(rig.publisher.sent, vec![Sample::at(1)]);
    assert!(node.ring().is_empty());
    assert!(rig.sink.events.contains(&NodeEvent::Published {
        count: 1,
        pending: 0,
    }));
}

#[test]
fn publish_backpressure_keeps_head_in_ring() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    rig.publisher = MockPublisher::connected(2);
    let mut node = started_node(MockBus::board(), &config, &mut rig);
    for t in 1..=5 {
        node.ring_mut().push(Sample::at(t));
    }

    node.poll_once(200, &mut rig.ports());

    let sent: Vec<u64> = rig.publisher.sent.iter().map(|s| s.timestamp_ms).collect();
    assert_eq!(sent, vec![1, 2]);
    assert_eq!(node.ring().len(), 3);
    assert_eq!(node.ring().peek().map(|s| s.timestamp_ms), Some(3));
    assert!(rig
        .sink
        .events
        .contains(&NodeEvent::PublishBackpressure { pending: 3 }));
}

// ── Flush to storage ──────────────────────────────────────────

fn storage_config() -> NodeConfig {
    NodeConfig {
        storage_enabled: true,
        ..NodeConfig::default()
    }
}

#[test]
fn flush_writes_postcard_records_under_indicator() {
    let config = storage_config();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);
    assert!(node.jobs().flush.is_some());

    let mut s = Sample::at(42);
    s.capacitance_pf = [1.0, 2.0, 3.0, 4.0];
    s.temperature_c = 21.5;
    node.records_mut().push(s);
    node.records_mut().push(Sample::at(43));

    node.poll_once(5000, &mut rig.ports());

    assert_eq!(rig.writing.levels, vec![true, false]);
    // The sample job ran first at 5000, so its sample is flushed last.
    assert_eq!(rig.store.records.len(), 3);
    let first: Sample = postcard::from_bytes(&rig.store.records[0]).unwrap();
    let second: Sample = postcard::from_bytes(&rig.store.records[1]).unwrap();
    let third: Sample = postcard::from_bytes(&rig.store.records[2]).unwrap();
    assert_eq!(first, s);
    assert_eq!(second.timestamp_ms, 43);
    assert_eq!(third.timestamp_ms, 5000);
    assert!(node.records().is_empty());
    assert_eq!(rig.sink.count(|e| matches!(e, NodeEvent::Flushed { .. })), 1);
}

#[test]
fn store_receives_every_sample_while_publishing() {
    let config = storage_config();
    let clock = ManualClock::at(0);
    let mut rig = Rig::new();
    rig.publisher = MockPublisher::connected(usize::MAX);
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    while clock.now_ms() < 60_000 {
        clock.advance(1);
        node.poll_once(clock.now_ms(), &mut rig.ports());
    }

    assert_eq!(rig.publisher.sent.len(), 60);
    assert_eq!(rig.store.records.len(), 60);
    let stored: Vec<Sample> = rig
        .store
        .records
        .iter()
        .map(|r| postcard::from_bytes(r).unwrap())
        .collect();
    assert_eq!(stored, rig.publisher.sent);
    assert!(node.ring().is_empty());
    assert!(node.records().is_empty());
}

#[test]
fn store_failure_keeps_remaining_samples() {
    let config = storage_config();
    let mut rig = Rig::new();
    rig.store = MockStore::failing_after(1, StoreError::Full);
    let mut node = started_node(MockBus::board(), &config, &mut rig);
    for t in 1..=3 {
        node.records_mut().push(Sample::at(t));
    }

    let flush = node.jobs().flush.unwrap();
    let due = node.scheduler().next_due_ms(flush).unwrap();
    node.poll_once(due, &mut rig.ports());

    // 1 written; 2, 3 and the sample taken at `due` are kept.
    assert_eq!(rig.store.records.len(), 1);
    assert_eq!(node.records().len(), 3);
    assert!(rig.sink.events.contains(&NodeEvent::StoreFailed {
        error: StoreError::Full,
        pending: 3,
    }));
    assert_eq!(node.records().peek().map(|s| s.timestamp_ms), Some(2));
    assert!(!rig.writing.is_active(), "indicator released after failure");
}

#[test]
fn flush_on_empty_backlog_leaves_indicator_alone() {
    // Flush comes due before the first sample exists.
    let config = NodeConfig {
        flush_period_ms: 500,
        ..storage_config()
    };
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    node.poll_once(500, &mut rig.ports());

    assert!(rig.store.records.is_empty());
    assert!(rig.writing.levels.is_empty());
}

#[test]
fn full_backlog_drops_newest_record_only() {
    let config = storage_config();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);
    for t in 0..64 {
        assert!(node.records_mut().push(Sample::at(t)));
    }

    node.poll_once(1000, &mut rig.ports());

    assert_eq!(node.records().len(), 64);
    assert_eq!(node.records().peek().map(|s| s.timestamp_ms), Some(0));
    assert!(rig.sink.events.contains(&NodeEvent::RecordDropped {
        timestamp_ms: 1000,
        pending: 64,
    }));
    // The publish path is unaffected.
    assert_eq!(node.ring().peek().map(|s| s.timestamp_ms), Some(1000));
}

#[test]
fn storage_disabled_keeps_no_backlog() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    node.poll_once(1000, &mut rig.ports());

    assert_eq!(node.ring().len(), 1);
    assert!(node.records().is_empty());
}

// ── Link report ───────────────────────────────────────────────

#[test]
fn link_report_every_ten_seconds() {
    let config = NodeConfig::default();
    let mut rig = Rig::new();
    rig.link.rssi_dbm = Some(-58);
    let mut node = started_node(MockBus::board(), &config, &mut rig);

    node.poll_once(9_999, &mut rig.ports());
    assert_eq!(rig.sink.count(|e| matches!(e, NodeEvent::Link { .. })), 0);

    node.poll_once(10_000, &mut rig.ports());
    assert!(rig.sink.events.contains(&NodeEvent::Link {
        connected: true,
        rssi_dbm: Some(-58),
    }));
}
