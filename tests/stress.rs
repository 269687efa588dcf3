//! Stress tests for dirigera-metrics
//!
//! Run with: cargo test --release stress -- --ignored

mod common;

use std::sync::Arc;
use std::time::Instant;

use common::{named, state_changed, MockHub, RecordingSink};
use dirigera_metrics::*;

#[test]
#[ignore] // Run manually with --ignored
fn stress_test_event_dispatch() {
    let sink = Arc::new(RecordingSink::default());
    let mut engine = DispatchEngine::new(
        HubIdentity::new("hub", "Home"),
        Arc::new(MockHub::new(vec![])),
        CategoryRegistry::with_defaults(),
        sink.clone(),
    );

    let devices: Vec<_> = (0..200)
        .map(|i| named(&format!("plug{}_1", i), "outlet", "outlet", "Plug", "Office"))
        .collect();
    engine.load(&devices);

    let iterations = 1_000_000;
    let start = Instant::now();

    for i in 0..iterations {
        let data = DeviceSnapshot::new(format!("plug{}_1", i % 200), "", "")
            .with_attribute("currentActivePower", (i % 3000) as f64)
            .with_attribute("isOn", i % 2 == 0);
        engine.handle_event(&state_changed(data));
    }

    let elapsed = start.elapsed();
    let rate = iterations as f64 / elapsed.as_secs_f64();

    println!("Dispatched {} events in {:?}", iterations, elapsed);
    println!("Rate: {:.0} events/second", rate);

    assert_eq!(engine.cache().len(), 200);
    assert!(
        rate > 100_000.0,
        "Should dispatch at least 100k events/s, got {:.0}",
        rate
    );
}

#[test]
#[ignore]
fn stress_test_cold_cache_siblings() {
    let primaries: Vec<_> = (0..1000)
        .map(|i| named(&format!("unit{}_1", i), "outlet", "outlet", "Control unit", "Garage"))
        .collect();
    let hub = Arc::new(MockHub::new(primaries));
    let mut engine = DispatchEngine::new(
        HubIdentity::new("hub", "Home"),
        hub.clone(),
        CategoryRegistry::with_defaults(),
        Arc::new(RecordingSink::default()),
    );

    let start = Instant::now();
    for round in 0..100 {
        for i in 0..1000 {
            let sibling = DeviceSnapshot::new(format!("unit{}_{}", i, 2 + round % 3), "outlet", "outlet")
                .with_attribute("isOn", true);
            engine.handle(&sibling, None);
        }
    }
    let elapsed = start.elapsed();

    println!("Resolved 100000 sibling snapshots in {:?}", elapsed);

    // One read-through per device, never more
    assert_eq!(hub.fetch_count(), 1000);
    assert_eq!(engine.stats().snapshot().updated, 100_000);
}
