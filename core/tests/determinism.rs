//! Replay guarantees.
//!
//! Two colonies with the same seed and the same player actions must
//! write byte-identical event logs and snapshots. A divergence here
//! means some state escaped the RngBank or the snapshot.

use capys_core::{
    engine::SimEngine,
    store::SimStore,
};

fn build_engine(seed: u64) -> SimEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = SimStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    let mut engine = SimEngine::build_test(format!("det-test-{seed}"), seed);
    engine.attach_store(store).expect("attach store");
    engine
}

fn collect_event_log(engine: &SimEngine) -> Vec<String> {
    // Collect all event payloads in tick+id order.
    (0..=engine.clock.current_tick)
        .flat_map(|tick| {
            engine.store_events_for_tick(tick)
                .expect("read events")
                .into_iter()
                .map(|e| e.payload)
        })
        .collect()
}

fn weather_log(engine: &SimEngine) -> Vec<String> {
    (0..=engine.clock.current_tick)
        .flat_map(|tick| engine.store_events_for_tick(tick).expect("read events"))
        .filter(|e| e.event_type == "weather_changed")
        .map(|e| e.payload)
        .collect()
}

fn frozen_json(engine: &SimEngine) -> String {
    let mut snapshot = engine.snapshot();
    snapshot.timestamp = 0;
    snapshot.to_json().expect("serialize")
}

fn play(engine: &mut SimEngine) {
    assert!(engine.assign_job("grazer"));
    engine.run_ticks(200);
    for _ in 0..15 {
        engine.gather("reeds");
    }
    assert!(engine.build("reed_shelter"));
    assert!(engine.assign_job("gatherer"));
    engine.run_ticks(2800);
}

#[test]
fn same_seed_produces_identical_event_logs() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;

    let mut engine_a = build_engine(SEED);
    let mut engine_b = build_engine(SEED);

    play(&mut engine_a);
    play(&mut engine_b);

    let log_a = collect_event_log(&engine_a);
    let log_b = collect_event_log(&engine_b);

    assert_eq!(
        log_a.len(), log_b.len(),
        "Event log lengths differ: {} vs {}",
        log_a.len(), log_b.len()
    );

    for (i, (a, b)) in log_a.iter().zip(log_b.iter()).enumerate() {
        assert_eq!(
            a, b,
            "Event log diverged at entry {i}:\n  A: {a}\n  B: {b}"
        );
    }
}

#[test]
fn same_seed_produces_identical_snapshots() {
    let mut engine_a = SimEngine::build_test("det-snap".into(), 7);
    let mut engine_b = SimEngine::build_test("det-snap".into(), 7);

    play(&mut engine_a);
    play(&mut engine_b);

    assert_eq!(frozen_json(&engine_a), frozen_json(&engine_b));
}

#[test]
fn different_seeds_produce_different_weather() {
    let mut engine_a = build_engine(42);
    let mut engine_b = build_engine(99);

    // Ten weather rolls plus one season roll.
    engine_a.run_ticks(12_000);
    engine_b.run_ticks(12_000);

    let log_a = weather_log(&engine_a);
    let log_b = weather_log(&engine_b);
    assert_ne!(log_a, log_b, "Different seeds produced identical weather; the seed is ignored");
}
