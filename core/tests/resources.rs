//! Resource ledger: capacity clamping, atomic spending, per-tick rates.

use capys_core::{
    config::{BuildingCategory, ColonyConfig, ResourceCategory},
    engine::SimEngine,
    productivity::RateSheet,
    resource_subsystem::ResourceLedger,
    types::CostMap,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn cost(entries: &[(&str, f64)]) -> CostMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn idle_colony_eats_grass_each_tick() {
    let mut engine = SimEngine::build_test("res-idle".into(), 1);
    assert!(approx(engine.resources().get("grass"), 10.0));
    assert!(approx(engine.resources().consumption("grass"), 0.1));
    assert!(approx(engine.resources().production("grass"), 0.0));

    engine.tick();

    let grass = engine.resources().get("grass");
    assert!(approx(grass, 9.9), "Expected 9.9 grass after one tick, got {grass}");
}

#[test]
fn add_clamps_to_capacity_and_reports_applied_delta() {
    let config = ColonyConfig::standard();
    let mut ledger = ResourceLedger::new(&config);

    assert!(approx(ledger.capacity("grass"), 100.0));
    let applied = ledger.add("grass", 95.0);
    assert!(approx(applied, 90.0), "Only 90 fits on top of 10, got {applied}");
    assert!(approx(ledger.get("grass"), 100.0));

    assert_eq!(ledger.add("grass", 5.0), 0.0, "Full stock accepts nothing");
    assert_eq!(ledger.add("grass", -5.0), 0.0, "Negative adds are rejected");
    assert_eq!(ledger.add("moonstone", 5.0), 0.0, "Unknown ids are neutral");
}

#[test]
fn remove_never_goes_below_zero() {
    let config = ColonyConfig::standard();
    let mut ledger = ResourceLedger::new(&config);

    let removed = ledger.remove("grass", 25.0);
    assert!(approx(removed, 10.0));
    assert_eq!(ledger.get("grass"), 0.0);
    assert_eq!(ledger.remove("reeds", 1.0), 0.0);
}

#[test]
fn spend_is_all_or_nothing() {
    let config = ColonyConfig::standard();
    let mut ledger = ResourceLedger::new(&config);
    ledger.set("reeds", 20.0);

    // Enough reeds, not enough grass: nothing moves.
    let too_much = cost(&[("grass", 50.0), ("reeds", 5.0)]);
    assert!(!ledger.spend(&too_much));
    assert!(approx(ledger.get("grass"), 10.0));
    assert!(approx(ledger.get("reeds"), 20.0));

    let fine = cost(&[("grass", 4.0), ("reeds", 5.0)]);
    assert!(ledger.spend(&fine));
    assert!(approx(ledger.get("grass"), 6.0));
    assert!(approx(ledger.get("reeds"), 15.0));
}

#[test]
fn shrinking_capacity_clamps_existing_stock() {
    let config = ColonyConfig::standard();
    let mut ledger = ResourceLedger::new(&config);
    ledger.set("grass", 100.0);

    ledger.set_storage_multiplier(0.5);
    assert!(approx(ledger.capacity("grass"), 50.0));
    assert!(approx(ledger.get("grass"), 50.0));

    ledger.add_capacity("grass", -20.0);
    assert!(approx(ledger.capacity("grass"), 40.0));
    assert!(approx(ledger.get("grass"), 40.0));
}

#[test]
fn effective_capacity_is_floored() {
    let config = ColonyConfig::standard();
    let mut ledger = ResourceLedger::new(&config);
    ledger.set_storage_multiplier(1.255);
    // 50 × 1.255 = 62.75
    assert!(approx(ledger.capacity("reeds"), 62.0));
}

#[test]
fn tick_keeps_stocks_within_bounds() {
    let config = ColonyConfig::standard();
    let mut ledger = ResourceLedger::new(&config);
    let mut sheet = RateSheet::default();
    sheet.production.insert("grass".into(), 7.5);
    sheet.consumption.insert("reeds".into(), 3.0);
    ledger.install_rates(&sheet);

    for _ in 0..50 {
        ledger.tick();
        for id in ledger.ids() {
            let amount = ledger.get(id);
            assert!(amount >= 0.0 && amount <= ledger.capacity(id),
                "{id} out of range: {amount}");
        }
    }
    assert!(approx(ledger.get("grass"), 100.0));
    assert_eq!(ledger.get("reeds"), 0.0);
    assert!(approx(ledger.net_rate("grass"), 7.5));
}

#[test]
fn unlocking_reveals_a_resource_once() {
    let config = ColonyConfig::standard();
    let mut ledger = ResourceLedger::new(&config);

    assert!(ledger.is_visible("grass"));
    assert!(!ledger.is_visible("clay"));
    assert!(ledger.unlock("clay"));
    assert!(!ledger.unlock("clay"));
    assert!(!ledger.unlock("moonstone"));

    let rows = ledger.visible_rows(&config);
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["grass", "reeds", "clay"]);
}

#[test]
fn special_categories_stay_distinct() {
    let config = ColonyConfig::standard();
    config.validate().expect("standard catalog is valid");
    assert_eq!(config.resource("science").expect("science").category, ResourceCategory::Special);
    assert_eq!(config.resource("grass").expect("grass").category, ResourceCategory::Primary);
    assert_eq!(config.building("natural_spring").expect("spring").category, BuildingCategory::Special);
    assert_eq!(config.building("clay_pit").expect("clay pit").category, BuildingCategory::Production);
}
