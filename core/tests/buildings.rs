//! Building registry: cost growth, unlock latches, effects.

use capys_core::{
    building_subsystem::BuildingRegistry,
    config::{ColonyConfig, Feature},
    engine::SimEngine,
    event::SimEvent,
    workforce_subsystem::building_key,
};

/// Standard catalog with every stock full at start.
fn stocked_config() -> ColonyConfig {
    let mut config = ColonyConfig::standard();
    for res in &mut config.resources {
        res.initial_amount = res.base_capacity;
    }
    config
}

fn stocked_engine(run_id: &str) -> SimEngine {
    SimEngine::with_config(run_id.into(), 11, stocked_config()).expect("valid config")
}

#[test]
fn cost_grows_geometrically_and_rounds_up() {
    let mut engine = stocked_engine("bld-cost");

    assert_eq!(engine.building_cost("clay_pit")["reeds"], 15.0);
    assert!(engine.build("clay_pit"));
    // 15 × 1.2 = 18
    assert_eq!(engine.building_cost("clay_pit")["reeds"], 18.0);
    assert!(engine.build("clay_pit"));
    // 15 × 1.44 = 21.6 → 22
    assert_eq!(engine.building_cost("clay_pit")["reeds"], 22.0);
}

#[test]
fn discount_applies_after_rounding() {
    let config = ColonyConfig::standard();
    let registry = BuildingRegistry::new(&config);
    // ceil(15) = 15, then ceil(15 × 0.8) = 12
    assert_eq!(registry.cost(&config, "clay_pit", 0.2)["reeds"], 12.0);
    // ceil(10 × 0.8) = 8
    assert_eq!(registry.cost(&config, "reed_bundle", 0.2)["grass"], 8.0);
}

#[test]
fn failed_build_mutates_nothing() {
    let mut engine = SimEngine::build_test("bld-poor".into(), 11);
    let before = engine.resources().clone();

    assert!(!engine.build("clay_pit"), "No reeds yet");
    assert!(!engine.build("woven_lodge"), "Prerequisite not met");
    assert!(!engine.build("natural_spring"), "Discoverable buildings are not for sale");
    assert!(!engine.build("moon_palace"), "Unknown building");

    assert_eq!(engine.resources(), &before);
    assert_eq!(engine.buildings().total_count(), 0);
}

#[test]
fn prerequisite_unlock_is_a_permanent_latch() {
    let mut engine = stocked_engine("bld-latch");
    assert!(!engine.buildings().is_latched("woven_lodge"));

    assert!(engine.build("clay_pit"));
    assert!(engine.buildings().is_latched("woven_lodge"));
    assert!(engine.can_build("woven_lodge"));
}

#[test]
fn clay_pit_unlocks_clay_and_diggers() {
    let mut engine = stocked_engine("bld-unlock");
    assert!(!engine.resources().is_visible("clay"));
    assert!(!engine.workforce().is_job_unlocked("digger"));

    assert!(engine.build("clay_pit"));

    assert!(engine.resources().is_visible("clay"));
    assert!(engine.workforce().is_job_unlocked("digger"));
    assert_eq!(engine.resources().capacity("clay"), 80.0);
    assert!(engine.assign_job("digger"));

    let unlocked: Vec<&SimEvent> = engine
        .recent_events()
        .filter(|e| matches!(e, SimEvent::ResourceUnlocked { .. } | SimEvent::JobUnlocked { .. }))
        .collect();
    assert_eq!(unlocked.len(), 2);
}

#[test]
fn max_count_caps_construction() {
    let mut engine = stocked_engine("bld-max");
    for _ in 0..10 {
        assert!(engine.build("grass_pile"));
    }
    assert_eq!(engine.buildings().count("grass_pile"), 10);
    assert!(!engine.build("grass_pile"));
    assert!(!engine.can_build("grass_pile"));
}

#[test]
fn housing_scales_with_count_but_happiness_does_not() {
    let mut engine = stocked_engine("bld-lodge");
    assert_eq!(engine.workforce().max_population(), 4);
    assert!(engine.build("clay_pit"));

    assert!(engine.build("woven_lodge"));
    assert_eq!(engine.workforce().max_population(), 9);
    let key = building_key("woven_lodge");
    assert_eq!(engine.workforce().happiness_bonuses().get(&key), Some(&2.0));

    for _ in 0..10 {
        engine.gather("reeds");
    }
    assert!(engine.build("woven_lodge"));
    assert_eq!(engine.workforce().max_population(), 14);
    assert_eq!(engine.workforce().happiness_bonuses().get(&key), Some(&2.0),
        "Happiness is keyed per building type");
}

#[test]
fn shelters_add_housing() {
    let mut engine = stocked_engine("bld-shelter");
    assert!(engine.build("reed_shelter"));
    assert!(engine.build("reed_shelter"));
    assert_eq!(engine.workforce().max_population(), 8);
}

#[test]
fn features_start_off() {
    let engine = stocked_engine("bld-features");
    assert!(!engine.has_feature(Feature::Research));
    assert!(!engine.has_feature(Feature::Migration));
    assert!(!engine.prestige().is_migration_unlocked());
}

#[test]
fn listings_sort_unlocked_first() {
    let mut engine = stocked_engine("bld-list");
    assert!(engine.build("clay_pit"));
    let rows = engine.building_listings();

    let first_locked = rows.iter().position(|r| !r.unlocked).unwrap_or(rows.len());
    assert!(rows[first_locked..].iter().all(|r| !r.unlocked));
    let clay_pit = rows.iter().find(|r| r.id == "clay_pit").expect("listed");
    assert_eq!(clay_pit.count, 1);
    assert_eq!(clay_pit.cost["reeds"], 18.0);
}

#[test]
fn natural_spring_stays_hidden_until_discovered() {
    let mut engine = stocked_engine("bld-spring-hidden");
    assert!(engine.build("clay_pit"));
    assert!(engine.build("reed_shelter"));

    assert!(!engine.buildings().is_latched("natural_spring"));
    assert!(!engine.buildings().is_available(engine.config(), "natural_spring"));
    assert_eq!(engine.buildings().count("natural_spring"), 0);
    assert!(engine.building_listings().iter().all(|row| row.id != "natural_spring"));
}

#[test]
fn buildings_without_requirements_do_not_self_unlock() {
    let config = ColonyConfig::standard();
    let mut registry = BuildingRegistry::new(&config);
    assert!(!registry.prerequisites_met(&config, "natural_spring"));
    assert!(!registry.refresh_unlocks(&config).contains(&"natural_spring".to_string()));
    assert!(registry.is_latched("clay_pit"), "Starters are latched from the outset");
}
