//! Prestige: legacy scoring, upgrade latches, migration resets.

use capys_core::{
    config::ColonyConfig,
    engine::SimEngine,
    event::SimEvent,
    prestige_subsystem::{LegacyInputs, PrestigeLedger},
    subsystem::BuildingCensus,
};
use serde_json::Value;

struct Census(Vec<&'static str>);

impl BuildingCensus for Census {
    fn count(&self, id: &str) -> u32 {
        self.0.iter().filter(|b| **b == id).count() as u32
    }
}

fn sample_inputs() -> LegacyInputs {
    LegacyInputs {
        population:          37,
        building_count:      12,
        researched_count:    3,
        encountered_species: 2,
    }
}

/// Round-trip the engine through an edited snapshot document.
fn edit_prestige(engine: &mut SimEngine, edit: impl FnOnce(&mut Value)) {
    let json = engine.to_json().expect("serialize");
    let mut doc: Value = serde_json::from_str(&json).expect("parse");
    edit(&mut doc["prestige"]);
    engine.import_json(&doc.to_string()).expect("edited snapshot imports");
}

#[test]
fn legacy_points_follow_the_formula() {
    let config = ColonyConfig::standard();
    let ledger = PrestigeLedger::new(&config);
    let points = ledger.calculate_legacy_points(&config, &sample_inputs(), &Census(vec![]));

    // 3 + 2 + 6 + 6
    assert_eq!(points.total, 17);
    let names: Vec<&str> = points.breakdown.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Population", "Buildings", "Research", "Visitors"]);
}

#[test]
fn milestone_buildings_add_flat_awards() {
    let config = ColonyConfig::standard();
    let ledger = PrestigeLedger::new(&config);
    let points = ledger.calculate_legacy_points(&config, &sample_inputs(), &Census(vec!["grand_onsen"]));
    assert_eq!(points.total, 27);
    assert!(points.breakdown.iter().any(|l| l.name == "Grand Onsen" && l.value == 10));
}

#[test]
fn zero_lines_are_omitted() {
    let config = ColonyConfig::standard();
    let ledger = PrestigeLedger::new(&config);
    let tiny = LegacyInputs {
        population:          9,
        building_count:      4,
        researched_count:    0,
        encountered_species: 0,
    };
    let points = ledger.calculate_legacy_points(&config, &tiny, &Census(vec![]));
    assert_eq!(points.total, 0);
    assert!(points.breakdown.is_empty());
}

#[test]
fn upgrades_are_paid_once() {
    let config = ColonyConfig::standard();
    let mut ledger = PrestigeLedger::new(&config);
    assert!(!ledger.purchase_upgrade(&config, "inherited_tools"), "No points yet");

    ledger.bank(100);
    assert!(ledger.purchase_upgrade(&config, "inherited_tools"));
    assert_eq!(ledger.legacy_points(), 85);
    assert_eq!(ledger.bonuses().gathering_bonus, 0.25);

    assert!(!ledger.purchase_upgrade(&config, "inherited_tools"), "Latched");
    assert_eq!(ledger.legacy_points(), 85);
    assert!(!ledger.purchase_upgrade(&config, "time_travel"));
}

#[test]
fn banking_counts_migrations_and_clears_the_unlock() {
    let config = ColonyConfig::standard();
    let mut ledger = PrestigeLedger::new(&config);
    assert!(ledger.unlock_migration());
    assert!(!ledger.unlock_migration(), "Already unlocked this run");

    ledger.bank(12);
    assert_eq!(ledger.migration_count(), 1);
    assert!(!ledger.is_migration_unlocked());

    let points = ledger.calculate_legacy_points(&config, &sample_inputs(), &Census(vec![]));
    assert_eq!(points.total, 19, "Previous migrations score 2 each");
    let veteran = points
        .breakdown
        .iter()
        .find(|l| l.name == "Veteran Migrators")
        .expect("migration line");
    assert_eq!(veteran.value, 2);
    assert_eq!(veteran.detail, "1 previous migrations");
}

#[test]
fn start_state_upgrades_replace_defaults() {
    let config = ColonyConfig::standard();
    let mut ledger = PrestigeLedger::new(&config);
    assert_eq!(ledger.bonuses().start_warmth, config.prestige.default_start_warmth);

    ledger.bank(200);
    assert!(ledger.purchase_upgrade(&config, "warmth_memory"));
    assert!(ledger.purchase_upgrade(&config, "master_builders"));
    assert_eq!(ledger.bonuses().start_warmth, 0.75);
    assert_eq!(ledger.bonuses().building_discount, 0.2);
}

#[test]
fn migration_requires_the_unlock() {
    let mut engine = SimEngine::build_test("mig-locked".into(), 3);
    engine.run_ticks(50);
    assert_eq!(engine.migrate(), None);
    assert_eq!(engine.prestige().migration_count(), 0);
}

#[test]
fn migration_resets_the_run_but_keeps_prestige() {
    let mut engine = SimEngine::build_test("mig-reset".into(), 3);
    assert!(engine.assign_job("grazer"));
    for _ in 0..15 {
        engine.gather("reeds");
    }
    assert!(engine.build("reed_shelter"));
    engine.run_ticks(300);
    edit_prestige(&mut engine, |p| p["migration_unlocked"] = Value::Bool(true));

    let expected = engine.legacy_points().total;
    let earned = engine.migrate().expect("unlocked");
    assert_eq!(earned, expected);
    assert_eq!(engine.prestige().legacy_points(), earned);
    assert_eq!(engine.prestige().migration_count(), 1);
    assert!(!engine.prestige().is_migration_unlocked());

    let fresh = SimEngine::build_test("mig-fresh".into(), 3);
    assert_eq!(engine.buildings(), fresh.buildings());
    assert_eq!(engine.research_tree(), fresh.research_tree());
    assert_eq!(engine.visitors(), fresh.visitors());
    assert_eq!(engine.hot_springs(), fresh.hot_springs());
    assert_eq!(engine.workforce().adults(), fresh.workforce().adults());
    assert_eq!(engine.workforce().assigned(), 0);
    assert_eq!(engine.resources().get("reeds"), fresh.resources().get("reeds"));
    assert_eq!(engine.seasons().day(), 1);

    assert!(engine
        .recent_events()
        .any(|e| matches!(e, SimEvent::Migrated { migration_count: 1, .. })));
}

#[test]
fn purchased_upgrades_shape_the_next_run() {
    let mut engine = SimEngine::build_test("mig-upgrades".into(), 3);
    edit_prestige(&mut engine, |p| {
        p["legacy_points"] = Value::from(105u64);
        p["migration_unlocked"] = Value::Bool(true);
    });

    assert!(engine.purchase_upgrade("larger_family"));
    assert!(engine.purchase_upgrade("warmth_memory"));
    assert!(engine.purchase_upgrade("bountiful_start"));
    assert!(!engine.purchase_upgrade("master_builders"), "Out of points");
    assert_eq!(engine.prestige().legacy_points(), 0);

    engine.migrate().expect("unlocked");
    assert_eq!(engine.workforce().adults(), 4);
    assert_eq!(engine.hot_springs().warmth(), 75.0);
    assert_eq!(engine.resources().get("grass"), 50.0);
    assert_eq!(engine.resources().get("reeds"), 50.0);
}

#[test]
fn migrate_command_reports_rejection() {
    let mut engine = SimEngine::build_test("mig-cmd".into(), 3);
    assert!(!engine.apply_command(capys_core::command::PlayerCommand::Migrate));
    assert!(engine.recent_events().any(|e| matches!(
        e,
        SimEvent::PlayerCommandReceived { accepted: false, .. }
    )));
}
