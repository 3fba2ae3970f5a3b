//! Workforce: job assignment bounds, happiness terms, growth.

use capys_core::{
    config::ColonyConfig,
    engine::SimEngine,
    rng::SubsystemRng,
    workforce_subsystem::{HappinessInputs, WorkforceAllocator, SEASON_KEY},
};

fn inputs() -> HappinessInputs {
    HappinessInputs {
        base:              50.0,
        food_stock:        10.0,
        warmth_percent:    50.0,
        visitor_happiness: 0.0,
        extra_happiness:   0.0,
    }
}

#[test]
fn assignments_never_exceed_adults() {
    let mut engine = SimEngine::build_test("wf-assign".into(), 8);
    assert!(engine.assign_job("grazer"));
    assert!(engine.assign_job("gatherer"));
    assert!(!engine.assign_job("grazer"), "Nobody left idle");
    assert_eq!(engine.workforce().idle(), 0);
    assert_eq!(engine.workforce().assigned(), 2);

    assert!(engine.unassign_job("gatherer"));
    assert!(!engine.unassign_job("gatherer"), "Nobody left to remove");
    assert_eq!(engine.workforce().idle(), 1);
}

#[test]
fn locked_and_unknown_jobs_reject_workers() {
    let mut engine = SimEngine::build_test("wf-locked".into(), 8);
    assert!(!engine.assign_job("digger"));
    assert!(!engine.assign_job("astronaut"));
    assert_eq!(engine.workforce().assigned(), 0);
}

#[test]
fn job_rows_list_unlocked_jobs_in_catalog_order() {
    let mut engine = SimEngine::build_test("wf-rows".into(), 8);
    assert!(engine.assign_job("gatherer"));
    let rows = engine.job_rows();
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["grazer", "gatherer"]);
    assert_eq!(rows[1].workers, 1);
}

#[test]
fn fresh_colony_is_content() {
    let engine = SimEngine::build_test("wf-base".into(), 8);
    assert_eq!(engine.current_happiness(), 50.0);
    let factors = engine.happiness_factors();
    assert_eq!(factors[0].source, "base");
    assert_eq!(factors[0].value, 50.0);
}

#[test]
fn warmth_terms_step_every_ten_points() {
    let config = ColonyConfig::standard();
    let workforce = WorkforceAllocator::new(&config, 2);

    let warm = HappinessInputs { warmth_percent: 100.0, ..inputs() };
    let outcome = workforce.compute_happiness(&config, &warm);
    assert_eq!(outcome.bonuses.get("warmth"), Some(&6.0));
    assert_eq!(outcome.value, 56.0);

    let mild = HappinessInputs { warmth_percent: 79.0, ..inputs() };
    assert_eq!(workforce.compute_happiness(&config, &mild).value, 50.0);

    let cold = HappinessInputs { warmth_percent: 0.0, ..inputs() };
    let outcome = workforce.compute_happiness(&config, &cold);
    assert_eq!(outcome.penalties.get("cold"), Some(&9.0));
    assert_eq!(outcome.value, 41.0);
}

#[test]
fn food_shortage_and_overcrowding_are_penalised() {
    let config = ColonyConfig::standard();
    let mut workforce = WorkforceAllocator::new(&config, 2);

    // Buffer is 2 × 2 = 4; 1 in stock → floor(3 / 2) = 1 unit short.
    let hungry = HappinessInputs { food_stock: 1.0, ..inputs() };
    let outcome = workforce.compute_happiness(&config, &hungry);
    assert_eq!(outcome.penalties.get("food_shortage"), Some(&3.0));

    workforce.set_max_population(1);
    let outcome = workforce.compute_happiness(&config, &inputs());
    assert_eq!(outcome.penalties.get("overcrowding"), Some(&5.0));
    assert_eq!(outcome.value, 45.0);
}

#[test]
fn visitor_terms_are_dynamic_and_never_double_count() {
    let config = ColonyConfig::standard();
    let mut workforce = WorkforceAllocator::new(&config, 2);
    let visited = HappinessInputs {
        visitor_happiness: 10.0,
        extra_happiness:   15.0,
        ..inputs()
    };

    assert_eq!(workforce.calculate_happiness(&config, &visited), 75.0);
    // Recalculating rewrites the same keys instead of stacking them.
    assert_eq!(workforce.calculate_happiness(&config, &visited), 75.0);
    assert_eq!(workforce.happiness_bonuses().get("butterflies"), Some(&15.0));

    // Visitors leave: their keys vanish.
    assert_eq!(workforce.calculate_happiness(&config, &inputs()), 50.0);
    assert!(!workforce.happiness_bonuses().contains_key("visitors"));
    assert!(!workforce.happiness_bonuses().contains_key("butterflies"));
}

#[test]
fn happiness_is_clamped() {
    let config = ColonyConfig::standard();
    let mut workforce = WorkforceAllocator::new(&config, 2);
    workforce.add_happiness_bonus("festival", 500.0);
    assert_eq!(workforce.compute_happiness(&config, &inputs()).value, 100.0);

    workforce.remove_happiness_modifier("festival");
    workforce.add_happiness_penalty("plague", 500.0);
    assert_eq!(workforce.compute_happiness(&config, &inputs()).value, 0.0);
}

#[test]
fn season_modifier_is_a_bonus_or_a_penalty() {
    let config = ColonyConfig::standard();
    let mut workforce = WorkforceAllocator::new(&config, 2);
    workforce.set_season_modifier(10.0);
    assert_eq!(workforce.happiness_bonuses().get(SEASON_KEY), Some(&10.0));

    workforce.set_season_modifier(-5.0);
    assert!(!workforce.happiness_bonuses().contains_key(SEASON_KEY));
    assert_eq!(workforce.happiness_penalties().get(SEASON_KEY), Some(&5.0));
    assert_eq!(workforce.compute_happiness(&config, &inputs()).value, 45.0);
}

#[test]
fn growth_fills_to_housing_and_stops() {
    let config = ColonyConfig::standard();
    let mut workforce = WorkforceAllocator::new(&config, 2);
    let mut rng = SubsystemRng::seeded(77);
    let fed = HappinessInputs { food_stock: 100.0, ..inputs() };

    let mut born = 0;
    for _ in 0..20_000 {
        if workforce.tick(&config, &fed, &mut rng).pup_born {
            born += 1;
        }
        assert!(workforce.total() <= workforce.max_population());
    }
    assert_eq!(born, 2, "Two free beds in base housing");
    assert_eq!(workforce.total(), 4);
}

#[test]
fn maturation_is_one_roll_per_tick() {
    let mut config = ColonyConfig::standard();
    config.workforce.maturation_chance = 1.0;
    let mut workforce = WorkforceAllocator::new(&config, 2);
    let mut rng = SubsystemRng::seeded(1);
    let fed = HappinessInputs { food_stock: 100.0, ..inputs() };

    // Growth rate: 0.1 + min(90 / 50, 0.1) = 0.2, so a pup every 500 ticks.
    for tick in 1..1000 {
        let report = workforce.tick(&config, &fed, &mut rng);
        if report.pup_born {
            assert!(report.pup_matured, "the newborn matures on the same roll");
            break;
        }
        assert!(!report.pup_matured, "nothing to mature at tick {tick}");
    }
    assert_eq!(workforce.adults(), 3);
    assert_eq!(workforce.pups(), 0);
}
