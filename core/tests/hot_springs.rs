//! Hot springs: warmth bounds, soak capacity, soak → relaxation.

use capys_core::{
    config::{ColonyConfig, SpringTemplate, SpringType},
    engine::SimEngine,
    hot_spring_subsystem::{HotSpringSimulator, ThermalInputs},
    season_subsystem::{Season, Weather},
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn natural() -> SpringTemplate {
    SpringTemplate {
        spring_type:       SpringType::Natural,
        capacity:          2,
        warmth:            5.0,
        weather_protected: false,
    }
}

fn calm_inputs() -> ThermalInputs {
    ThermalInputs {
        population:            2,
        idle:                  0,
        keepers:               0,
        season:                Season::Spring,
        weather:               Weather::Sunny,
        night:                 false,
        warmth_bonus:          0.0,
        capacity_bonus:        0,
        relaxation_multiplier: 1.0,
    }
}

#[test]
fn max_warmth_tracks_spring_count() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    assert_eq!(springs.max_warmth(), 100.0);

    assert!(springs.add_spring(&natural(), &config.thermal), "First spring");
    assert_eq!(springs.max_warmth(), 60.0);
    assert!(springs.warmth() <= springs.max_warmth());

    for _ in 0..6 {
        assert!(!springs.add_spring(&natural(), &config.thermal));
    }
    assert_eq!(springs.max_warmth(), 100.0, "Capped at the ceiling");
}

#[test]
fn net_warmth_is_a_tenth_of_the_balance() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    springs.add_spring(&natural(), &config.thermal);
    let inputs = calm_inputs();

    assert!(approx(springs.generation(&config.thermal, &inputs), 5.0));
    // 2 × 0.3 × sunny 0.8
    assert!(approx(springs.consumption(&config.thermal, &inputs), 0.48));

    let before = springs.warmth();
    springs.tick(&config.thermal, &inputs);
    assert!(approx(springs.warmth() - before, 0.452));
}

#[test]
fn weather_and_keepers_shape_generation() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    springs.add_spring(&natural(), &config.thermal);

    let rain = ThermalInputs { weather: Weather::Rain, ..calm_inputs() };
    assert!(approx(springs.generation(&config.thermal, &rain), 4.0));

    let keepers = ThermalInputs { keepers: 2, warmth_bonus: 0.5, ..calm_inputs() };
    // 5 × 1.2 × 1.5
    assert!(approx(springs.generation(&config.thermal, &keepers), 9.0));

    let winter_night = ThermalInputs {
        season: Season::Winter,
        weather: Weather::ColdSnap,
        night: true,
        ..calm_inputs()
    };
    // 2 × 0.3 × 2 × 1.5 × 2
    assert!(approx(springs.consumption(&config.thermal, &winter_night), 3.6));
}

#[test]
fn warmth_never_leaves_its_range() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    let freezing = ThermalInputs {
        population: 40,
        season: Season::Winter,
        weather: Weather::ColdSnap,
        night: true,
        ..calm_inputs()
    };
    for _ in 0..500 {
        springs.tick(&config.thermal, &freezing);
        assert!(springs.warmth() >= 0.0);
    }
    assert_eq!(springs.warmth(), 0.0);
    assert_eq!(springs.warmth_percent(), 0.0);
}

#[test]
fn soak_capacity_includes_research_bonus_per_spring() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    springs.add_spring(&natural(), &config.thermal);
    springs.add_spring(&natural(), &config.thermal);

    assert_eq!(springs.total_capacity(0), 4);
    assert_eq!(springs.total_capacity(2), 8);

    for token in 0..4 {
        assert!(springs.start_soaking(token, &config.thermal, 0));
    }
    assert!(!springs.start_soaking(99, &config.thermal, 0), "No free slot");
    assert!(springs.start_soaking(99, &config.thermal, 2), "Research adds slots");
    assert!(!springs.start_soaking(99, &config.thermal, 2), "Already soaking");
    assert_eq!(springs.available_slots(2), 3);
}

#[test]
fn soak_turns_into_relaxation() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    springs.add_spring(&natural(), &config.thermal);
    assert!(springs.start_soaking(1, &config.thermal, 0));
    assert!(springs.start_soaking(2, &config.thermal, 0));

    let inputs = calm_inputs();
    for _ in 0..99 {
        springs.tick(&config.thermal, &inputs);
    }
    assert_eq!(springs.soaking_count(), 2);
    assert_eq!(springs.relaxed_count(), 0);

    springs.tick(&config.thermal, &inputs);
    assert_eq!(springs.soaking_count(), 0);
    assert_eq!(springs.relaxed_count(), 2);
    assert!(springs.has_relaxation_buff(1));

    for _ in 0..200 {
        springs.tick(&config.thermal, &inputs);
    }
    assert_eq!(springs.relaxed_count(), 0);
}

#[test]
fn relaxation_multiplier_lengthens_the_buff() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    springs.add_spring(&natural(), &config.thermal);
    assert!(springs.start_soaking(7, &config.thermal, 0));
    assert!(springs.stop_soaking(7, &config.thermal, 2.0));
    assert_eq!(springs.relaxation_buffs()[0].remaining, 400);
    assert!(!springs.stop_soaking(7, &config.thermal, 2.0));
}

#[test]
fn auto_rotation_seats_idle_workers() {
    let config = ColonyConfig::standard();
    let mut springs = HotSpringSimulator::new(&config.thermal);
    springs.add_spring(&natural(), &config.thermal);

    assert_eq!(springs.auto_rotate(&config.thermal, 5, 0), 2);
    assert_eq!(springs.soaking_count(), 2);
    assert_eq!(springs.auto_rotate(&config.thermal, 5, 0), 0);
}

#[test]
fn colony_starts_half_warm_without_springs() {
    let engine = SimEngine::build_test("spring-start".into(), 2);
    assert_eq!(engine.hot_springs().spring_count(), 0);
    assert_eq!(engine.hot_springs().warmth(), 50.0);
    assert_eq!(engine.hot_springs().warmth_percent(), 50.0);
}
