//! Season clock: day/night, weather cadence, season cycling.

use capys_core::{
    config::ColonyConfig,
    engine::SimEngine,
    event::SimEvent,
    rng::SubsystemRng,
    season_subsystem::{GateOdds, Season, SeasonClock, TimePhase, Weather},
    workforce_subsystem::SEASON_KEY,
};

fn net_season_modifier(engine: &SimEngine) -> f64 {
    let workforce = engine.workforce();
    workforce.happiness_bonuses().get(SEASON_KEY).copied().unwrap_or(0.0)
        - workforce.happiness_penalties().get(SEASON_KEY).copied().unwrap_or(0.0)
}

#[test]
fn night_falls_at_half_day_and_a_new_day_starts() {
    let config = ColonyConfig::standard();
    let mut clock = SeasonClock::new();
    let mut rng = SubsystemRng::seeded(1);

    for _ in 0..299 {
        let report = clock.tick(&config.seasons, &mut rng);
        assert!(!report.night_fell);
    }
    assert!(!clock.is_night());

    let report = clock.tick(&config.seasons, &mut rng);
    assert!(report.night_fell);
    assert!(clock.is_night());

    for _ in 0..299 {
        clock.tick(&config.seasons, &mut rng);
    }
    let report = clock.tick(&config.seasons, &mut rng);
    assert_eq!(report.day_started, Some(2));
    assert_eq!(clock.day(), 2);
    assert!(!clock.is_night());
}

#[test]
fn weather_rerolls_on_schedule_from_the_season_table() {
    let config = ColonyConfig::standard();
    let mut clock = SeasonClock::new();
    let mut rng = SubsystemRng::seeded(9);

    for _ in 0..1199 {
        let report = clock.tick(&config.seasons, &mut rng);
        assert_eq!(report.weather_changed, None);
    }
    assert_eq!(clock.ticks_until_weather_change(&config.seasons), 1);
    clock.tick(&config.seasons, &mut rng);
    assert_eq!(clock.weather_timer(), 0);
    assert!(matches!(clock.weather(), Weather::Sunny | Weather::Cloudy | Weather::Rain));
}

#[test]
fn seasons_cycle_in_order() {
    let config = ColonyConfig::standard();
    let mut clock = SeasonClock::new();
    let mut rng = SubsystemRng::seeded(4);
    let mut seen = vec![clock.season()];

    for _ in 0..4 {
        for _ in 0..5999 {
            assert_eq!(clock.tick(&config.seasons, &mut rng).season_changed, None);
        }
        let report = clock.tick(&config.seasons, &mut rng);
        let (season, modifier) = report.season_changed.expect("season boundary");
        assert_eq!(modifier, clock.happiness_modifier(&config.seasons));
        seen.push(season);
    }
    assert_eq!(seen, vec![
        Season::Spring,
        Season::Summer,
        Season::Autumn,
        Season::Winter,
        Season::Spring,
    ]);
}

#[test]
fn time_phases_follow_the_day() {
    let config = ColonyConfig::standard();
    let mut clock = SeasonClock::new();
    let mut rng = SubsystemRng::seeded(2);
    assert_eq!(clock.time_phase(&config.seasons), TimePhase::Dawn);
    for _ in 0..100 {
        clock.tick(&config.seasons, &mut rng);
    }
    assert_eq!(clock.time_phase(&config.seasons), TimePhase::Day);
    for _ in 0..250 {
        clock.tick(&config.seasons, &mut rng);
    }
    assert_eq!(clock.time_phase(&config.seasons), TimePhase::Dusk);
    for _ in 0..100 {
        clock.tick(&config.seasons, &mut rng);
    }
    assert_eq!(clock.time_phase(&config.seasons), TimePhase::Night);
}

#[test]
fn forecast_picks_the_most_likely_weather() {
    let config = ColonyConfig::standard();
    let clock = SeasonClock::new();
    assert_eq!(clock.forecast(&config.seasons), Some(Weather::Sunny));
}

#[test]
fn discovery_gate_needs_grace_period_and_no_spring() {
    let config = ColonyConfig::standard();
    let mut clock = SeasonClock::new();
    let mut rng = SubsystemRng::seeded(3);

    let odds = clock.base_gate_odds(&config.seasons, &config.events, false);
    assert_eq!(odds.spring_discovery, None);

    for _ in 0..1001 {
        clock.tick(&config.seasons, &mut rng);
    }
    let odds = clock.base_gate_odds(&config.seasons, &config.events, false);
    assert_eq!(odds.spring_discovery, Some(0.0005));
    let found = clock.base_gate_odds(&config.seasons, &config.events, true);
    assert_eq!(found.spring_discovery, None);

    // Spring boosts visitor odds.
    assert_eq!(odds.visitor_arrival, 0.0003 * 1.5);

    let certain = GateOdds { spring_discovery: Some(1.0), visitor_arrival: 0.0 };
    let outcome = clock.roll_gates(certain, &mut rng);
    assert!(outcome.discover_spring);
    assert!(!outcome.visitor_arrival);
}

#[test]
fn season_change_replaces_the_season_modifier() {
    let mut engine = SimEngine::build_test("season-mod".into(), 21);
    assert_eq!(net_season_modifier(&engine), 0.0);

    engine.run_ticks(6000);
    assert_eq!(engine.seasons().season(), Season::Summer);
    let summer = engine.seasons().happiness_modifier(&engine.config().seasons);
    assert!(summer > 0.0);
    assert_eq!(net_season_modifier(&engine), summer);

    engine.run_ticks(6000);
    assert_eq!(engine.seasons().season(), Season::Autumn);
    let autumn = engine.seasons().happiness_modifier(&engine.config().seasons);
    assert_eq!(net_season_modifier(&engine), autumn, "Replaced, not summed");
}

#[test]
fn engine_reports_day_and_night_events() {
    let mut engine = SimEngine::build_test("season-events".into(), 21);
    let events: Vec<SimEvent> = (0..600).flat_map(|_| engine.tick()).collect();
    assert!(events.iter().any(|e| matches!(e, SimEvent::NightFell { tick: 300, .. })));
    assert!(events.iter().any(|e| matches!(e, SimEvent::DayStarted { tick: 600, day: 2 })));
}

#[test]
fn natural_spring_is_discovered_once_the_grace_period_ends() {
    let mut config = ColonyConfig::standard();
    config.events.spring_discovery_chance = 1.0;
    let grace = config.events.discovery_grace_ticks;
    let mut engine = SimEngine::with_config("season-discovery".into(), 21, config).expect("valid config");

    engine.run_ticks(grace);
    assert_eq!(engine.buildings().count("natural_spring"), 0, "Still within the grace period");
    assert!(engine.building_listings().iter().all(|row| row.id != "natural_spring"));
    assert_eq!(engine.hot_springs().spring_count(), 0);

    let events = engine.tick();
    assert!(events.iter().any(|e| matches!(e, SimEvent::SpringDiscovered { .. })));
    assert_eq!(engine.buildings().count("natural_spring"), 1);
    assert!(engine.buildings().is_latched("natural_spring"));
    assert_eq!(engine.hot_springs().spring_count(), 1);
    assert!(engine.workforce().is_job_unlocked("spring_keeper"));
    let row = engine
        .building_listings()
        .into_iter()
        .find(|row| row.id == "natural_spring")
        .expect("revealed in the listings");
    assert_eq!(row.count, 1);

    engine.run_ticks(500);
    assert_eq!(engine.buildings().count("natural_spring"), 1, "Only one natural spring");
}
