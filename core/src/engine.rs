//! The colony engine: the explicit session context that owns every
//! component and sequences all cross-component effects.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. SeasonClock         time, weather, season, random-event gates
//!   2. HotSpringSimulator  warmth, soak and relaxation timers, rotation
//!   3. Rate recompute      every `recompute_interval` ticks
//!   4. ResourceLedger      apply production then consumption
//!   5. WorkforceAllocator  happiness, growth, maturation
//!   6. VisitorSpawner      departures, then the arrival rolled in step 1
//!
//! RULES:
//!   - Components never call each other. The engine reads through a
//!     `WorldView` and then installs results.
//!   - Player actions run between ticks, are all-or-nothing, and
//!     recompute rates immediately.
//!   - All randomness flows through the RngBank.
//!   - Persistence failures are logged and counted, never fatal.

use crate::{
    building_subsystem::{BuildingListing, BuildingRegistry},
    clock::SimClock,
    command::PlayerCommand,
    config::{ColonyConfig, Feature, JobRole, ResearchBranch, Unlock},
    error::SimResult,
    event::{EventLogEntry, SimEvent},
    hot_spring_subsystem::{HotSpringSimulator, ThermalInputs},
    prestige_subsystem::{LegacyInputs, LegacyPoints, PrestigeLedger, UpgradeListing},
    productivity::{self, ProductivityBreakdown},
    research_subsystem::{ResearchTree, TechListing},
    resource_subsystem::{ResourceLedger, ResourceRow},
    rng::{RngBank, SubsystemSlot},
    season_subsystem::{GateOdds, SeasonClock, Weather},
    snapshot::{ColonySnapshot, AUTOSAVE_INTERVAL, SNAPSHOT_VERSION},
    store::SimStore,
    subsystem::WorldView,
    types::{RunId, Tick},
    visitor_subsystem::VisitorSpawner,
    workforce_subsystem::{
        building_key, HappinessFactor, HappinessInputs, JobRow, WorkforceAllocator, HOT_SPRINGS_KEY,
    },
};
use std::collections::VecDeque;

/// Size of the in-memory message log.
pub const RECENT_EVENT_LIMIT: usize = 50;

pub struct SimEngine {
    pub run_id:    RunId,
    pub clock:     SimClock,
    pub rng_bank:  RngBank,
    seed:          u64,
    config:        ColonyConfig,
    resources:     ResourceLedger,
    seasons:       SeasonClock,
    springs:       HotSpringSimulator,
    workforce:     WorkforceAllocator,
    buildings:     BuildingRegistry,
    research:      ResearchTree,
    visitors:      VisitorSpawner,
    prestige:      PrestigeLedger,
    store:         Option<SimStore>,
    recent:        VecDeque<SimEvent>,
    save_failures: u32,
}

impl SimEngine {
    /// Fresh colony with `config`. The config is trusted; use `with_config`
    /// for configs loaded from disk.
    pub fn new(run_id: RunId, seed: u64, config: ColonyConfig) -> Self {
        let mut engine = Self {
            clock:         SimClock::new(run_id.clone()),
            rng_bank:      RngBank::new(seed),
            seed,
            resources:     ResourceLedger::new(&config),
            seasons:       SeasonClock::new(),
            springs:       HotSpringSimulator::new(&config.thermal),
            workforce:     WorkforceAllocator::new(&config, config.workforce.start_adults),
            buildings:     BuildingRegistry::new(&config),
            research:      ResearchTree::new(),
            visitors:      VisitorSpawner::new(),
            prestige:      PrestigeLedger::new(&config),
            config,
            store:         None,
            recent:        VecDeque::new(),
            save_failures: 0,
            run_id,
        };
        engine.reset_run();
        let init = SimEvent::RunInitialized {
            run_id: engine.run_id.clone(),
            seed,
        };
        engine.remember(init);
        engine
    }

    /// Validate `config`, then build a fresh colony.
    pub fn with_config(run_id: RunId, seed: u64, config: ColonyConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::new(run_id, seed, config))
    }

    /// Standard catalog, no store.
    pub fn build_test(run_id: RunId, seed: u64) -> Self {
        Self::new(run_id, seed, ColonyConfig::standard())
    }

    /// Attach persistence. Registers the run and logs its start.
    pub fn attach_store(&mut self, store: SimStore) -> SimResult<()> {
        store.insert_run(&self.run_id, self.seed, env!("CARGO_PKG_VERSION"))?;
        let init = SimEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed:   self.seed,
        };
        store.append_event(&self.log_entry(self.clock.current_tick, &init)?)?;
        self.store = Some(store);
        Ok(())
    }

    pub fn store(&self) -> Option<&SimStore> {
        self.store.as_ref()
    }

    // ── Read-only access ───────────────────────────────────────

    pub fn seed(&self) -> u64 { self.seed }
    pub fn config(&self) -> &ColonyConfig { &self.config }
    pub fn resources(&self) -> &ResourceLedger { &self.resources }
    pub fn seasons(&self) -> &SeasonClock { &self.seasons }
    pub fn hot_springs(&self) -> &HotSpringSimulator { &self.springs }
    pub fn workforce(&self) -> &WorkforceAllocator { &self.workforce }
    pub fn buildings(&self) -> &BuildingRegistry { &self.buildings }
    pub fn research_tree(&self) -> &ResearchTree { &self.research }
    pub fn visitors(&self) -> &VisitorSpawner { &self.visitors }
    pub fn prestige(&self) -> &PrestigeLedger { &self.prestige }
    pub fn save_failures(&self) -> u32 { self.save_failures }

    /// Newest last.
    pub fn recent_events(&self) -> impl Iterator<Item = &SimEvent> {
        self.recent.iter()
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView {
            config:    &self.config,
            resources: &self.resources,
            seasons:   &self.seasons,
            springs:   &self.springs,
            workforce: &self.workforce,
            buildings: &self.buildings,
            research:  &self.research,
            visitors:  &self.visitors,
            prestige:  &self.prestige,
        }
    }

    pub fn productivity(&self) -> ProductivityBreakdown {
        productivity::productivity(&self.view())
    }

    pub fn base_happiness(&self) -> f64 {
        self.config.workforce.base_happiness + self.research.bonuses().base_happiness
    }

    /// Happiness for the current state, without rewriting dynamic keys.
    pub fn current_happiness(&self) -> f64 {
        self.workforce
            .compute_happiness(&self.config, &self.happiness_inputs())
            .value
    }

    pub fn happiness_factors(&self) -> Vec<HappinessFactor> {
        self.workforce.happiness_factors(self.base_happiness())
    }

    pub fn visible_resources(&self) -> Vec<ResourceRow> {
        self.resources.visible_rows(&self.config)
    }

    pub fn job_rows(&self) -> Vec<JobRow> {
        self.workforce.job_rows(&self.config)
    }

    pub fn building_cost(&self, id: &str) -> crate::types::CostMap {
        self.buildings.cost(&self.config, id, self.prestige.bonuses().building_discount)
    }

    pub fn can_build(&self, id: &str) -> bool {
        self.buildings
            .can_build(&self.config, id, &self.resources, self.prestige.bonuses().building_discount)
    }

    pub fn building_listings(&self) -> Vec<BuildingListing> {
        self.buildings
            .listings(&self.config, &self.resources, self.prestige.bonuses().building_discount)
    }

    pub fn can_research(&self, id: &str) -> bool {
        self.research.can_research(&self.config, id, &self.resources)
    }

    pub fn tech_listings(&self, branch: ResearchBranch) -> Vec<TechListing> {
        self.research.listings(&self.config, branch, &self.resources)
    }

    pub fn upgrade_listings(&self) -> Vec<UpgradeListing> {
        self.prestige.listings(&self.config)
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.buildings.has_feature(feature)
    }

    /// Most likely weather, while a forecasting visitor is present.
    pub fn forecast(&self) -> Option<Weather> {
        if !self.visitors.has_forecaster(&self.config) {
            return None;
        }
        self.seasons.forecast(&self.config.seasons)
    }

    pub fn legacy_points(&self) -> LegacyPoints {
        let inputs = LegacyInputs {
            population:          self.workforce.total(),
            building_count:      self.buildings.total_count(),
            researched_count:    self.research.researched_count() as u32,
            encountered_species: self.visitors.encountered_count() as u32,
        };
        self.prestige
            .calculate_legacy_points(&self.config, &inputs, &self.buildings)
    }

    fn happiness_inputs(&self) -> HappinessInputs {
        let visitor_bonus = self.research.bonuses().visitor_bonus;
        HappinessInputs {
            base:              self.base_happiness(),
            food_stock:        self.resources.get(&self.config.workforce.food_resource),
            warmth_percent:    self.springs.warmth_percent(),
            visitor_happiness: self.visitors.happiness_bonus(&self.config, visitor_bonus),
            extra_happiness:   self.visitors.extra_happiness(&self.config, visitor_bonus),
        }
    }

    fn thermal_inputs(&self) -> ThermalInputs {
        let bonuses = self.research.bonuses();
        ThermalInputs {
            population:            self.workforce.total(),
            idle:                  self.workforce.idle(),
            keepers:               self.workforce.role_count(&self.config, JobRole::SpringKeeper),
            season:                self.seasons.season(),
            weather:               self.seasons.weather(),
            night:                 self.seasons.is_night(),
            warmth_bonus:          bonuses.warmth_bonus,
            capacity_bonus:        bonuses.spring_capacity,
            relaxation_multiplier: bonuses.relaxation_duration,
        }
    }

    fn gate_odds(&self) -> GateOdds {
        let found = self.buildings.count(&self.config.events.natural_spring) > 0;
        let base = self
            .seasons
            .base_gate_odds(&self.config.seasons, &self.config.events, found);
        let prestige = self.prestige.bonuses();
        GateOdds {
            spring_discovery: base
                .spring_discovery
                .map(|p| p * self.research.bonuses().spring_discovery * prestige.spring_discovery),
            visitor_arrival: base.visitor_arrival * prestige.visitor_rate,
        }
    }

    // ── Derived-state installs ─────────────────────────────────

    /// Recompute every production and consumption rate.
    pub fn recalculate_rates(&mut self) {
        let sheet = productivity::compute_rates(&self.view());
        self.resources.install_rates(&sheet);
    }

    fn refresh_storage_multiplier(&mut self) {
        let research = self.research.bonuses();
        let visitors = self
            .visitors
            .storage_multiplier(&self.config, research.visitor_bonus);
        let multiplier = visitors * (1.0 + research.storage_multiplier);
        self.resources.set_storage_multiplier(multiplier);
    }

    fn refresh_spring_happiness(&mut self) {
        let bonus = self.research.bonuses().spring_happiness;
        if bonus > 0.0 {
            self.workforce.add_happiness_bonus(HOT_SPRINGS_KEY, bonus);
        }
    }

    fn refresh_housing(&mut self) {
        let housing = self
            .buildings
            .total_housing(&self.config, self.config.workforce.base_housing);
        self.workforce.set_max_population(housing);
    }

    // ── Tick ───────────────────────────────────────────────────

    /// Advance one tick in the documented order.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let tick = self.clock.advance();
        let mut events = Vec::new();

        // 1. Seasons and random-event gates
        let mut season_rng = self.rng_bank.for_subsystem(SubsystemSlot::Season, tick);
        let report = self.seasons.tick(&self.config.seasons, &mut season_rng);
        if report.night_fell {
            events.push(SimEvent::NightFell { tick, day: self.seasons.day() });
        }
        if let Some(day) = report.day_started {
            events.push(SimEvent::DayStarted { tick, day });
        }
        if let Some(weather) = report.weather_changed {
            events.push(SimEvent::WeatherChanged { tick, weather });
        }
        if let Some((season, happiness_modifier)) = report.season_changed {
            self.workforce.set_season_modifier(happiness_modifier);
            events.push(SimEvent::SeasonChanged { tick, season, happiness_modifier });
        }
        let gates = self.seasons.roll_gates(self.gate_odds(), &mut season_rng);
        if gates.discover_spring {
            self.discover_natural_spring(tick, &mut events);
        }

        // 2. Hot springs
        let thermal = self.thermal_inputs();
        self.springs.tick(&self.config.thermal, &thermal);

        // 3. Periodic rate recompute
        if tick % self.config.productivity.recompute_interval.max(1) == 0 {
            self.recalculate_rates();
        }

        // 4. Resources
        self.resources.tick();

        // 5. Workforce
        let inputs = self.happiness_inputs();
        let mut workforce_rng = self.rng_bank.for_subsystem(SubsystemSlot::Workforce, tick);
        let growth = self.workforce.tick(&self.config, &inputs, &mut workforce_rng);
        if growth.pup_born {
            events.push(SimEvent::PupBorn { tick, pups: self.workforce.pups() });
        }
        if growth.pup_matured {
            events.push(SimEvent::PupMatured { tick, adults: self.workforce.adults() });
        }

        // 6. Visitors
        for species in self.visitors.tick() {
            events.push(SimEvent::VisitorDeparted { tick, species });
        }
        if gates.visitor_arrival {
            let mut visitor_rng = self.rng_bank.for_subsystem(SubsystemSlot::Visitor, tick);
            let duration = self.research.bonuses().visitor_duration;
            if let Some(visitor) =
                self.visitors
                    .try_spawn(&self.config, &self.buildings, duration, &mut visitor_rng)
            {
                events.push(SimEvent::VisitorArrived {
                    tick,
                    species:  visitor.species,
                    duration: visitor.remaining,
                });
            }
        }
        self.refresh_storage_multiplier();

        self.record(tick, &events);

        if tick % AUTOSAVE_INTERVAL == 0 && self.store.is_some() {
            self.autosave();
        }

        events
    }

    /// Run n ticks in a loop. Used for testing and fast-forward.
    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Run every whole tick due after `elapsed_ms` of real time.
    /// No-op while paused; remainders carry to the next call.
    pub fn advance_real_time(&mut self, elapsed_ms: u64) -> Vec<SimEvent> {
        let due = self.clock.ticks_due(elapsed_ms);
        let mut events = Vec::new();
        for _ in 0..due {
            events.extend(self.tick());
        }
        events
    }

    fn discover_natural_spring(&mut self, tick: Tick, events: &mut Vec<SimEvent>) {
        let id = self.config.events.natural_spring.clone();
        let Some(def) = self.buildings.discover(&self.config, &id) else {
            return;
        };
        let spring_type = def.effects.hot_spring.map(|t| t.spring_type);
        log::info!("tick={tick} natural hot spring discovered");
        if let Some(spring_type) = spring_type {
            events.push(SimEvent::SpringDiscovered { tick, spring_type });
        }
        self.apply_building_effects(&id, tick, events);
        self.buildings.refresh_unlocks(&self.config);
        self.recalculate_rates();
    }

    /// Apply the effect set of one freshly gained building.
    fn apply_building_effects(&mut self, id: &str, tick: Tick, events: &mut Vec<SimEvent>) {
        let Some(def) = self.config.building(id).cloned() else {
            return;
        };
        let effects = &def.effects;

        for (res, delta) in &effects.storage {
            self.resources.add_capacity(res, *delta);
        }
        self.refresh_housing();
        if effects.happiness != 0.0 {
            self.workforce
                .add_happiness_bonus(&building_key(&def.id), effects.happiness);
        }

        for unlock in &effects.unlocks {
            match unlock {
                Unlock::Resource(res) => {
                    if self.resources.unlock(res) {
                        events.push(SimEvent::ResourceUnlocked { tick, resource: res.clone() });
                    }
                }
                Unlock::Job(job) => {
                    if self.workforce.unlock_job(job) {
                        events.push(SimEvent::JobUnlocked { tick, job: job.clone() });
                    }
                }
                Unlock::Feature(feature) => {
                    if self.buildings.unlock_feature(*feature) {
                        match feature {
                            Feature::Research  => { self.research.unlock(); }
                            Feature::Migration => { self.prestige.unlock_migration(); }
                            Feature::Trading   => {}
                        }
                        log::info!("tick={tick} feature unlocked: {feature:?}");
                        events.push(SimEvent::FeatureUnlocked { tick, feature: *feature });
                    }
                }
            }
        }

        if let Some(template) = &effects.hot_spring {
            if self.springs.add_spring(template, &self.config.thermal) {
                let keeper = self
                    .config
                    .jobs
                    .iter()
                    .find(|j| j.role == Some(JobRole::SpringKeeper))
                    .map(|j| j.id.clone());
                if let Some(job) = keeper {
                    if self.workforce.unlock_job(&job) {
                        events.push(SimEvent::JobUnlocked { tick, job });
                    }
                }
            }
        }
    }

    // ── Player actions ─────────────────────────────────────────

    pub fn assign_job(&mut self, id: &str) -> bool {
        if !self.workforce.assign_job(id) {
            return false;
        }
        self.recalculate_rates();
        true
    }

    pub fn unassign_job(&mut self, id: &str) -> bool {
        if !self.workforce.unassign_job(id) {
            return false;
        }
        self.recalculate_rates();
        true
    }

    /// Manual gathering. Returns the amount actually added.
    pub fn gather(&mut self, resource: &str) -> f64 {
        if !self.config.gathering.gatherable.iter().any(|r| r == resource) {
            return 0.0;
        }
        let amount = self.config.gathering.amount * self.productivity().total();
        self.resources.add(resource, amount)
    }

    pub fn build(&mut self, id: &str) -> bool {
        let tick = self.clock.current_tick;
        let discount = self.prestige.bonuses().building_discount;
        let Some(built) = self
            .buildings
            .build(&self.config, id, &mut self.resources, discount)
            .map(|def| def.id.clone())
        else {
            return false;
        };

        let count = self.buildings.count(&built);
        log::info!("tick={tick} built {built} (now {count})");
        let mut events = vec![SimEvent::BuildingConstructed { tick, building: built.clone(), count }];
        self.apply_building_effects(&built, tick, &mut events);
        self.buildings.refresh_unlocks(&self.config);
        self.recalculate_rates();
        self.record(tick, &events);
        true
    }

    pub fn research(&mut self, id: &str) -> bool {
        if !self.research.research(&self.config, id, &mut self.resources) {
            return false;
        }
        let tick = self.clock.current_tick;
        self.refresh_spring_happiness();
        self.refresh_storage_multiplier();
        self.recalculate_rates();
        self.record(tick, &[SimEvent::TechResearched { tick, tech: id.to_string() }]);
        true
    }

    pub fn purchase_upgrade(&mut self, id: &str) -> bool {
        if !self.prestige.purchase_upgrade(&self.config, id) {
            return false;
        }
        let tick = self.clock.current_tick;
        self.recalculate_rates();
        let event = SimEvent::UpgradePurchased {
            tick,
            upgrade:          id.to_string(),
            remaining_points: self.prestige.legacy_points(),
        };
        self.record(tick, &[event]);
        true
    }

    /// Bank legacy points and start a new run. `None` unless unlocked.
    pub fn migrate(&mut self) -> Option<u64> {
        if !self.prestige.is_migration_unlocked() {
            return None;
        }
        let tick = self.clock.current_tick;
        let points = self.legacy_points().total;
        self.prestige.bank(points);
        self.reset_run();
        let migration_count = self.prestige.migration_count();
        log::info!("tick={tick} migration #{migration_count} complete, earned {points} legacy points");
        self.record(tick, &[SimEvent::Migrated { tick, points_earned: points, migration_count }]);
        Some(points)
    }

    /// Rebuild every run-scoped component and reseed it from the
    /// prestige start bonuses. Shared by construction and migration.
    fn reset_run(&mut self) {
        let bonuses = self.prestige.bonuses().clone();
        let config = &self.config;

        self.resources = ResourceLedger::new(config);
        self.buildings = BuildingRegistry::new(config);
        self.workforce = WorkforceAllocator::new(config, bonuses.start_population);
        self.springs   = HotSpringSimulator::new(&config.thermal);
        self.springs.set_warmth(bonuses.start_warmth * config.thermal.warmth_ceiling);
        self.seasons   = SeasonClock::new();
        self.research  = ResearchTree::new();
        for tech in &bonuses.start_research {
            self.research.grant(config, tech, &mut self.resources);
        }
        self.visitors  = VisitorSpawner::new();

        self.refresh_housing();
        self.refresh_spring_happiness();
        self.refresh_storage_multiplier();
        if bonuses.start_resources > 0.0 {
            for res in &self.config.prestige.start_resource_ids {
                self.resources.set(res, bonuses.start_resources);
            }
        }
        self.recalculate_rates();
    }

    pub fn apply_command(&mut self, command: PlayerCommand) -> bool {
        let command_type = command.type_name();
        let accepted = match command {
            PlayerCommand::Pause                       => { self.clock.pause(); true }
            PlayerCommand::Resume                      => { self.clock.resume(); true }
            PlayerCommand::SetSpeed { speed }          => { self.clock.set_speed(speed); true }
            PlayerCommand::Gather { resource }         => self.gather(&resource) > 0.0,
            PlayerCommand::AssignJob { job }           => self.assign_job(&job),
            PlayerCommand::UnassignJob { job }         => self.unassign_job(&job),
            PlayerCommand::Build { building }          => self.build(&building),
            PlayerCommand::Research { tech }           => self.research(&tech),
            PlayerCommand::PurchaseUpgrade { upgrade } => self.purchase_upgrade(&upgrade),
            PlayerCommand::Migrate                     => self.migrate().is_some(),
        };
        let tick = self.clock.current_tick;
        let event = SimEvent::PlayerCommandReceived {
            tick,
            command_type: command_type.to_string(),
            accepted,
        };
        self.record(tick, &[event]);
        accepted
    }

    // ── Snapshots ──────────────────────────────────────────────

    pub fn snapshot(&self) -> ColonySnapshot {
        ColonySnapshot {
            version:     SNAPSHOT_VERSION,
            timestamp:   chrono::Utc::now().timestamp_millis(),
            run_id:      self.run_id.clone(),
            seed:        self.seed,
            clock:       self.clock.clone(),
            resources:   self.resources.clone(),
            buildings:   self.buildings.clone(),
            population:  self.workforce.clone(),
            hot_springs: self.springs.clone(),
            seasons:     self.seasons.clone(),
            research:    self.research.clone(),
            visitors:    self.visitors.clone(),
            prestige:    self.prestige.clone(),
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        self.snapshot().to_json()
    }

    /// Validate, then replace every component at once.
    pub fn apply(&mut self, snapshot: ColonySnapshot) -> SimResult<()> {
        snapshot.validate(&self.config)?;
        let ColonySnapshot {
            run_id,
            seed,
            clock,
            resources,
            buildings,
            population,
            hot_springs,
            seasons,
            research,
            visitors,
            mut prestige,
            ..
        } = snapshot;
        prestige.recalculate_bonuses(&self.config);

        self.run_id    = run_id;
        self.seed      = seed;
        self.rng_bank  = RngBank::new(seed);
        self.clock     = clock;
        self.resources = resources;
        self.buildings = buildings;
        self.workforce = population;
        self.springs   = hot_springs;
        self.seasons   = seasons;
        self.research  = research;
        self.visitors  = visitors;
        self.prestige  = prestige;

        if let Some(store) = &self.store {
            if let Err(e) = store.insert_run(&self.run_id, self.seed, env!("CARGO_PKG_VERSION")) {
                log::warn!("could not register restored run {}: {e}", self.run_id);
            }
        }
        Ok(())
    }

    pub fn import_json(&mut self, json: &str) -> SimResult<()> {
        let snapshot = ColonySnapshot::import_json(json)?;
        self.apply(snapshot)
    }

    /// Write a save slot now.
    pub fn save(&self) -> SimResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let json = self.to_json()?;
        store.save_slot(&self.run_id, self.clock.current_tick, SNAPSHOT_VERSION, &json)?;
        log::debug!("tick={} saved", self.clock.current_tick);
        Ok(())
    }

    fn autosave(&mut self) {
        if let Err(e) = self.save() {
            self.save_failures += 1;
            log::warn!("tick={} autosave failed: {e}", self.clock.current_tick);
        }
    }

    /// Resume the most recent save in the attached store.
    pub fn resume_latest(&mut self) -> SimResult<bool> {
        let record = match &self.store {
            Some(store) => store.latest_save_any()?,
            None => None,
        };
        match record {
            Some(record) => {
                self.import_json(&record.state_json)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ── Event log ──────────────────────────────────────────────

    fn log_entry(&self, tick: Tick, event: &SimEvent) -> SimResult<EventLogEntry> {
        Ok(EventLogEntry {
            id:         None,
            run_id:     self.run_id.clone(),
            tick,
            subsystem:  event.source().to_string(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        })
    }

    fn remember(&mut self, event: SimEvent) {
        if self.recent.len() == RECENT_EVENT_LIMIT {
            self.recent.pop_front();
        }
        self.recent.push_back(event);
    }

    fn record(&mut self, tick: Tick, events: &[SimEvent]) {
        for event in events {
            log::debug!("tick={tick} {}", event.type_name());
            if let Some(store) = &self.store {
                let persisted = self
                    .log_entry(tick, event)
                    .and_then(|entry| store.append_event(&entry));
                if let Err(e) = persisted {
                    log::warn!("tick={tick} could not persist {}: {e}", event.type_name());
                }
            }
            self.remember(event.clone());
        }
    }

    /// Query events for a specific tick from the store.
    pub fn store_events_for_tick(&self, tick: Tick) -> SimResult<Vec<EventLogEntry>> {
        match &self.store {
            Some(store) => store.events_for_tick(&self.run_id, tick),
            None => Ok(Vec::new()),
        }
    }
}
