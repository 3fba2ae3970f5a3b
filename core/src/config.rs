//! Colony configuration: every catalog and tuning constant.
//!
//! `ColonyConfig::standard()` is the canonical settlement catalog and is
//! what tests use. `ColonyConfig::load()` reads the same shape from a JSON
//! file so balance can be tuned without recompiling.

use crate::{
    error::{SimError, SimResult},
    season_subsystem::{Season, Weather},
    types::{BuildingId, CostMap, JobId, ResourceId, SpeciesId, TechId, Tick, UpgradeId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// ── Resources ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Primary,
    Crafted,
    Special,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDef {
    pub id: ResourceId,
    pub name: String,
    pub category: ResourceCategory,
    pub base_capacity: f64,
    #[serde(default)]
    pub initial_amount: f64,
    #[serde(default)]
    pub initially_visible: bool,
}

// ── Jobs ───────────────────────────────────────────────────────────

/// Jobs whose value is not (only) in what they produce.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobRole {
    /// Boosts hot-spring warmth generation.
    SpringKeeper,
    /// Adds happiness per assigned worker.
    Healer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDef {
    pub id: JobId,
    pub name: String,
    #[serde(default)]
    pub produces: CostMap,
    #[serde(default)]
    pub consumes: CostMap,
    #[serde(default)]
    pub unlocked_by_default: bool,
    #[serde(default)]
    pub role: Option<JobRole>,
}

// ── Buildings ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BuildingCategory {
    Storage,
    Housing,
    Production,
    Special,
}

/// Colony-wide capabilities switched on by construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Research,
    Migration,
    Trading,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Unlock {
    Resource(ResourceId),
    Job(JobId),
    Feature(Feature),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpringType {
    Natural,
    Expanded,
    Bathhouse,
    Grand,
}

impl SpringType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Natural   => "Natural Spring",
            Self::Expanded  => "Expanded Pool",
            Self::Bathhouse => "Bathhouse",
            Self::Grand     => "Grand Onsen",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpringTemplate {
    pub spring_type: SpringType,
    pub capacity: u32,
    pub warmth: f64,
    #[serde(default)]
    pub weather_protected: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildingEffects {
    #[serde(default)]
    pub storage: CostMap,
    #[serde(default)]
    pub housing: u32,
    #[serde(default)]
    pub happiness: f64,
    #[serde(default)]
    pub unlocks: Vec<Unlock>,
    #[serde(default)]
    pub hot_spring: Option<SpringTemplate>,
    /// Multiplies science production while at least one is owned.
    #[serde(default)]
    pub science_multiplier: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDef {
    pub id: BuildingId,
    pub name: String,
    pub tier: u8,
    pub category: BuildingCategory,
    #[serde(default)]
    pub cost: CostMap,
    /// Cost multiplier applied per owned copy.
    pub cost_growth: f64,
    #[serde(default)]
    pub effects: BuildingEffects,
    /// Building id → owned count required before this one unlocks.
    #[serde(default)]
    pub requires: BTreeMap<BuildingId, u32>,
    #[serde(default)]
    pub unlocked_by_default: bool,
    /// Never purchasable; appears through a discovery event.
    #[serde(default)]
    pub discoverable: bool,
    #[serde(default)]
    pub max_count: Option<u32>,
}

// ── Research ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResearchBranch {
    Survival,
    Construction,
    Springs,
    Social,
}

/// Additive fields default to 0, multiplicative fields to `None` (× 1).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechEffects {
    #[serde(default)]
    pub production_bonus: CostMap,
    #[serde(default)]
    pub storage: CostMap,
    #[serde(default)]
    pub spring_capacity: u32,
    #[serde(default)]
    pub warmth_bonus: f64,
    #[serde(default)]
    pub spring_happiness: f64,
    #[serde(default)]
    pub base_happiness: f64,
    #[serde(default)]
    pub science_bonus: f64,
    #[serde(default)]
    pub storage_multiplier: f64,
    #[serde(default)]
    pub relaxation_duration: Option<f64>,
    #[serde(default)]
    pub visitor_duration: Option<f64>,
    #[serde(default)]
    pub visitor_bonus: Option<f64>,
    #[serde(default)]
    pub spring_discovery: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechDef {
    pub id: TechId,
    pub name: String,
    pub branch: ResearchBranch,
    pub cost: CostMap,
    #[serde(default)]
    pub requires: Vec<TechId>,
    pub effects: TechEffects,
}

// ── Visitors ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisitorBonus {
    Production { resource: ResourceId, amount: f64 },
    AllProduction { amount: f64 },
    Happiness { amount: f64 },
    StorageBonus { amount: f64 },
    NightBonus { amount: f64 },
    WeatherForecast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorDef {
    pub id: SpeciesId,
    pub name: String,
    pub bonus: VisitorBonus,
    /// Flat happiness while present; may be negative.
    pub happiness: f64,
    pub attracted_by: Vec<BuildingId>,
    /// 1 (common) ..= 4 (very rare).
    pub rarity: u8,
    pub stay_duration: Tick,
}

// ── Prestige ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UpgradeEffect {
    GatheringBonus(f64),
    SpringDiscovery(f64),
    VisitorRate(f64),
    ScienceBonus(f64),
    BuildingDiscount(f64),
    StartWarmth(f64),
    StartPopulation(u32),
    StartResources(f64),
    StartResearch(TechId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeDef {
    pub id: UpgradeId,
    pub name: String,
    pub cost: u64,
    pub effect: UpgradeEffect,
}

/// Flat legacy award for owning a specific building at migration time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneAward {
    pub building: BuildingId,
    pub points: u64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrestigeConfig {
    pub upgrades: Vec<UpgradeDef>,
    pub milestones: Vec<MilestoneAward>,
    /// Resources seeded by a start-resources upgrade.
    pub start_resource_ids: Vec<ResourceId>,
    pub default_start_warmth: f64,
}

// ── Environment ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherOdds {
    pub weather: Weather,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentEffects {
    #[serde(default)]
    pub happiness: f64,
    #[serde(default)]
    pub outdoor_work: Option<f64>,
    #[serde(default)]
    pub visitor_chance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonConfig {
    pub day_length: Tick,
    pub season_length: Tick,
    pub weather_duration: Tick,
    /// Ordered odds per season; order matters for the cumulative draw
    /// and for forecast tie-breaks.
    pub weather_tables: BTreeMap<Season, Vec<WeatherOdds>>,
    pub season_effects: BTreeMap<Season, EnvironmentEffects>,
    pub weather_effects: BTreeMap<Weather, EnvironmentEffects>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalConfig {
    pub initial_warmth: f64,
    /// Max warmth before any spring exists.
    pub unheated_max_warmth: f64,
    pub base_max_warmth: f64,
    pub max_warmth_per_spring: f64,
    pub warmth_ceiling: f64,
    pub consumption_per_member: f64,
    pub night_consumption: f64,
    /// Generation factor applied to unprotected springs.
    pub weather_generation: BTreeMap<Weather, f64>,
    pub season_consumption: BTreeMap<Season, f64>,
    pub weather_consumption: BTreeMap<Weather, f64>,
    pub keeper_bonus: f64,
    /// Fraction of (generation − consumption) applied per tick.
    pub net_scale: f64,
    pub soak_duration: Tick,
    pub relaxation_duration: Tick,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkforceConfig {
    pub start_adults: u32,
    pub base_housing: u32,
    pub base_happiness: f64,
    pub growth_threshold: f64,
    pub base_growth_rate: f64,
    pub happy_growth_per_point: f64,
    pub unhappy_growth_per_point: f64,
    pub food_surplus_per_member: f64,
    pub food_surplus_divisor: f64,
    pub max_food_growth: f64,
    pub maturation_chance: f64,
    pub overcrowding_penalty: f64,
    pub food_buffer_per_member: f64,
    pub food_shortage_penalty: f64,
    pub warmth_bonus_step: f64,
    pub cold_penalty_step: f64,
    pub healer_happiness: f64,
    pub food_resource: ResourceId,
    pub food_per_member: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductivityConfig {
    pub recompute_interval: Tick,
    pub night_outdoor_penalty: f64,
    pub relaxation_bonus: f64,
    pub science_resource: ResourceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomEventConfig {
    pub spring_discovery_chance: f64,
    /// Season ticks before a natural spring can be discovered.
    pub discovery_grace_ticks: Tick,
    pub visitor_chance: f64,
    pub natural_spring: BuildingId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatheringConfig {
    pub gatherable: Vec<ResourceId>,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColonyConfig {
    pub resources: Vec<ResourceDef>,
    pub jobs: Vec<JobDef>,
    pub buildings: Vec<BuildingDef>,
    pub technologies: Vec<TechDef>,
    pub visitors: Vec<VisitorDef>,
    pub prestige: PrestigeConfig,
    pub seasons: SeasonConfig,
    pub thermal: ThermalConfig,
    pub workforce: WorkforceConfig,
    pub productivity: ProductivityConfig,
    pub events: RandomEventConfig,
    pub gathering: GatheringConfig,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ColonyConfig {
    /// Load from a JSON file with the same shape as `standard()`.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ColonyConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config {path}: {e}"))?;
        Ok(config)
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceDef> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn job(&self, id: &str) -> Option<&JobDef> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn building(&self, id: &str) -> Option<&BuildingDef> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn technology(&self, id: &str) -> Option<&TechDef> {
        self.technologies.iter().find(|t| t.id == id)
    }

    /// Reject dangling catalog references and cyclic research graphs.
    pub fn validate(&self) -> SimResult<()> {
        let resources: BTreeSet<&str> = self.resources.iter().map(|r| r.id.as_str()).collect();
        let jobs: BTreeSet<&str> = self.jobs.iter().map(|j| j.id.as_str()).collect();
        let buildings: BTreeSet<&str> = self.buildings.iter().map(|b| b.id.as_str()).collect();
        let techs: BTreeSet<&str> = self.technologies.iter().map(|t| t.id.as_str()).collect();

        let check = |set: &BTreeSet<&str>, kind: &'static str, id: &str, referrer: &str| {
            if set.contains(id) {
                Ok(())
            } else {
                Err(SimError::UnknownReference {
                    kind,
                    id: id.to_string(),
                    referrer: referrer.to_string(),
                })
            }
        };

        for job in &self.jobs {
            for res in job.produces.keys().chain(job.consumes.keys()) {
                check(&resources, "resource", res, &job.id)?;
            }
        }

        for b in &self.buildings {
            for res in b.cost.keys().chain(b.effects.storage.keys()) {
                check(&resources, "resource", res, &b.id)?;
            }
            for req in b.requires.keys() {
                check(&buildings, "building", req, &b.id)?;
            }
            for unlock in &b.effects.unlocks {
                match unlock {
                    Unlock::Resource(r) => check(&resources, "resource", r, &b.id)?,
                    Unlock::Job(j) => check(&jobs, "job", j, &b.id)?,
                    Unlock::Feature(_) => {}
                }
            }
        }

        for t in &self.technologies {
            for res in t
                .cost
                .keys()
                .chain(t.effects.storage.keys())
                .chain(t.effects.production_bonus.keys())
            {
                check(&resources, "resource", res, &t.id)?;
            }
            for req in &t.requires {
                check(&techs, "technology", req, &t.id)?;
            }
        }
        self.check_research_acyclic()?;

        for v in &self.visitors {
            for b in &v.attracted_by {
                check(&buildings, "building", b, &v.id)?;
            }
            if let VisitorBonus::Production { resource, .. } = &v.bonus {
                check(&resources, "resource", resource, &v.id)?;
            }
            if !(1..=4).contains(&v.rarity) {
                return Err(SimError::Other(anyhow::anyhow!(
                    "visitor '{}' has rarity {} outside 1..=4",
                    v.id,
                    v.rarity
                )));
            }
        }

        for u in &self.prestige.upgrades {
            if let UpgradeEffect::StartResearch(t) = &u.effect {
                check(&techs, "technology", t, &u.id)?;
            }
        }
        for m in &self.prestige.milestones {
            check(&buildings, "building", &m.building, "prestige milestones")?;
        }
        for r in &self.prestige.start_resource_ids {
            check(&resources, "resource", r, "prestige start resources")?;
        }
        for r in &self.gathering.gatherable {
            check(&resources, "resource", r, "gathering")?;
        }
        check(&resources, "resource", &self.workforce.food_resource, "workforce")?;
        check(&resources, "resource", &self.productivity.science_resource, "productivity")?;
        check(&buildings, "building", &self.events.natural_spring, "random events")?;

        for season in Season::ALL {
            let total: f64 = self
                .seasons
                .weather_tables
                .get(&season)
                .map(|odds| odds.iter().map(|o| o.probability).sum())
                .unwrap_or(0.0);
            if (total - 1.0).abs() > 1e-9 {
                return Err(SimError::Other(anyhow::anyhow!(
                    "weather odds for {season:?} sum to {total}, expected 1"
                )));
            }
        }
        Ok(())
    }

    fn check_research_acyclic(&self) -> SimResult<()> {
        // 0 = unvisited, 1 = on stack, 2 = done
        let mut state: BTreeMap<&str, u8> = BTreeMap::new();

        fn visit<'a>(
            config: &'a ColonyConfig,
            id: &'a str,
            state: &mut BTreeMap<&'a str, u8>,
        ) -> SimResult<()> {
            match state.get(id).copied().unwrap_or(0) {
                1 => return Err(SimError::ResearchCycle { tech: id.to_string() }),
                2 => return Ok(()),
                _ => {}
            }
            state.insert(id, 1);
            if let Some(tech) = config.technology(id) {
                for req in &tech.requires {
                    visit(config, req, state)?;
                }
            }
            state.insert(id, 2);
            Ok(())
        }

        for tech in &self.technologies {
            visit(self, &tech.id, &mut state)?;
        }
        Ok(())
    }
}

// ── Standard catalog ───────────────────────────────────────────────

fn costs(entries: &[(&str, f64)]) -> CostMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn resource(id: &str, name: &str, category: ResourceCategory, cap: f64) -> ResourceDef {
    ResourceDef {
        id: id.into(),
        name: name.into(),
        category,
        base_capacity: cap,
        initial_amount: 0.0,
        initially_visible: false,
    }
}

fn job(id: &str, name: &str, produces: &[(&str, f64)], consumes: &[(&str, f64)]) -> JobDef {
    JobDef {
        id: id.into(),
        name: name.into(),
        produces: costs(produces),
        consumes: costs(consumes),
        unlocked_by_default: false,
        role: None,
    }
}

fn building(id: &str, name: &str, tier: u8, category: BuildingCategory) -> BuildingDef {
    BuildingDef {
        id: id.into(),
        name: name.into(),
        tier,
        category,
        cost: CostMap::new(),
        cost_growth: 1.0,
        effects: BuildingEffects::default(),
        requires: BTreeMap::new(),
        unlocked_by_default: false,
        discoverable: false,
        max_count: None,
    }
}

impl BuildingDef {
    fn priced(mut self, cost: &[(&str, f64)], growth: f64) -> Self {
        self.cost = costs(cost);
        self.cost_growth = growth;
        self
    }

    fn max(mut self, n: u32) -> Self {
        self.max_count = Some(n);
        self
    }

    fn starts_unlocked(mut self) -> Self {
        self.unlocked_by_default = true;
        self
    }

    fn requires(mut self, reqs: &[(&str, u32)]) -> Self {
        self.requires = reqs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        self
    }

    fn storage(mut self, deltas: &[(&str, f64)]) -> Self {
        self.effects.storage = costs(deltas);
        self
    }

    fn housing(mut self, n: u32, happiness: f64) -> Self {
        self.effects.housing = n;
        self.effects.happiness = happiness;
        self
    }

    fn unlocks(mut self, unlocks: Vec<Unlock>) -> Self {
        self.effects.unlocks = unlocks;
        self
    }

    fn spring(mut self, spring_type: SpringType, capacity: u32, warmth: f64, protected: bool) -> Self {
        self.effects.hot_spring = Some(SpringTemplate {
            spring_type,
            capacity,
            warmth,
            weather_protected: protected,
        });
        self
    }
}

fn tech(
    id: &str,
    name: &str,
    branch: ResearchBranch,
    science: f64,
    requires: &[&str],
    effects: TechEffects,
) -> TechDef {
    TechDef {
        id: id.into(),
        name: name.into(),
        branch,
        cost: costs(&[("science", science)]),
        requires: requires.iter().map(|s| s.to_string()).collect(),
        effects,
    }
}

fn visitor(
    id: &str,
    name: &str,
    bonus: VisitorBonus,
    happiness: f64,
    attracted_by: &[&str],
    rarity: u8,
    stay_duration: Tick,
) -> VisitorDef {
    VisitorDef {
        id: id.into(),
        name: name.into(),
        bonus,
        happiness,
        attracted_by: attracted_by.iter().map(|s| s.to_string()).collect(),
        rarity,
        stay_duration,
    }
}

fn upgrade(id: &str, name: &str, cost: u64, effect: UpgradeEffect) -> UpgradeDef {
    UpgradeDef { id: id.into(), name: name.into(), cost, effect }
}

impl ColonyConfig {
    /// The full settlement catalog.
    pub fn standard() -> Self {
        use BuildingCategory::*;
        use ResearchBranch::*;
        use ResourceCategory::*;

        let mut grass = resource("grass", "Grass", Primary, 100.0);
        grass.initial_amount = 10.0;
        grass.initially_visible = true;
        let mut reeds = resource("reeds", "Reeds", Primary, 50.0);
        reeds.initially_visible = true;

        let resources = vec![
            grass,
            reeds,
            resource("clay", "Clay", Primary, 50.0),
            resource("wood", "Wood", Primary, 50.0),
            resource("fish", "Fish", Primary, 25.0),
            resource("stone", "Stone", Primary, 50.0),
            resource("mats", "Woven Mats", Crafted, 20.0),
            resource("pottery", "Pottery", Crafted, 20.0),
            resource("herbs", "Herbal Mix", Crafted, 10.0),
            resource("science", "Science", ResourceCategory::Special, 100.0),
        ];

        let mut grazer = job("grazer", "Grazer", &[("grass", 0.5)], &[]);
        grazer.unlocked_by_default = true;
        let mut gatherer = job("gatherer", "Gatherer", &[("reeds", 0.3)], &[]);
        gatherer.unlocked_by_default = true;
        let mut keeper = job("spring_keeper", "Spring Keeper", &[], &[]);
        keeper.role = Some(JobRole::SpringKeeper);
        let mut healer = job("healer", "Healer", &[], &[("herbs", 0.05)]);
        healer.role = Some(JobRole::Healer);

        let jobs = vec![
            grazer,
            gatherer,
            job("digger", "Digger", &[("clay", 0.2)], &[("grass", 0.1)]),
            job("woodgnawer", "Woodgnawer", &[("wood", 0.15)], &[("grass", 0.1)]),
            job("fisher", "Fisher", &[("fish", 0.1)], &[("reeds", 0.05)]),
            job("quarrier", "Quarrier", &[("stone", 0.1)], &[("grass", 0.1)]),
            job("crafter", "Crafter", &[("mats", 0.1)], &[("reeds", 0.15)]),
            job("potter", "Potter", &[("pottery", 0.1)], &[("clay", 0.12)]),
            job("herbalist", "Herbalist", &[("herbs", 0.1)], &[]),
            keeper,
            healer,
            job("elder", "Elder", &[("science", 0.2)], &[("fish", 0.05)]),
        ];

        let res = |id: &str| Unlock::Resource(id.into());
        let job_u = |id: &str| Unlock::Job(id.into());

        let mut natural_spring = building("natural_spring", "Natural Hot Spring", 0, BuildingCategory::Special)
            .spring(SpringType::Natural, 2, 5.0, false)
            .max(1);
        natural_spring.discoverable = true;

        let mut observatory = building("observatory", "Observatory", 4, Production)
            .priced(&[("stone", 400.0)], 2.0)
            .storage(&[("science", 200.0)])
            .requires(&[("council_circle", 1)])
            .max(1);
        observatory.effects.science_multiplier = Some(2.0);

        let buildings = vec![
            // Tier 1: settlement
            building("grass_pile", "Grass Pile", 1, Storage)
                .priced(&[], 1.0)
                .storage(&[("grass", 50.0)])
                .starts_unlocked()
                .max(10),
            building("reed_bundle", "Reed Bundle", 1, Storage)
                .priced(&[("grass", 10.0)], 1.1)
                .storage(&[("reeds", 30.0)])
                .starts_unlocked()
                .max(10),
            building("reed_shelter", "Reed Shelter", 1, Housing)
                .priced(&[("reeds", 10.0)], 1.15)
                .housing(2, 0.0)
                .starts_unlocked()
                .max(10),
            building("clay_pit", "Clay Pit", 1, Production)
                .priced(&[("reeds", 15.0)], 1.2)
                .unlocks(vec![res("clay"), job_u("digger")])
                .storage(&[("clay", 30.0)])
                .starts_unlocked()
                .max(5),
            // Tier 2: village
            building("woven_lodge", "Woven Lodge", 2, Housing)
                .priced(&[("reeds", 20.0), ("clay", 10.0)], 1.15)
                .housing(5, 2.0)
                .requires(&[("clay_pit", 1)])
                .max(10),
            building("workshop", "Workshop", 2, Production)
                .priced(&[("reeds", 30.0), ("clay", 20.0)], 1.3)
                .unlocks(vec![job_u("crafter"), res("mats")])
                .requires(&[("clay_pit", 1)])
                .max(3),
            building("expanded_pool", "Expanded Pool", 2, Production)
                .priced(&[("clay", 50.0)], 1.5)
                .spring(SpringType::Expanded, 5, 10.0, false)
                .requires(&[("natural_spring", 1)])
                .max(5),
            building("riverside_grove", "Riverside Grove", 2, Production)
                .priced(&[("reeds", 25.0), ("clay", 15.0)], 1.3)
                .unlocks(vec![res("wood"), job_u("woodgnawer")])
                .storage(&[("wood", 30.0)])
                .requires(&[("clay_pit", 1)])
                .max(5),
            building("fishing_pond", "Fishing Pond", 2, Production)
                .priced(&[("reeds", 30.0), ("clay", 20.0)], 1.3)
                .unlocks(vec![res("fish"), job_u("fisher")])
                .storage(&[("fish", 20.0)])
                .requires(&[("woven_lodge", 1)])
                .max(3),
            building("drying_rack", "Drying Rack", 2, Storage)
                .priced(&[("wood", 15.0)], 1.2)
                .storage(&[("fish", 50.0)])
                .requires(&[("riverside_grove", 1)])
                .max(5),
            building("pottery_kiln", "Pottery Kiln", 2, Production)
                .priced(&[("clay", 40.0), ("wood", 10.0)], 1.4)
                .unlocks(vec![res("pottery"), job_u("potter")])
                .storage(&[("pottery", 30.0)])
                .requires(&[("workshop", 1)])
                .max(3),
            building("storage_hut", "Storage Hut", 2, Storage)
                .priced(&[("wood", 25.0), ("mats", 10.0)], 1.3)
                .storage(&[("clay", 50.0), ("pottery", 30.0), ("mats", 20.0)])
                .requires(&[("workshop", 1)])
                .max(5),
            // Tier 3: town
            building("wooden_longhouse", "Wooden Longhouse", 3, Housing)
                .priced(&[("wood", 50.0), ("clay", 30.0), ("mats", 10.0)], 1.2)
                .housing(10, 5.0)
                .requires(&[("riverside_grove", 2), ("workshop", 1)])
                .max(5),
            building("bathhouse", "Bathhouse", 3, Production)
                .priced(&[("clay", 100.0), ("wood", 50.0), ("mats", 15.0)], 1.5)
                .spring(SpringType::Bathhouse, 8, 15.0, true)
                .requires(&[("expanded_pool", 1)])
                .max(3),
            building("council_circle", "Council Circle", 3, Production)
                .priced(&[("stone", 75.0), ("wood", 50.0)], 2.0)
                .unlocks(vec![job_u("elder"), res("science"), Unlock::Feature(Feature::Research)])
                .storage(&[("science", 100.0)])
                .requires(&[("quarry", 1)])
                .max(1),
            building("library", "Library", 3, Storage)
                .priced(&[("wood", 80.0), ("pottery", 20.0)], 1.5)
                .storage(&[("science", 150.0)])
                .requires(&[("council_circle", 1)])
                .max(3),
            building("quarry", "Quarry", 3, Production)
                .priced(&[("wood", 40.0), ("clay", 30.0)], 1.5)
                .unlocks(vec![res("stone"), job_u("quarrier")])
                .storage(&[("stone", 100.0)])
                .requires(&[("riverside_grove", 2)])
                .max(5),
            building("stone_yard", "Stone Yard", 3, Storage)
                .priced(&[("wood", 60.0), ("clay", 40.0)], 1.3)
                .storage(&[("stone", 150.0)])
                .requires(&[("quarry", 1)])
                .max(3),
            building("trading_post", "Trading Post", 3, Production)
                .priced(&[("wood", 100.0), ("pottery", 50.0)], 2.0)
                .unlocks(vec![Unlock::Feature(Feature::Trading)])
                .requires(&[("pottery_kiln", 1), ("wooden_longhouse", 1)])
                .max(1),
            building("healers_hut", "Healer's Hut", 3, Production)
                .priced(&[("wood", 60.0), ("herbs", 30.0)], 1.5)
                .unlocks(vec![job_u("healer")])
                .requires(&[("herb_garden", 1)])
                .max(2),
            building("herb_garden", "Herb Garden", 3, Production)
                .priced(&[("reeds", 50.0), ("clay", 30.0)], 1.3)
                .unlocks(vec![res("herbs"), job_u("herbalist")])
                .storage(&[("herbs", 20.0)])
                .requires(&[("woven_lodge", 2)])
                .max(3),
            // Tier 4: city
            building("stone_manor", "Stone Manor", 4, Housing)
                .priced(&[("stone", 200.0), ("wood", 100.0)], 1.3)
                .housing(20, 10.0)
                .requires(&[("quarry", 2)])
                .max(3),
            building("grand_onsen", "Grand Onsen", 4, Production)
                .priced(&[("stone", 500.0), ("clay", 200.0)], 2.0)
                .spring(SpringType::Grand, 15, 30.0, true)
                .requires(&[("bathhouse", 2)])
                .max(1),
            building("great_hall", "Great Hall", 4, Production)
                .priced(&[("stone", 300.0), ("wood", 150.0)], 2.0)
                .unlocks(vec![Unlock::Feature(Feature::Migration)])
                .requires(&[("council_circle", 1), ("stone_manor", 1)])
                .max(1),
            observatory,
            // Discovered by event
            natural_spring,
        ];

        let fx = TechEffects::default;
        let technologies = vec![
            // Survival
            tech("grass_cultivation", "Grass Cultivation", Survival, 50.0, &[],
                TechEffects { production_bonus: costs(&[("grass", 0.25)]), ..fx() }),
            tech("irrigation", "Irrigation", Survival, 150.0, &["grass_cultivation"],
                TechEffects { production_bonus: costs(&[("grass", 0.5)]), ..fx() }),
            tech("food_storage", "Food Storage", Survival, 75.0, &["grass_cultivation"],
                TechEffects { storage: costs(&[("grass", 100.0)]), ..fx() }),
            tech("preservation", "Preservation", Survival, 200.0, &["food_storage"],
                TechEffects { storage: costs(&[("fish", 50.0)]), ..fx() }),
            // Construction
            tech("reed_weaving", "Reed Weaving", Construction, 50.0, &[],
                TechEffects { production_bonus: costs(&[("reeds", 0.25)]), ..fx() }),
            tech("woodworking", "Woodworking", Construction, 75.0, &["reed_weaving"],
                TechEffects { production_bonus: costs(&[("wood", 0.25)]), ..fx() }),
            tech("clay_working", "Clay Working", Construction, 100.0, &["reed_weaving"],
                TechEffects { production_bonus: costs(&[("clay", 0.25)]), ..fx() }),
            tech("advanced_woodworking", "Advanced Woodworking", Construction, 175.0, &["woodworking"],
                TechEffects { production_bonus: costs(&[("wood", 0.5)]), ..fx() }),
            tech("stonecraft", "Stonecraft", Construction, 250.0, &["clay_working"],
                TechEffects { production_bonus: costs(&[("stone", 0.25)]), ..fx() }),
            tech("advanced_pottery", "Advanced Pottery", Construction, 175.0, &["clay_working"],
                TechEffects { production_bonus: costs(&[("pottery", 0.5)]), ..fx() }),
            tech("mats_weaving", "Mats Weaving", Construction, 125.0, &["reed_weaving"],
                TechEffects { production_bonus: costs(&[("mats", 0.5)]), ..fx() }),
            tech("resource_storage", "Resource Storage", Construction, 300.0,
                &["food_storage", "clay_working"],
                TechEffects { storage_multiplier: 0.25, ..fx() }),
            tech("grand_storage", "Grand Storage", Construction, 800.0,
                &["resource_storage", "stonecraft"],
                TechEffects { storage_multiplier: 0.5, ..fx() }),
            // Hot springs
            tech("spring_discovery", "Spring Discovery", Springs, 75.0, &[],
                TechEffects { spring_discovery: Some(2.0), ..fx() }),
            tech("pool_expansion", "Pool Expansion", Springs, 150.0, &["spring_discovery"],
                TechEffects { spring_capacity: 2, ..fx() }),
            tech("steam_engineering", "Steam Engineering", Springs, 300.0, &["pool_expansion"],
                TechEffects { warmth_bonus: 0.5, ..fx() }),
            tech("herbal_soaking", "Herbal Soaking", Springs, 100.0, &["spring_discovery"],
                TechEffects { spring_happiness: 5.0, ..fx() }),
            tech("medicinal_baths", "Medicinal Baths", Springs, 250.0, &["herbal_soaking"],
                TechEffects { relaxation_duration: Some(2.0), ..fx() }),
            // Social
            tech("community_bonds", "Community Bonds", Social, 50.0, &[],
                TechEffects { base_happiness: 10.0, ..fx() }),
            tech("visitor_welcome", "Visitor Welcome", Social, 125.0, &["community_bonds"],
                TechEffects { visitor_duration: Some(1.5), ..fx() }),
            tech("interspecies_diplomacy", "Interspecies Diplomacy", Social, 300.0, &["visitor_welcome"],
                TechEffects { visitor_bonus: Some(2.0), ..fx() }),
            tech("oral_tradition", "Oral Tradition", Social, 100.0, &["community_bonds"],
                TechEffects { science_bonus: 0.25, ..fx() }),
            tech("writing", "Writing", Social, 200.0, &["oral_tradition"],
                TechEffects { science_bonus: 0.5, ..fx() }),
            tech("philosophy", "Philosophy", Social, 400.0, &["writing"],
                TechEffects { base_happiness: 25.0, ..fx() }),
        ];

        let springs = ["natural_spring", "expanded_pool", "bathhouse", "grand_onsen"];
        let visitors = vec![
            visitor("ducks", "Ducks",
                VisitorBonus::Production { resource: "reeds".into(), amount: 0.1 },
                2.0, &["fishing_pond"], 1, 3000),
            visitor("turtles", "Turtles", VisitorBonus::AllProduction { amount: 0.05 },
                3.0, &springs, 2, 4000),
            visitor("birds", "Birds", VisitorBonus::WeatherForecast,
                2.0, &["riverside_grove"], 1, 2000),
            visitor("monkeys", "Monkeys",
                VisitorBonus::Production { resource: "science".into(), amount: 0.2 },
                5.0, &["council_circle", "observatory"], 3, 3500),
            visitor("butterflies", "Butterflies", VisitorBonus::Happiness { amount: 15.0 },
                10.0, &["herb_garden"], 2, 1500),
            visitor("caimans", "Caimans",
                VisitorBonus::Production { resource: "fish".into(), amount: 0.15 },
                -2.0, &["fishing_pond", "trading_post"], 4, 5000),
            visitor("frogs", "Frogs",
                VisitorBonus::Production { resource: "herbs".into(), amount: 0.1 },
                3.0, &["herb_garden", "fishing_pond"], 1, 2500),
            visitor("rabbits", "Rabbits",
                VisitorBonus::Production { resource: "grass".into(), amount: 0.1 },
                5.0, &["grass_pile", "woven_lodge"], 1, 2000),
            visitor("owls", "Owls", VisitorBonus::NightBonus { amount: 0.3 },
                4.0, &["council_circle", "observatory"], 3, 3000),
            visitor("hippos", "Hippos", VisitorBonus::StorageBonus { amount: 0.25 },
                4.0, &["fishing_pond", "expanded_pool", "bathhouse", "grand_onsen"], 3, 4500),
            visitor("cats", "Cats", VisitorBonus::AllProduction { amount: 0.12 },
                6.0, &["woven_lodge", "wooden_longhouse", "stone_manor", "bathhouse"], 2, 3500),
        ];

        let prestige = PrestigeConfig {
            upgrades: vec![
                upgrade("ancestral_knowledge", "Ancestral Knowledge", 10,
                    UpgradeEffect::StartResearch("grass_cultivation".into())),
                upgrade("inherited_tools", "Inherited Tools", 15, UpgradeEffect::GatheringBonus(0.25)),
                upgrade("hot_spring_sense", "Hot Spring Sense", 20, UpgradeEffect::SpringDiscovery(1.5)),
                upgrade("friendly_reputation", "Friendly Reputation", 25, UpgradeEffect::VisitorRate(1.5)),
                upgrade("elder_wisdom", "Elder Wisdom", 50, UpgradeEffect::ScienceBonus(0.5)),
                upgrade("master_builders", "Master Builders", 75, UpgradeEffect::BuildingDiscount(0.2)),
                upgrade("warmth_memory", "Warmth Memory", 30, UpgradeEffect::StartWarmth(0.75)),
                upgrade("larger_family", "Larger Family", 40, UpgradeEffect::StartPopulation(4)),
                upgrade("bountiful_start", "Bountiful Start", 35, UpgradeEffect::StartResources(50.0)),
            ],
            milestones: vec![
                MilestoneAward {
                    building: "grand_onsen".into(),
                    points: 10,
                    label: "Grand Onsen".into(),
                },
                MilestoneAward {
                    building: "great_hall".into(),
                    points: 5,
                    label: "Great Hall".into(),
                },
            ],
            start_resource_ids: vec!["grass".into(), "reeds".into()],
            default_start_warmth: 0.5,
        };

        let odds = |entries: &[(Weather, f64)]| -> Vec<WeatherOdds> {
            entries
                .iter()
                .map(|(weather, probability)| WeatherOdds { weather: *weather, probability: *probability })
                .collect()
        };
        let env = |happiness: f64, outdoor_work: Option<f64>, visitor_chance: Option<f64>| {
            EnvironmentEffects { happiness, outdoor_work, visitor_chance }
        };

        let seasons = SeasonConfig {
            day_length: 600,
            season_length: 6000,
            weather_duration: 1200,
            weather_tables: [
                (Season::Spring, odds(&[(Weather::Sunny, 0.4), (Weather::Cloudy, 0.3), (Weather::Rain, 0.3)])),
                (Season::Summer, odds(&[(Weather::Sunny, 0.6), (Weather::Cloudy, 0.2), (Weather::HeatWave, 0.2)])),
                (Season::Autumn, odds(&[(Weather::Sunny, 0.3), (Weather::Cloudy, 0.4), (Weather::Rain, 0.3)])),
                (Season::Winter, odds(&[
                    (Weather::Sunny, 0.2),
                    (Weather::Cloudy, 0.3),
                    (Weather::ColdSnap, 0.3),
                    (Weather::Snow, 0.2),
                ])),
            ]
            .into(),
            season_effects: [
                (Season::Spring, env(0.0, None, Some(1.5))),
                (Season::Summer, env(10.0, None, None)),
                (Season::Autumn, env(0.0, None, None)),
                (Season::Winter, env(-5.0, Some(0.5), None)),
            ]
            .into(),
            weather_effects: [
                (Weather::Sunny, env(5.0, None, None)),
                (Weather::Cloudy, env(0.0, None, None)),
                (Weather::Rain, env(-5.0, Some(0.7), None)),
                (Weather::HeatWave, env(-3.0, None, None)),
                (Weather::ColdSnap, env(-10.0, Some(0.5), None)),
                (Weather::Snow, env(3.0, Some(0.6), None)),
            ]
            .into(),
        };

        let thermal = ThermalConfig {
            initial_warmth: 50.0,
            unheated_max_warmth: 100.0,
            base_max_warmth: 50.0,
            max_warmth_per_spring: 10.0,
            warmth_ceiling: 100.0,
            consumption_per_member: 0.3,
            night_consumption: 1.5,
            weather_generation: [
                (Weather::Rain, 0.8),
                (Weather::ColdSnap, 0.5),
                (Weather::HeatWave, 0.7),
            ]
            .into(),
            season_consumption: [
                (Season::Winter, 2.0),
                (Season::Autumn, 1.3),
                (Season::Summer, 0.7),
            ]
            .into(),
            weather_consumption: [(Weather::ColdSnap, 2.0), (Weather::Sunny, 0.8)].into(),
            keeper_bonus: 0.1,
            net_scale: 0.1,
            soak_duration: 100,
            relaxation_duration: 200,
        };

        let workforce = WorkforceConfig {
            start_adults: 2,
            base_housing: 4,
            base_happiness: 50.0,
            growth_threshold: 100.0,
            base_growth_rate: 0.1,
            happy_growth_per_point: 0.01,
            unhappy_growth_per_point: 0.02,
            food_surplus_per_member: 5.0,
            food_surplus_divisor: 50.0,
            max_food_growth: 0.1,
            maturation_chance: 0.001,
            overcrowding_penalty: 5.0,
            food_buffer_per_member: 2.0,
            food_shortage_penalty: 3.0,
            warmth_bonus_step: 2.0,
            cold_penalty_step: 3.0,
            healer_happiness: 3.0,
            food_resource: "grass".into(),
            food_per_member: 0.05,
        };

        Self {
            resources,
            jobs,
            buildings,
            technologies,
            visitors,
            prestige,
            seasons,
            thermal,
            workforce,
            productivity: ProductivityConfig {
                recompute_interval: 10,
                night_outdoor_penalty: 0.7,
                relaxation_bonus: 0.25,
                science_resource: "science".into(),
            },
            events: RandomEventConfig {
                spring_discovery_chance: 0.0005,
                discovery_grace_ticks: 1000,
                visitor_chance: 0.0003,
                natural_spring: "natural_spring".into(),
            },
            gathering: GatheringConfig {
                gatherable: vec!["grass".into(), "reeds".into()],
                amount: 1.0,
            },
        }
    }
}
