//! sim-runner: headless runner for the capybara colony simulation.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 6000 --db colony.db
//!   sim-runner --seed 12345 --config colony.json --ipc-mode
//!   sim-runner --db colony.db --resume --ticks 600
//!
//! IPC mode reads one JSON request per line on stdin and answers each
//! with one JSON state line on stdout.

use anyhow::Result;
use capys_core::{
    command::PlayerCommand,
    config::ColonyConfig,
    engine::SimEngine,
    event::SimEvent,
    prestige_subsystem::LegacyPoints,
    resource_subsystem::ResourceRow,
    store::SimStore,
    types::{new_run_id, Tick},
    workforce_subsystem::{HappinessFactor, JobRow},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Tick { count: u64 },
    Elapsed { ms: u64 },
    Command { command: PlayerCommand },
    Save,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick:            Tick,
    paused:          bool,
    day:             u64,
    season:          &'static str,
    weather:         &'static str,
    night:           bool,
    adults:          u32,
    pups:            u32,
    max_population:  u32,
    happiness:       f64,
    warmth_percent:  f64,
    productivity:    f64,
    resources:       Vec<ResourceRow>,
    jobs:            Vec<JobRow>,
    factors:         Vec<HappinessFactor>,
    visitors:        Vec<String>,
    legacy:          LegacyPoints,
    legacy_banked:   u64,
    migrations:      u32,
    accepted:        Option<bool>,
    recent_events:   Vec<SimEvent>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 6000u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let resume = args.iter().any(|a| a == "--resume");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let config_path = string_arg(&args, "--config");

    if !ipc_mode {
        println!("Capybara Colony: sim-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  db:        {db}");
        println!("  config:    {}", config_path.unwrap_or("(standard)"));
        println!();
    }

    let config = match config_path {
        Some(path) => ColonyConfig::load(path)?,
        None => ColonyConfig::standard(),
    };

    let store = SimStore::open(db)?;
    store.migrate()?;

    let mut engine = SimEngine::with_config(new_run_id(), seed, config)?;
    engine.attach_store(store)?;
    if resume {
        if engine.resume_latest()? {
            log::info!("resumed {} at tick {}", engine.run_id, engine.clock.current_tick);
        } else {
            log::warn!("no save found in {db}, starting fresh");
        }
    }

    if ipc_mode {
        run_ipc_loop(&mut engine)?;
    } else {
        let started = chrono::Utc::now();
        engine.run_ticks(ticks);
        engine.save()?;
        let elapsed = chrono::Utc::now() - started;
        print_summary(&engine, ticks);
        println!();
        println!("  wall time:           {} ms", elapsed.num_milliseconds());
    }

    Ok(())
}

fn run_ipc_loop(engine: &mut SimEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        let accepted = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => None,
            IpcCommand::Tick { count } => {
                engine.run_ticks(count);
                None
            }
            IpcCommand::Elapsed { ms } => {
                engine.advance_real_time(ms);
                None
            }
            IpcCommand::Command { command } => Some(engine.apply_command(command)),
            IpcCommand::Save => {
                if let Err(e) = engine.save() {
                    log::warn!("save failed: {e}");
                    Some(false)
                } else {
                    Some(true)
                }
            }
        };
        let state = build_ui_state(engine, accepted);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state(engine: &SimEngine, accepted: Option<bool>) -> UiState {
    let seasons = engine.seasons();
    let workforce = engine.workforce();
    UiState {
        tick:           engine.clock.current_tick,
        paused:         engine.clock.paused,
        day:            seasons.day(),
        season:         seasons.season().label(),
        weather:        seasons.weather().label(),
        night:          seasons.is_night(),
        adults:         workforce.adults(),
        pups:           workforce.pups(),
        max_population: workforce.max_population(),
        happiness:      workforce.happiness(),
        warmth_percent: engine.hot_springs().warmth_percent(),
        productivity:   engine.productivity().total(),
        resources:      engine.visible_resources(),
        jobs:           engine.job_rows(),
        factors:        engine.happiness_factors(),
        visitors:       engine.visitors().current().iter().map(|v| v.species.clone()).collect(),
        legacy:         engine.legacy_points(),
        legacy_banked:  engine.prestige().legacy_points(),
        migrations:     engine.prestige().migration_count(),
        accepted,
        recent_events:  engine.recent_events().cloned().collect(),
    }
}

fn print_summary(engine: &SimEngine, ticks: u64) {
    let seasons = engine.seasons();
    let workforce = engine.workforce();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:         {}", engine.run_id);
    println!("  ticks run:      {ticks}");
    println!("  final tick:     {}", engine.clock.current_tick);
    println!("  day:            {} ({}, {})", seasons.day(), seasons.season().label(), seasons.weather().label());
    println!("  population:     {} adults, {} pups / {}", workforce.adults(), workforce.pups(), workforce.max_population());
    println!("  happiness:      {:.0}", workforce.happiness());
    println!("  warmth:         {:.0}%", engine.hot_springs().warmth_percent());
    println!("  buildings:      {}", engine.buildings().total_count());
    println!("  researched:     {}", engine.research_tree().researched_count());
    println!("  species met:    {}", engine.visitors().encountered_count());
    println!("  save failures:  {}", engine.save_failures());

    println!();
    println!("=== RESOURCES ===");
    for row in engine.visible_resources() {
        println!(
            "  {:<12} {:>8.1} / {:<6.0} ({:+.2}/tick)",
            row.name, row.amount, row.capacity, row.net_rate
        );
    }

    println!();
    println!("=== LEGACY IF MIGRATED NOW ===");
    let legacy = engine.legacy_points();
    for line in &legacy.breakdown {
        println!("  {:<20} {:>4}  {}", line.name, line.value, line.detail);
    }
    println!("  total:               {:>4}", legacy.total);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
