//! capys-core: deterministic simulation core for a capybara hot-spring
//! colony.
//!
//! Everything observable flows through `engine::SimEngine`. Components
//! are plain serializable state; the engine sequences them.

pub mod building_subsystem;
pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod hot_spring_subsystem;
pub mod prestige_subsystem;
pub mod productivity;
pub mod research_subsystem;
pub mod resource_subsystem;
pub mod rng;
pub mod season_subsystem;
pub mod snapshot;
pub mod store;
pub mod subsystem;
pub mod types;
pub mod visitor_subsystem;
pub mod workforce_subsystem;
