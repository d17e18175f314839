pub mod aggregate;
pub mod components;
pub mod engine;
pub mod logging;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod sink;
pub mod systems;
pub mod web;
pub mod world;

pub use aggregate::Aggregates;
pub use components::{Cell, CloudState, Terrain, WindDirection};
pub use engine::{Engine, EngineBuilder, EngineSettings, TickSummary};
pub use scenario::{Scenario, ScenarioLoader};
pub use sink::{AverageRecord, AverageSink, FileSink, MemorySink};
pub use world::{GridError, World, WorldSnapshot};
