//! Per-cell update rules. Every rule reads the frozen grid of the current tick
//! and writes only into the next value of one cell.

mod clouds;
mod neighborhood;
mod pollution;
mod temperature;
mod terrain;
mod wind;

use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregates;
use crate::components::Cell;
use crate::world::World;

pub use clouds::{
    next_cloud_state, transition, CloudRule, CloudThresholds, InvalidThresholdRange, ThresholdRange,
    MAX_CLOUD_THRESHOLD,
};
pub use neighborhood::{neighbor_average, neighboring_clouds, upwind_neighbors, wind_influence};
pub use pollution::{
    base_growth, next_pollution, rain_effect, EmissionsRule, PollutionRule, CITY_EMISSION_STEP,
};
pub use temperature::{cloud_effect, next_temperature, TemperatureRule, TemperatureWeights};
pub use terrain::{reclassify, TerrainRule};
pub use wind::{next_wind_direction, next_wind_speed, terrain_modifier, WindRule};

/// Grid-wide means the rules see for the whole tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Globals {
    pub avg_temperature: f64,
    pub avg_pollution: f64,
}

impl From<Aggregates> for Globals {
    fn from(value: Aggregates) -> Self {
        Self {
            avg_temperature: value.avg_temperature,
            avg_pollution: value.avg_pollution,
        }
    }
}

pub struct RuleContext<'a> {
    pub world: &'a World,
    pub globals: Globals,
    pub thresholds: CloudThresholds,
}

pub trait CellRule: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, ctx: &RuleContext<'_>, cell: &Cell, next: &mut Cell);
}

/// The full rule set in the order a tick must apply it.
pub fn standard_rules() -> Vec<Box<dyn CellRule>> {
    vec![
        Box::new(TemperatureRule::new()),
        Box::new(PollutionRule::new()),
        Box::new(WindRule::new()),
        Box::new(CloudRule::new()),
        Box::new(TerrainRule::new()),
        Box::new(EmissionsRule::new()),
    ]
}
