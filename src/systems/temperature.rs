use crate::components::{Cell, CloudState, Terrain};
use crate::world::World;

use super::neighborhood::{neighbor_average, wind_influence};
use super::{CellRule, Globals, RuleContext};

const TEMPERATURE_DAMPENING: f64 = 0.05;
const DELTA_SCALE: f64 = 0.1;
const BASELINE_GROWTH: f64 = 0.1;

/// Weights of the linear temperature combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureWeights {
    pub current: f64,
    pub neighbors: f64,
    pub pollution: f64,
    pub wind: f64,
}

impl TemperatureWeights {
    pub fn for_terrain(terrain: Terrain) -> Self {
        match terrain {
            Terrain::Glacier => Self {
                current: 0.05,
                neighbors: 1.5,
                pollution: 0.6,
                wind: 0.00001,
            },
            Terrain::City => Self {
                current: 0.4,
                neighbors: 0.01,
                pollution: 0.8,
                wind: 0.00001,
            },
            Terrain::Sea | Terrain::Forest | Terrain::Land => Self {
                current: 0.6,
                neighbors: 0.9,
                pollution: 0.9,
                wind: 0.00001,
            },
        }
    }
}

pub fn cloud_effect(cloud: CloudState) -> f64 {
    match cloud {
        CloudState::Clear | CloudState::Cloud => 0.0,
        CloudState::Rain => -0.0005,
    }
}

/// Next-tick temperature. Never lower than the current value.
pub fn next_temperature(world: &World, cell: &Cell, globals: Globals) -> f64 {
    let current = cell.temperature();
    let weights = TemperatureWeights::for_terrain(cell.terrain());
    let baseline = (current - globals.avg_temperature).abs() * BASELINE_GROWTH;
    let raw = weights.current * current
        + weights.neighbors * neighbor_average(world, cell, Cell::temperature)
        + weights.pollution * cell.pollution()
        + weights.wind * wind_influence(world, cell, Cell::temperature)
        + baseline
        + cloud_effect(cell.cloud());
    let damped = current
        + TEMPERATURE_DAMPENING * ((raw - current).abs() * DELTA_SCALE * globals.avg_pollution);
    damped.max(current)
}

pub struct TemperatureRule;

impl TemperatureRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TemperatureRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CellRule for TemperatureRule {
    fn name(&self) -> &str {
        "temperature"
    }

    fn apply(&self, ctx: &RuleContext<'_>, cell: &Cell, next: &mut Cell) {
        next.set_temperature(next_temperature(ctx.world, cell, ctx.globals));
    }
}
