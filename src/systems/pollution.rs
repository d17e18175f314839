use crate::components::{Cell, CloudState, Terrain};
use crate::world::World;

use super::neighborhood::{neighbor_average, wind_influence};
use super::{CellRule, Globals, RuleContext};

const OWN_WEIGHT: f64 = 0.2;
const NEIGHBOR_WEIGHT: f64 = 0.1;
const POLLUTION_DAMPENING: f64 = 0.002;
const DELTA_SCALE: f64 = 0.05;
const GROWTH_BUCKET: f64 = 0.02;
const RAIN_WASHOUT: f64 = -0.0005;

/// Added to a city's generated pollution every tick.
pub const CITY_EMISSION_STEP: f64 = 0.1;

pub fn rain_effect(cloud: CloudState) -> f64 {
    if cloud == CloudState::Rain {
        RAIN_WASHOUT
    } else {
        0.0
    }
}

/// Whole 0.02-wide buckets between the cell and the global mean, times the
/// cell's own pollution.
pub fn base_growth(pollution: f64, avg_pollution: f64) -> f64 {
    ((pollution - avg_pollution).abs() / GROWTH_BUCKET).floor() * pollution
}

/// Next-tick pollution. Never lower than the current value.
pub fn next_pollution(world: &World, cell: &Cell, globals: Globals) -> f64 {
    let current = cell.pollution();
    let raw = OWN_WEIGHT * current
        + NEIGHBOR_WEIGHT * neighbor_average(world, cell, Cell::pollution)
        + cell.generated_pollution()
        - cell.absorbed_pollution()
        + wind_influence(world, cell, Cell::pollution)
        + rain_effect(cell.cloud())
        + base_growth(current, globals.avg_pollution);
    let damped =
        current + POLLUTION_DAMPENING * ((raw - current).abs() * DELTA_SCALE * globals.avg_pollution);
    damped.max(current)
}

pub struct PollutionRule;

impl PollutionRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PollutionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CellRule for PollutionRule {
    fn name(&self) -> &str {
        "pollution"
    }

    fn apply(&self, ctx: &RuleContext<'_>, cell: &Cell, next: &mut Cell) {
        next.set_pollution(next_pollution(ctx.world, cell, ctx.globals));
    }
}

/// Grows the pollution source of cells that are cities after reclassification.
pub struct EmissionsRule;

impl EmissionsRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmissionsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CellRule for EmissionsRule {
    fn name(&self) -> &str {
        "emissions"
    }

    fn apply(&self, _ctx: &RuleContext<'_>, _cell: &Cell, next: &mut Cell) {
        if next.terrain() == Terrain::City {
            next.set_generated_pollution(next.generated_pollution() + CITY_EMISSION_STEP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_counts_whole_buckets() {
        assert_eq!(base_growth(0.05, 0.04), 0.0);
        assert_eq!(base_growth(0.10, 0.05), 2.0 * 0.10);
        assert_eq!(base_growth(0.01, 0.08), 3.0 * 0.01);
    }

    #[test]
    fn only_rain_washes_out() {
        assert_eq!(rain_effect(CloudState::Rain), -0.0005);
        assert_eq!(rain_effect(CloudState::Cloud), 0.0);
        assert_eq!(rain_effect(CloudState::Clear), 0.0);
    }

    #[test]
    fn matches_hand_computed_value() {
        let world = World::new(10).unwrap();
        let cell = world.cell(5, 5).unwrap().clone();
        let globals = Globals {
            avg_temperature: 20.0,
            avg_pollution: 0.03,
        };
        let neighbor_avg = neighbor_average(&world, &cell, Cell::pollution);
        let wind = wind_influence(&world, &cell, Cell::pollution);
        let growth = base_growth(0.05, 0.03);
        let raw = 0.2 * 0.05 + 0.1 * neighbor_avg + 0.05 - 0.0 + wind + growth;
        let expected = 0.05 + 0.002 * ((raw - 0.05).abs() * 0.05 * 0.03);
        let actual = next_pollution(&world, &cell, globals);
        assert!((actual - expected).abs() < 1e-12, "{actual} vs {expected}");
    }

    #[test]
    fn never_decreases_or_goes_negative() {
        let mut world = World::new(12).unwrap();
        world.cell_mut(6, 6).unwrap().set_cloud(CloudState::Rain);
        let globals = Globals {
            avg_temperature: 20.0,
            avg_pollution: 0.5,
        };
        for cell in world.cells() {
            let next = next_pollution(&world, cell, globals);
            assert!(next >= cell.pollution());
            assert!(next >= 0.0);
        }
    }
}
