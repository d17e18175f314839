use crate::components::{Cell, Terrain, WindDirection, MAX_WIND_SPEED, MIN_WIND_SPEED};
use crate::world::World;

use super::{CellRule, RuleContext};

const WIND_SCALING: f64 = 0.02;

pub fn terrain_modifier(terrain: Terrain) -> f64 {
    match terrain {
        Terrain::Sea => 1.2,
        Terrain::Forest => 0.5,
        Terrain::City => 0.8,
        Terrain::Glacier | Terrain::Land => 1.0,
    }
}

/// Wind turns toward the neighbor with the largest temperature gap. Ties keep
/// the first neighbor in North, South, West, East order. `None` when the cell
/// has no neighbors.
pub fn next_wind_direction(world: &World, cell: &Cell) -> Option<WindDirection> {
    let mut best: Option<(f64, WindDirection)> = None;
    for (side, neighbor) in world.neighbors(cell.row(), cell.col()) {
        let diff = (cell.temperature() - neighbor.temperature()).abs();
        if best.map_or(true, |(max, _)| diff > max) {
            best = Some((diff, side.incoming_wind()));
        }
    }
    best.map(|(_, direction)| direction)
}

pub fn next_wind_speed(world: &World, cell: &Cell) -> f64 {
    let squared: f64 = world
        .neighbors(cell.row(), cell.col())
        .map(|(_, n)| (cell.temperature() - n.temperature()).powi(2))
        .sum();
    let base = WIND_SCALING * squared.sqrt() * terrain_modifier(cell.terrain());
    base.clamp(MIN_WIND_SPEED, MAX_WIND_SPEED)
}

pub struct WindRule;

impl WindRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CellRule for WindRule {
    fn name(&self) -> &str {
        "wind"
    }

    fn apply(&self, ctx: &RuleContext<'_>, cell: &Cell, next: &mut Cell) {
        next.set_wind_speed(next_wind_speed(ctx.world, cell));
        if let Some(direction) = next_wind_direction(ctx.world, cell) {
            next.set_wind_direction(direction);
        }
    }
}
