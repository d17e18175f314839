use crate::components::{Cell, Terrain};

use super::{CellRule, RuleContext};

/// Terrain a cell turns into at `temperature`.
pub fn reclassify(terrain: Terrain, temperature: f64) -> Terrain {
    match terrain {
        Terrain::Forest if temperature > 40.0 => Terrain::Land,
        Terrain::Glacier if temperature >= 0.0 => Terrain::Sea,
        Terrain::Sea if temperature < 0.0 => Terrain::Glacier,
        Terrain::City if temperature > 50.0 => Terrain::Land,
        other => other,
    }
}

/// Reads the freshly computed temperature of the next cell, so it must run
/// after the temperature rule.
pub struct TerrainRule;

impl TerrainRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerrainRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CellRule for TerrainRule {
    fn name(&self) -> &str {
        "terrain"
    }

    fn apply(&self, _ctx: &RuleContext<'_>, _cell: &Cell, next: &mut Cell) {
        next.set_terrain(reclassify(next.terrain(), next.temperature()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glacier_melts_at_zero() {
        assert_eq!(reclassify(Terrain::Glacier, 0.0), Terrain::Sea);
        assert_eq!(reclassify(Terrain::Glacier, -0.0001), Terrain::Glacier);
    }

    #[test]
    fn forest_boundary_is_exclusive() {
        assert_eq!(reclassify(Terrain::Forest, 40.0), Terrain::Forest);
        assert_eq!(reclassify(Terrain::Forest, 40.0001), Terrain::Land);
    }

    #[test]
    fn sea_freezes_below_zero() {
        assert_eq!(reclassify(Terrain::Sea, -0.5), Terrain::Glacier);
        assert_eq!(reclassify(Terrain::Sea, 0.0), Terrain::Sea);
    }

    #[test]
    fn city_collapses_above_fifty() {
        assert_eq!(reclassify(Terrain::City, 50.0), Terrain::City);
        assert_eq!(reclassify(Terrain::City, 50.5), Terrain::Land);
    }

    #[test]
    fn land_never_changes() {
        for temperature in [-100.0, 0.0, 45.0, 1000.0] {
            assert_eq!(reclassify(Terrain::Land, temperature), Terrain::Land);
        }
    }

    #[test]
    fn reclassification_keeps_fields() {
        let mut next = Cell::new(1, 1, Terrain::Glacier);
        next.set_temperature(2.0);
        next.set_pollution(0.4);
        next.set_terrain(reclassify(next.terrain(), next.temperature()));
        assert_eq!(next.terrain(), Terrain::Sea);
        assert_eq!(next.temperature(), 2.0);
        assert_eq!(next.pollution(), 0.4);
    }
}
