use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{self, Aggregates};
use crate::components::{Cell, CloudState, Terrain, WindDirection};

pub const MIN_GRID_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid size must be at least {}, got {0}", MIN_GRID_SIZE)]
    InvalidSize(usize),
    #[error("cannot aggregate over an empty grid")]
    EmptyGrid,
}

/// Orthogonal neighbor position relative to a cell. Declaration order is the
/// scan order used everywhere neighbors are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    South,
    West,
    East,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::South, Side::West, Side::East];

    /// Direction of wind that arrives at a cell from this side.
    pub fn incoming_wind(self) -> WindDirection {
        match self {
            Side::North => WindDirection::S,
            Side::South => WindDirection::N,
            Side::West => WindDirection::E,
            Side::East => WindDirection::W,
        }
    }

    fn offset(self, row: usize, col: usize, size: usize) -> Option<(usize, usize)> {
        match self {
            Side::North => row.checked_sub(1).map(|r| (r, col)),
            Side::South => (row + 1 < size).then_some((row + 1, col)),
            Side::West => col.checked_sub(1).map(|c| (row, c)),
            Side::East => (col + 1 < size).then_some((row, col + 1)),
        }
    }
}

/// Band widths that carve a square grid into its terrain regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerrainBands {
    pub sea_border: usize,
    pub glacier_width: usize,
    pub land_start: usize,
    pub land_end: usize,
}

impl TerrainBands {
    pub fn for_size(size: usize) -> Self {
        let land_start = size / 5;
        Self {
            sea_border: size / 7,
            glacier_width: size / 6,
            land_start,
            land_end: land_start + size / 4,
        }
    }

    /// Terrain for `(row, col)`. Checks run glacier, sea, land, forest and the
    /// first match wins; everything left over is city.
    pub fn classify(&self, size: usize, row: usize, col: usize) -> Terrain {
        let near_low = |v: usize| v < self.glacier_width;
        let near_high = |v: usize| v + self.glacier_width >= size;
        if (near_low(row) || near_high(row)) && (near_low(col) || near_high(col)) {
            return Terrain::Glacier;
        }

        let in_sea = |v: usize| v < self.sea_border || v + self.sea_border >= size;
        if in_sea(row) || in_sea(col) {
            return Terrain::Sea;
        }

        let in_land = |v: usize| (self.land_start..self.land_end).contains(&v);
        if in_land(row) && in_land(col) {
            return Terrain::Land;
        }

        let ring_low = self.land_start.saturating_sub(self.sea_border)..self.land_start;
        let ring_high = self.land_end..self.land_end + self.sea_border;
        let in_ring = |v: usize| ring_low.contains(&v) || ring_high.contains(&v);
        if in_ring(row) || in_ring(col) {
            return Terrain::Forest;
        }

        Terrain::City
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub scenario: String,
    pub tick: u64,
    pub size: usize,
    pub aggregates: Aggregates,
    pub terrain_counts: BTreeMap<Terrain, usize>,
    pub cells: Vec<Cell>,
}

/// Square grid of cells stored row-major.
#[derive(Debug, Clone)]
pub struct World {
    size: usize,
    tick: u64,
    cells: Vec<Cell>,
}

impl World {
    pub fn new(size: usize) -> Result<Self, GridError> {
        if size < MIN_GRID_SIZE {
            return Err(GridError::InvalidSize(size));
        }
        let bands = TerrainBands::for_size(size);
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                cells.push(Cell::new(row, col, bands.classify(size, row, col)));
            }
        }
        Ok(Self {
            size,
            tick: 0,
            cells,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.size)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|idx| &self.cells[idx])
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.index(row, col).map(move |idx| &mut self.cells[idx])
    }

    /// In-bounds orthogonal neighbors in North, South, West, East order.
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (Side, &Cell)> + '_ {
        Side::ALL.into_iter().filter_map(move |side| {
            side.offset(row, col, self.size)
                .and_then(|(r, c)| self.cell(r, c))
                .map(|cell| (side, cell))
        })
    }

    pub fn aggregates(&self) -> Result<Aggregates, GridError> {
        aggregate::summarize(&self.cells)
    }

    pub fn terrain_counts(&self) -> BTreeMap<Terrain, usize> {
        let mut counts = BTreeMap::new();
        for cell in &self.cells {
            *counts.entry(cell.terrain()).or_insert(0) += 1;
        }
        counts
    }

    /// Puts a cloud over every clear glacier. Returns how many were seeded.
    pub fn seed_glacier_clouds(&mut self) -> usize {
        let mut seeded = 0;
        for cell in &mut self.cells {
            if cell.terrain() == Terrain::Glacier && cell.cloud() == CloudState::Clear {
                cell.set_cloud(CloudState::Cloud);
                seeded += 1;
            }
        }
        seeded
    }

    pub fn snapshot(&self, scenario: &str) -> Result<WorldSnapshot, GridError> {
        Ok(WorldSnapshot {
            scenario: scenario.to_string(),
            tick: self.tick,
            size: self.size,
            aggregates: self.aggregates()?,
            terrain_counts: self.terrain_counts(),
            cells: self.cells.clone(),
        })
    }

    /// Swaps in a fully computed next buffer and advances the tick counter.
    /// The previous cells are left in `next` for reuse.
    pub(crate) fn swap_cells(&mut self, next: &mut Vec<Cell>) {
        debug_assert_eq!(next.len(), self.cells.len());
        std::mem::swap(&mut self.cells, next);
        self.tick += 1;
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.size && col < self.size).then_some(row * self.size + col)
    }
}
