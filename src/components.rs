use serde::{Deserialize, Serialize};

pub const MIN_WIND_SPEED: f64 = 0.1;
pub const MAX_WIND_SPEED: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Sea,
    Forest,
    Land,
    City,
    Glacier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindDirection {
    N,
    S,
    E,
    W,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudState {
    #[default]
    Clear,
    Cloud,
    Rain,
}

/// Starting values a cell takes from its terrain at grid construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainDefaults {
    pub temperature: f64,
    pub pollution: f64,
    pub wind_direction: WindDirection,
    pub wind_speed: f64,
    pub generated_pollution: f64,
    pub absorbed_pollution: f64,
}

impl Terrain {
    pub const ALL: [Terrain; 5] = [
        Terrain::Sea,
        Terrain::Forest,
        Terrain::Land,
        Terrain::City,
        Terrain::Glacier,
    ];

    pub fn defaults(self) -> TerrainDefaults {
        match self {
            Terrain::Sea => TerrainDefaults {
                temperature: 20.0,
                pollution: 0.02,
                wind_direction: WindDirection::E,
                wind_speed: 0.2,
                generated_pollution: 0.0,
                absorbed_pollution: 0.01,
            },
            Terrain::Forest => TerrainDefaults {
                temperature: 15.0,
                pollution: 0.01,
                wind_direction: WindDirection::N,
                wind_speed: 0.1,
                generated_pollution: 0.0,
                absorbed_pollution: 0.02,
            },
            Terrain::Land => TerrainDefaults {
                temperature: 25.0,
                pollution: 0.03,
                wind_direction: WindDirection::S,
                wind_speed: 0.3,
                generated_pollution: 0.005,
                absorbed_pollution: 0.0,
            },
            Terrain::City => TerrainDefaults {
                temperature: 25.0,
                pollution: 0.05,
                wind_direction: WindDirection::E,
                wind_speed: 0.2,
                generated_pollution: 0.05,
                absorbed_pollution: 0.0,
            },
            Terrain::Glacier => TerrainDefaults {
                temperature: -10.0,
                pollution: 0.02,
                wind_direction: WindDirection::W,
                wind_speed: 0.5,
                generated_pollution: 0.0,
                absorbed_pollution: 0.005,
            },
        }
    }
}

/// Environmental state of one grid coordinate for a single tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    row: usize,
    col: usize,
    terrain: Terrain,
    temperature: f64,
    pollution: f64,
    generated_pollution: f64,
    absorbed_pollution: f64,
    wind_speed: f64,
    wind_direction: WindDirection,
    cloud: CloudState,
}

impl Cell {
    pub fn new(row: usize, col: usize, terrain: Terrain) -> Self {
        let defaults = terrain.defaults();
        Self {
            row,
            col,
            terrain,
            temperature: defaults.temperature,
            pollution: defaults.pollution,
            generated_pollution: defaults.generated_pollution,
            absorbed_pollution: defaults.absorbed_pollution,
            wind_speed: defaults.wind_speed,
            wind_direction: defaults.wind_direction,
            cloud: CloudState::Clear,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn position(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn terrain(&self) -> Terrain {
        self.terrain
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pollution(&self) -> f64 {
        self.pollution
    }

    pub fn generated_pollution(&self) -> f64 {
        self.generated_pollution
    }

    pub fn absorbed_pollution(&self) -> f64 {
        self.absorbed_pollution
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn wind_direction(&self) -> WindDirection {
        self.wind_direction
    }

    pub fn cloud(&self) -> CloudState {
        self.cloud
    }

    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrain = terrain;
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Pollution never drops below zero.
    pub fn set_pollution(&mut self, pollution: f64) {
        self.pollution = pollution.max(0.0);
    }

    pub fn set_generated_pollution(&mut self, generated: f64) {
        self.generated_pollution = generated;
    }

    /// Wind speed is held within [`MIN_WIND_SPEED`, `MAX_WIND_SPEED`].
    pub fn set_wind_speed(&mut self, speed: f64) {
        self.wind_speed = speed.clamp(MIN_WIND_SPEED, MAX_WIND_SPEED);
    }

    pub fn set_wind_direction(&mut self, direction: WindDirection) {
        self.wind_direction = direction;
    }

    pub fn set_cloud(&mut self, cloud: CloudState) {
        self.cloud = cloud;
    }
}
