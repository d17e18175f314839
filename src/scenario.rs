use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    engine::EngineSettings,
    systems::{InvalidThresholdRange, ThresholdRange, MAX_CLOUD_THRESHOLD},
    world::{GridError, World, MIN_GRID_SIZE},
};

fn default_grid_size() -> usize {
    20
}

fn default_ticks() -> u64 {
    365
}

fn default_max_threshold() -> u8 {
    MAX_CLOUD_THRESHOLD
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_grid_size")]
    pub grid_size: usize,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub clouds: CloudConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    #[serde(default)]
    pub min_threshold: u8,
    #[serde(default = "default_max_threshold")]
    pub max_threshold: u8,
    #[serde(default = "default_true")]
    pub seed_glaciers: bool,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            min_threshold: 0,
            max_threshold: default_max_threshold(),
            seed_glaciers: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Scenario {
    /// A 20x20 planet run for a simulated year.
    fn default() -> Self {
        Self {
            name: "default_planet".to_string(),
            description: None,
            seed: 7,
            grid_size: default_grid_size(),
            ticks: Some(default_ticks()),
            clouds: CloudConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("scenario must define a name");
        }
        if self.grid_size < MIN_GRID_SIZE {
            return Err(GridError::InvalidSize(self.grid_size).into());
        }
        if self.threshold_range().is_none() {
            return Err(InvalidThresholdRange {
                min: self.clouds.min_threshold,
                max: self.clouds.max_threshold,
            }
            .into());
        }
        Ok(())
    }

    pub fn threshold_range(&self) -> Option<ThresholdRange> {
        ThresholdRange::new(self.clouds.min_threshold, self.clouds.max_threshold)
    }

    pub fn build_world(&self) -> Result<World, GridError> {
        World::new(self.grid_size)
    }

    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let cloud_thresholds = self
            .threshold_range()
            .context("cloud threshold range is invalid")?;
        Ok(EngineSettings {
            scenario_name: self.name.clone(),
            seed: self.seed,
            cloud_thresholds,
            seed_glacier_clouds: self.clouds.seed_glaciers,
        })
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or_else(default_ticks)
    }
}
