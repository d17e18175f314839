use rand::Rng;
use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::components::{Cell, CloudState};
use crate::world::World;

use super::neighborhood::neighboring_clouds;
use super::{CellRule, RuleContext};

/// Largest meaningful threshold: a cell has at most four neighbors but the
/// thresholds are drawn from [0, 3].
pub const MAX_CLOUD_THRESHOLD: u8 = 3;

/// Neighboring-cloud counts needed for a clear sky to cloud over and for a
/// cloud to start raining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudThresholds {
    pub cloud: u8,
    pub rain: u8,
}

impl CloudThresholds {
    pub fn new(cloud: u8, rain: u8) -> Self {
        Self {
            cloud: cloud.min(MAX_CLOUD_THRESHOLD),
            rain: rain.min(MAX_CLOUD_THRESHOLD),
        }
    }

    /// Draws both thresholds independently and uniformly from `range`.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, range: ThresholdRange) -> Self {
        Self::new(
            rng.gen_range(range.min..=range.max),
            rng.gen_range(range.min..=range.max),
        )
    }
}

/// Inclusive range thresholds are drawn from each tick. Always satisfies
/// `min <= max <= MAX_CLOUD_THRESHOLD`, including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdRange {
    min: u8,
    max: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "cloud thresholds must satisfy min <= max <= {}, got {min}..={max}",
    MAX_CLOUD_THRESHOLD
)]
pub struct InvalidThresholdRange {
    pub min: u8,
    pub max: u8,
}

impl ThresholdRange {
    pub fn new(min: u8, max: u8) -> Option<Self> {
        (min <= max && max <= MAX_CLOUD_THRESHOLD).then_some(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }
}

impl<'de> Deserialize<'de> for ThresholdRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            min: u8,
            max: u8,
        }

        let Raw { min, max } = Raw::deserialize(deserializer)?;
        Self::new(min, max).ok_or_else(|| de::Error::custom(InvalidThresholdRange { min, max }))
    }
}

impl Default for ThresholdRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: MAX_CLOUD_THRESHOLD,
        }
    }
}

pub fn transition(state: CloudState, cloudy_neighbors: usize, thresholds: CloudThresholds) -> CloudState {
    match state {
        CloudState::Rain => CloudState::Clear,
        CloudState::Cloud if cloudy_neighbors >= usize::from(thresholds.rain) => CloudState::Rain,
        CloudState::Cloud => CloudState::Cloud,
        CloudState::Clear if cloudy_neighbors >= usize::from(thresholds.cloud) => CloudState::Cloud,
        CloudState::Clear => CloudState::Clear,
    }
}

pub fn next_cloud_state(world: &World, cell: &Cell, thresholds: CloudThresholds) -> CloudState {
    transition(cell.cloud(), neighboring_clouds(world, cell), thresholds)
}

pub struct CloudRule;

impl CloudRule {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CloudRule {
    fn default() -> Self {
        Self::new()
    }
}

impl CellRule for CloudRule {
    fn name(&self) -> &str {
        "clouds"
    }

    fn apply(&self, ctx: &RuleContext<'_>, cell: &Cell, next: &mut Cell) {
        next.set_cloud(next_cloud_state(ctx.world, cell, ctx.thresholds));
    }
}
