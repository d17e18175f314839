//! Grid-wide statistics recomputed fresh every tick.

use serde::{Deserialize, Serialize};

use crate::components::Cell;
use crate::world::GridError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub avg_temperature: f64,
    pub avg_pollution: f64,
    pub std_temperature: f64,
    pub std_pollution: f64,
}

pub fn average_temperature(cells: &[Cell]) -> Result<f64, GridError> {
    let values: Vec<f64> = cells.iter().map(Cell::temperature).collect();
    mean(&values).ok_or(GridError::EmptyGrid)
}

pub fn average_pollution(cells: &[Cell]) -> Result<f64, GridError> {
    let values: Vec<f64> = cells.iter().map(Cell::pollution).collect();
    mean(&values).ok_or(GridError::EmptyGrid)
}

pub fn summarize(cells: &[Cell]) -> Result<Aggregates, GridError> {
    let temperatures: Vec<f64> = cells.iter().map(Cell::temperature).collect();
    let pollutions: Vec<f64> = cells.iter().map(Cell::pollution).collect();
    Ok(Aggregates {
        avg_temperature: mean(&temperatures).ok_or(GridError::EmptyGrid)?,
        avg_pollution: mean(&pollutions).ok_or(GridError::EmptyGrid)?,
        std_temperature: population_std_dev(&temperatures).ok_or(GridError::EmptyGrid)?,
        std_pollution: population_std_dev(&pollutions).ok_or(GridError::EmptyGrid)?,
    })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with the full count as divisor (ddof = 0).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}
