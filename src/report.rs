//! Run-level statistics over the logged per-tick averages.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::aggregate::{mean, population_std_dev};
use crate::sink::{read_series, POLLUTION_FILE, TEMPERATURE_FILE};

#[derive(Debug, Clone, Serialize)]
pub struct SeriesReport {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Entry `k` is the standard deviation of the first `k + 1` values.
    pub running_std_dev: Vec<f64>,
    /// `(v - mean) / std_dev`, or all zeros when the series is flat.
    pub normalized: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub temperature: SeriesReport,
    pub pollution: SeriesReport,
}

pub fn build(temperatures: &[f64], pollutions: &[f64]) -> Report {
    Report {
        temperature: summarize_series(temperatures),
        pollution: summarize_series(pollutions),
    }
}

pub fn from_dir(dir: impl AsRef<Path>) -> Result<Report> {
    let dir = dir.as_ref();
    let temperatures = read_series(dir.join(TEMPERATURE_FILE))?;
    let pollutions = read_series(dir.join(POLLUTION_FILE))?;
    Ok(build(&temperatures, &pollutions))
}

pub fn summarize_series(values: &[f64]) -> SeriesReport {
    let avg = mean(values).unwrap_or(0.0);
    let std_dev = population_std_dev(values).unwrap_or(0.0);
    let running_std_dev = (1..=values.len())
        .map(|k| population_std_dev(&values[..k]).unwrap_or(0.0))
        .collect();
    let normalized = values
        .iter()
        .map(|v| if std_dev > 0.0 { (v - avg) / std_dev } else { 0.0 })
        .collect();
    SeriesReport {
        count: values.len(),
        mean: avg,
        std_dev,
        running_std_dev,
        normalized,
    }
}
