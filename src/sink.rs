//! Destinations for the per-tick average records. The caller owns a sink and
//! hands it to the engine; the engine only appends.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const TEMPERATURE_FILE: &str = "average_temperature.txt";
pub const POLLUTION_FILE: &str = "average_pollution.txt";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageRecord {
    pub tick: u64,
    pub avg_temperature: f64,
    pub avg_pollution: f64,
}

pub trait AverageSink {
    fn append(&mut self, record: &AverageRecord) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<AverageRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[AverageRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<AverageRecord> {
        self.records
    }
}

impl AverageSink for MemorySink {
    fn append(&mut self, record: &AverageRecord) -> Result<()> {
        self.records.push(*record);
        Ok(())
    }
}

/// Two append-only text streams, one value per line: temperatures with two
/// decimals and pollution with three.
pub struct FileSink {
    dir: PathBuf,
    temperature: File,
    pollution: File,
}

impl FileSink {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create averages directory {}", dir.display()))?;
        Ok(Self {
            temperature: open_append(&dir.join(TEMPERATURE_FILE))?,
            pollution: open_append(&dir.join(POLLUTION_FILE))?,
            dir,
        })
    }

    /// Truncates both streams so a new run starts from an empty log.
    pub fn reset(&mut self) -> Result<()> {
        self.temperature.set_len(0)?;
        self.pollution.set_len(0)?;
        Ok(())
    }

    pub fn temperature_path(&self) -> PathBuf {
        self.dir.join(TEMPERATURE_FILE)
    }

    pub fn pollution_path(&self) -> PathBuf {
        self.dir.join(POLLUTION_FILE)
    }
}

impl AverageSink for FileSink {
    fn append(&mut self, record: &AverageRecord) -> Result<()> {
        append_pair(&mut self.temperature, &mut self.pollution, record)
    }
}

/// An averages stream that can be cut back to an earlier length.
trait SeriesStream: Write {
    fn len(&self) -> io::Result<u64>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl SeriesStream for File {
    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes one line to each stream. If either write fails both streams are cut
/// back to their previous lengths so line `n` of each file is always tick `n`.
fn append_pair(
    temperature: &mut impl SeriesStream,
    pollution: &mut impl SeriesStream,
    record: &AverageRecord,
) -> Result<()> {
    let temperature_line = format!("{:.2}\n", record.avg_temperature);
    let pollution_line = format!("{:.3}\n", record.avg_pollution);
    let temperature_len = temperature.len()?;
    let pollution_len = pollution.len()?;

    let written = write_line(temperature, &temperature_line)
        .and_then(|()| write_line(pollution, &pollution_line));
    if let Err(err) = written {
        let rollback = temperature
            .truncate(temperature_len)
            .and_then(|()| pollution.truncate(pollution_len));
        if let Err(rollback_err) = rollback {
            warn!(tick = record.tick, %rollback_err, "averages streams may be misaligned");
        }
        return Err(err).with_context(|| format!("Failed to append averages for tick {}", record.tick));
    }
    Ok(())
}

fn write_line(stream: &mut impl Write, line: &str) -> io::Result<()> {
    stream.write_all(line.as_bytes())?;
    stream.flush()
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))
}

/// Reads one averages stream back, skipping blank lines.
pub fn read_series(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read averages file {}", path.display()))?;
    let mut values = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<f64>().with_context(|| {
            format!(
                "Non-numeric value '{trimmed}' on line {} of {}",
                index + 1,
                path.display()
            )
        })?;
        values.push(value);
    }
    Ok(values)
}
