use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Receiver of per-episode scalars such as `episode_length` and
/// `episode_return`.
pub trait MetricsSink {
    fn scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn scalar(&mut self, _name: &str, _value: f64, _step: u64) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub name: String,
    pub value: f64,
    pub step: u64,
}

/// Keeps every scalar in memory, grouped by name in arrival order.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    series: FxHashMap<String, Vec<(u64, f64)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series(&self, name: &str) -> &[(u64, f64)] {
        self.series.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn values(&self, name: &str) -> Vec<f64> {
        self.series(name).iter().map(|(_, v)| *v).collect()
    }
}

impl MetricsSink for MemorySink {
    fn scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        self.series
            .entry(name.to_string())
            .or_default()
            .push((step, value));
        Ok(())
    }
}

/// Appends one JSON object per scalar to a file.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("create directory {}", parent.display()), e))?;
        }
        let file = File::create(&path)
            .map_err(|e| Error::io(format!("create {}", path.display()), e))?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }
}

impl MetricsSink for JsonLinesSink {
    fn scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        let record = ScalarRecord {
            name: name.to_string(),
            value,
            step,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| Error::io(format!("write {}", self.path.display()), e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::io(format!("flush {}", self.path.display()), e))
    }
}
