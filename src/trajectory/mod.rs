//! Simulation trajectories: parsing, export and regression comparison.

pub mod comparator;
pub mod parser;
pub mod tolerance;

pub use comparator::{ComparisonResult, TrajectoryComparator};
pub use parser::TrajectoryConvention;
pub use tolerance::{ChannelStatus, ChannelVerdict, RegressionVerdict, Tolerance, ToleranceTable};

use crate::error::{Result, SimforgeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Time samples plus one equally long sample vector per channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    time: Vec<f64>,
    data: IndexMap<String, Vec<f64>>,
}

impl Trajectory {
    /// Build a trajectory, rejecting channels whose length differs from `time`
    pub fn new(time: Vec<f64>, data: IndexMap<String, Vec<f64>>) -> Result<Self> {
        if let Some((name, samples)) = data.iter().find(|(_, s)| s.len() != time.len()) {
            return Err(SimforgeError::trajectory(
                "<memory>",
                format!(
                    "channel '{}' has {} samples, expected {}",
                    name,
                    samples.len(),
                    time.len()
                ),
            ));
        }
        Ok(Self { time, data })
    }

    /// Read and parse a trajectory file, detecting its convention
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SimforgeError::io(path, e))?;
        parser::parse(&text).map_err(|e| match e {
            SimforgeError::TrajectoryFormat { message, .. } => {
                SimforgeError::trajectory(path.display().to_string(), message)
            }
            other => other,
        })
    }

    /// Parse trajectory text, detecting its convention
    pub fn parse(text: &str) -> Result<Self> {
        parser::parse(text)
    }

    /// Parse trajectory text with a fixed convention
    pub fn parse_with(text: &str, convention: TrajectoryConvention) -> Result<Self> {
        parser::parse_with(text, convention)
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn data(&self) -> &IndexMap<String, Vec<f64>> {
        &self.data
    }

    pub fn get(&self, channel: &str) -> Option<&[f64]> {
        self.data.get(channel).map(Vec::as_slice)
    }

    /// Channel names in file order
    pub fn variables(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// First and last time sample
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.time.first()?, *self.time.last()?))
    }

    pub fn duration(&self) -> f64 {
        self.span().map(|(start, end)| end - start).unwrap_or(0.0)
    }

    /// Write `time,<channels...>` rows
    pub fn write_csv<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        write!(out, "time")?;
        for name in self.data.keys() {
            write!(out, ",{}", name)?;
        }
        writeln!(out)?;

        for (i, t) in self.time.iter().enumerate() {
            write!(out, "{}", t)?;
            for samples in self.data.values() {
                write!(out, ",{}", samples[i])?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path).map_err(|e| SimforgeError::io(path, e))?;
        let mut writer = std::io::BufWriter::new(file);
        self.write_csv(&mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| SimforgeError::io(path, e))
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trajectory: {} time points", self.len())?;
        if let Some((start, end)) = self.span() {
            writeln!(f, "Duration: {:.3} - {:.3} sec", start, end)?;
        }
        let names = self.variables();
        let shown = names.iter().take(5).copied().collect::<Vec<_>>().join(", ");
        if names.len() > 5 {
            write!(f, "Variables ({}): {}, ...", names.len(), shown)
        } else {
            write!(f, "Variables ({}): {}", names.len(), shown)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Trajectory {
        let mut data = IndexMap::new();
        data.insert("alt".to_string(), vec![100.0, 90.0, 70.0]);
        data.insert("vel".to_string(), vec![0.0, 9.8, 19.6]);
        Trajectory::new(vec![0.0, 1.0, 2.0], data).unwrap()
    }

    #[test]
    fn test_new_rejects_misaligned_channel() {
        let mut data = IndexMap::new();
        data.insert("alt".to_string(), vec![1.0]);
        let err = Trajectory::new(vec![0.0, 1.0], data).unwrap_err();
        assert!(err.to_string().contains("channel 'alt' has 1 samples, expected 2"));
    }

    #[test]
    fn test_accessors() {
        let traj = sample();
        assert_eq!(traj.len(), 3);
        assert_eq!(traj.variables(), vec!["alt", "vel"]);
        assert_eq!(traj.get("vel"), Some(&[0.0, 9.8, 19.6][..]));
        assert!(traj.get("missing").is_none());
        assert_eq!(traj.duration(), 2.0);
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        sample().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time,alt,vel");
        assert_eq!(lines[1], "0,100,0");
        assert_eq!(lines[3], "2,70,19.6");
    }

    #[test]
    fn test_save_csv_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("traj.csv");
        sample().save_csv(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("time,alt,vel\n"));
    }

    #[test]
    fn test_from_file_reports_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("empty.asc");
        std::fs::write(&path, "// nothing here\n").unwrap();
        let err = Trajectory::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("empty.asc"));
    }

    #[test]
    fn test_display_summary() {
        let text = sample().to_string();
        assert!(text.contains("Trajectory: 3 time points"));
        assert!(text.contains("Duration: 0.000 - 2.000 sec"));
        assert!(text.contains("Variables (2): alt, vel"));
    }
}
