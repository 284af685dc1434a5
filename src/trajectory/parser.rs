//! Trajectory output parsing.
//!
//! Two layouts are produced by the native program:
//!
//! - **Plain**: one line of channel names, then one row per sample.
//! - **Wrapped**: a title line and a counts line, channel names wrapped
//!   over several lines, then samples wrapped to a fixed line width.

use super::Trajectory;
use crate::error::{Result, SimforgeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Sampling interval assumed when a wrapped file has no time channel
pub const NOMINAL_SAMPLE_INTERVAL: f64 = 0.05;

/// Number of preamble lines before the channel names of a wrapped file
const WRAPPED_PREAMBLE: usize = 2;

const WRAPPED_TIME_NAMES: &[&str] = &["time", "Time", "TIME", "t"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrajectoryConvention {
    /// Header line of names, one sample row per line
    Plain,
    /// Preamble, wrapped names, reflowed samples
    Wrapped,
}

impl fmt::Display for TrajectoryConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrajectoryConvention::Plain => write!(f, "plain"),
            TrajectoryConvention::Wrapped => write!(f, "wrapped"),
        }
    }
}

impl FromStr for TrajectoryConvention {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "a" => Ok(TrajectoryConvention::Plain),
            "wrapped" | "b" => Ok(TrajectoryConvention::Wrapped),
            _ => Err(format!("Unknown trajectory convention: {}", s)),
        }
    }
}

/// Non-blank, non-comment lines
fn significant_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("//"))
}

fn numeric_tokens(line: &str) -> Option<Vec<f64>> {
    line.split_whitespace()
        .map(|t| t.parse::<f64>().ok())
        .collect()
}

fn is_numeric(line: &str) -> bool {
    numeric_tokens(line).is_some()
}

fn is_counts_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| t.parse::<i64>().is_ok())
}

fn is_names_line(line: &str) -> bool {
    line.split_whitespace().all(|t| t.parse::<f64>().is_err())
}

/// Pick the layout from the first three significant lines
///
/// A wrapped file has an all-integer counts line followed by a line made
/// only of names. Anything else, including a plain file whose first data
/// row is damaged, is read as plain.
pub fn detect(text: &str) -> TrajectoryConvention {
    let head: Vec<&str> = significant_lines(text).take(3).collect();
    match head.as_slice() {
        [_, second, third] if is_counts_line(second) && is_names_line(third) => {
            TrajectoryConvention::Wrapped
        }
        _ => TrajectoryConvention::Plain,
    }
}

pub fn parse(text: &str) -> Result<Trajectory> {
    let convention = detect(text);
    debug!("Parsing trajectory as {} layout", convention);
    parse_with(text, convention)
}

pub fn parse_with(text: &str, convention: TrajectoryConvention) -> Result<Trajectory> {
    match convention {
        TrajectoryConvention::Plain => parse_plain(text),
        TrajectoryConvention::Wrapped => parse_wrapped(text),
    }
}

fn parse_plain(text: &str) -> Result<Trajectory> {
    let mut lines = significant_lines(text);
    let names: Vec<String> = match lines.next() {
        Some(header) => header.split_whitespace().map(str::to_string).collect(),
        None => return Err(SimforgeError::trajectory("<text>", "no channel names found")),
    };

    let rows: Vec<Vec<f64>> = lines
        .filter_map(numeric_tokens)
        .filter(|row| row.len() == names.len())
        .collect();
    if rows.is_empty() {
        return Err(SimforgeError::trajectory("<text>", "no valid data rows found"));
    }

    let time_column = names[0].eq_ignore_ascii_case("time") || names[0].eq_ignore_ascii_case("t");
    let time = if time_column {
        rows.iter().map(|r| r[0]).collect()
    } else {
        (0..rows.len()).map(|i| i as f64).collect()
    };

    let skip = usize::from(time_column);
    let data = columns(&names, &rows, skip);
    Trajectory::new(time, data)
}

fn parse_wrapped(text: &str) -> Result<Trajectory> {
    let mut lines = significant_lines(text).skip(WRAPPED_PREAMBLE).peekable();

    let mut names: Vec<String> = Vec::new();
    while let Some(line) = lines.peek() {
        if is_numeric(line) {
            break;
        }
        names.extend(line.split_whitespace().map(str::to_string));
        lines.next();
    }
    if names.is_empty() {
        return Err(SimforgeError::trajectory("<text>", "no channel names found"));
    }

    let values: Vec<f64> = lines.filter_map(numeric_tokens).flatten().collect();
    let rows: Vec<Vec<f64>> = values
        .chunks_exact(names.len())
        .map(<[f64]>::to_vec)
        .collect();
    if rows.is_empty() {
        return Err(SimforgeError::trajectory("<text>", "no complete data rows found"));
    }

    let time_index = WRAPPED_TIME_NAMES
        .iter()
        .find_map(|candidate| names.iter().position(|n| n == candidate));
    let time = match time_index {
        Some(i) => rows.iter().map(|r| r[i]).collect(),
        None => (0..rows.len())
            .map(|i| i as f64 * NOMINAL_SAMPLE_INTERVAL)
            .collect(),
    };

    let data = names
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != time_index)
        .map(|(i, name)| (name.clone(), rows.iter().map(|r| r[i]).collect()))
        .collect();
    Trajectory::new(time, data)
}

fn columns(names: &[String], rows: &[Vec<f64>], skip: usize) -> IndexMap<String, Vec<f64>> {
    names
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, name)| (name.clone(), rows.iter().map(|r| r[i]).collect()))
        .collect()
}
