//! Per-channel regression tolerances and verdicts.

use crate::error::{Result, SimforgeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Allowed error for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Maximum allowed RMS error
    pub rms: f64,

    /// Optional bound on the maximum absolute error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// A required channel missing from the comparison fails the verdict
    #[serde(default)]
    pub required: bool,
}

impl Tolerance {
    pub fn rms(rms: f64) -> Self {
        Self {
            rms,
            max: None,
            required: false,
        }
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Channel tolerances, plus an optional default for unlisted channels
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToleranceTable {
    #[serde(default)]
    pub channels: BTreeMap<String, Tolerance>,

    /// Applied to every compared channel not listed in `channels`
    #[serde(default)]
    pub default: Option<Tolerance>,
}

impl ToleranceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, channel: impl Into<String>, tolerance: Tolerance) -> Self {
        self.channels.insert(channel.into(), tolerance);
        self
    }

    pub fn with_default(mut self, tolerance: Tolerance) -> Self {
        self.default = Some(tolerance);
        self
    }

    /// Mark an already listed channel as required, or add it with the default
    /// tolerance (zero RMS when there is none)
    pub fn require(mut self, channel: &str) -> Self {
        let fallback = self.default.unwrap_or_else(|| Tolerance::rms(0.0));
        self.channels
            .entry(channel.to_string())
            .or_insert(fallback)
            .required = true;
        self
    }

    pub fn get(&self, channel: &str) -> Option<Tolerance> {
        self.channels.get(channel).copied().or(self.default)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.default.is_none()
    }

    /// Parse a `channel=rms` assignment
    pub fn parse_assignment(text: &str) -> Result<(String, f64)> {
        let (channel, value) = text
            .split_once('=')
            .ok_or_else(|| SimforgeError::Config(format!("expected CHANNEL=VALUE, got '{}'", text)))?;
        let channel = channel.trim();
        if channel.is_empty() {
            return Err(SimforgeError::Config(format!("missing channel name in '{}'", text)));
        }
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| SimforgeError::Config(format!("invalid tolerance in '{}'", text)))?;
        if value < 0.0 || !value.is_finite() {
            return Err(SimforgeError::Config(format!("tolerance must be non-negative in '{}'", text)));
        }
        Ok((channel.to_string(), value))
    }

    /// Load a TOML tolerance table
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SimforgeError::io(path, e))?;
        toml::from_str(&content)
            .map_err(|e| SimforgeError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Pass,
    Fail,
    /// Listed in the tolerance table but not compared
    Missing,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelStatus::Pass => write!(f, "PASS"),
            ChannelStatus::Fail => write!(f, "FAIL"),
            ChannelStatus::Missing => write!(f, "MISSING"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelVerdict {
    pub channel: String,
    pub rms: Option<f64>,
    pub max: Option<f64>,
    pub tolerance: Tolerance,
    pub status: ChannelStatus,
}

impl ChannelVerdict {
    /// Whether this channel lets the overall verdict pass
    pub fn passed(&self) -> bool {
        match self.status {
            ChannelStatus::Pass => true,
            ChannelStatus::Fail => false,
            ChannelStatus::Missing => !self.tolerance.required,
        }
    }
}

/// Outcome of checking a comparison against a tolerance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionVerdict {
    pub channels: Vec<ChannelVerdict>,
    pub passed: bool,
}

impl RegressionVerdict {
    pub(crate) fn from_channels(channels: Vec<ChannelVerdict>) -> Self {
        let passed = channels.iter().all(ChannelVerdict::passed);
        Self { channels, passed }
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChannelVerdict> {
        self.channels.iter().filter(|c| !c.passed())
    }

    pub fn missing(&self) -> impl Iterator<Item = &ChannelVerdict> {
        self.channels
            .iter()
            .filter(|c| c.status == ChannelStatus::Missing)
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelVerdict> {
        self.channels.iter().find(|c| c.channel == name)
    }
}

/// Check one channel's errors against its tolerance
pub fn check(channel: &str, rms: f64, max: f64, tolerance: Tolerance) -> ChannelVerdict {
    let within_rms = rms <= tolerance.rms;
    let within_max = tolerance.max.map_or(true, |bound| max <= bound);
    ChannelVerdict {
        channel: channel.to_string(),
        rms: Some(rms),
        max: Some(max),
        tolerance,
        status: if within_rms && within_max {
            ChannelStatus::Pass
        } else {
            ChannelStatus::Fail
        },
    }
}
