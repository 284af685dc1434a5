//! Component metadata types.

use crate::types::{Dof, LifecyclePhase};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A single state slot or an inclusive range of slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    pub fn single(index: usize) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Parse `10` or `10-12`
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        match text.split_once('-') {
            Some((a, b)) => {
                let start = a.trim().parse().ok()?;
                let end = b.trim().parse().ok()?;
                (start <= end).then_some(Self { start, end })
            }
            None => text.parse().ok().map(Self::single),
        }
    }
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl<'de> Deserialize<'de> for SlotRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = scalar_to_string(serde_yaml::Value::deserialize(deserializer)?);
        SlotRange::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid slot index '{}'", raw)))
    }
}

/// Specification of one input, output or parameter of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub index: SlotRange,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub var_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    /// Producing module (inputs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Visibility (outputs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Whether the parameter must be supplied (parameters only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_yaml::Value>,
}

/// Which lifecycle functions a component implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    #[serde(rename = "def", default)]
    pub definition: bool,
    #[serde(rename = "init", default)]
    pub initialization: bool,
    #[serde(rename = "exec", default)]
    pub execution: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            definition: true,
            initialization: false,
            execution: true,
        }
    }
}

impl Lifecycle {
    pub fn has(&self, phase: LifecyclePhase) -> bool {
        match phase {
            LifecyclePhase::Definition => self.definition,
            LifecyclePhase::Initialization => self.initialization,
            LifecyclePhase::Execution => self.execution,
        }
    }
}

/// Module ordering constraints declared by a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub required_before: Vec<String>,
    #[serde(default)]
    pub required_after: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
}

impl Dependencies {
    pub fn is_empty(&self) -> bool {
        self.required_before.is_empty() && self.required_after.is_empty() && self.optional.is_empty()
    }
}

/// Complete metadata for a component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentMetadata {
    pub name: String,
    pub category: String,
    /// Raw DoF tag as written in the document (`3DoF`, `6DoF`, `3/6`)
    pub dof: String,
    pub description: String,
    pub lifecycle: Lifecycle,
    pub inputs: Vec<VariableSpec>,
    pub outputs: Vec<VariableSpec>,
    pub parameters: Vec<VariableSpec>,
    pub dependencies: Dependencies,
    pub usage_example: String,
    pub notes: Vec<String>,
    /// Document the metadata was loaded from
    pub source_file: Option<PathBuf>,
}

impl ComponentMetadata {
    pub fn dof_tag(&self) -> Option<Dof> {
        Dof::parse_tag(&self.dof)
    }

    /// Look up a declared parameter by name
    pub fn parameter(&self, name: &str) -> Option<&VariableSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

impl fmt::Display for ComponentMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}] ({})", self.name, self.category, self.dof)?;
        if !self.description.is_empty() {
            writeln!(f, "  {}", self.description)?;
        }
        let sections = [
            ("Inputs", &self.inputs),
            ("Outputs", &self.outputs),
            ("Parameters", &self.parameters),
        ];
        for (title, vars) in sections {
            if vars.is_empty() {
                continue;
            }
            writeln!(f, "  {}:", title)?;
            for v in vars {
                writeln!(
                    f,
                    "    [{:>7}] {:<12} {:<8} {:<10} {}",
                    v.index.to_string(),
                    v.name,
                    v.var_type,
                    v.unit,
                    v.description
                )?;
            }
        }
        if !self.dependencies.is_empty() {
            writeln!(f, "  Dependencies:")?;
            writeln!(
                f,
                "    before: {:?} after: {:?} optional: {:?}",
                self.dependencies.required_before,
                self.dependencies.required_after,
                self.dependencies.optional
            )?;
        }
        Ok(())
    }
}

/// Render any YAML scalar as text; null becomes empty
pub(crate) fn scalar_to_string(value: serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => String::new(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s,
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_to_string(serde_yaml::Value::deserialize(deserializer)?))
}
