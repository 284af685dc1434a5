//! TOML simulation definition files.
//!
//! ```toml
//! name = "ball3"
//!
//! [[components]]
//! name = "drag_simple"
//! parameters = { cd = 0.47, area = 0.0314 }
//!
//! [initial_state]
//! dvbe = 50.0
//!
//! [config]
//! duration = 10.0
//! ```

use crate::component::{by_name, Component};
use crate::error::{Result, SimforgeError};
use crate::types::{LifecyclePhase, ParamValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One `[[components]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,

    #[serde(default)]
    pub parameters: IndexMap<String, ParamValue>,

    /// Overrides the catalog lifecycle when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Vec<LifecyclePhase>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ComponentDefinition {
    /// Instance starting from the catalog defaults for this name
    pub fn to_component(&self) -> Component {
        let mut comp = match &self.lifecycle {
            Some(phases) => Component::with_lifecycle(&self.name, phases),
            None => by_name(&self.name).unwrap_or_else(|| Component::new(&self.name)),
        };
        for (key, value) in &self.parameters {
            comp = comp.set_parameter(key, value.clone());
        }
        if let Some(label) = &self.label {
            comp = comp.with_label(label);
        }
        comp
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDefinition {
    pub name: String,

    /// Defaults to `<simulations root>/<name>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    #[serde(default)]
    pub components: Vec<ComponentDefinition>,

    #[serde(default)]
    pub initial_state: IndexMap<String, ParamValue>,

    /// `duration`, `dt`, `output_step` and free-form extras
    #[serde(default)]
    pub config: IndexMap<String, ParamValue>,
}

impl SimulationDefinition {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SimforgeError::io(path, e))?;
        Self::parse(&content)
            .map_err(|e| SimforgeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    /// Working directory, resolved against `simulations_root` when unset and
    /// against `base` when relative
    pub fn resolve_working_dir(&self, simulations_root: &Path, base: &Path) -> PathBuf {
        match &self.working_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => base.join(dir),
            None => simulations_root.join(&self.name),
        }
    }
}
