//! Configured component instances.

pub mod catalog;

pub use catalog::{by_name, CatalogEntry, ComponentFactory, CATALOG};

use crate::types::{LifecyclePhase, ParamValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_lifecycle() -> Vec<LifecyclePhase> {
    vec![LifecyclePhase::Definition, LifecyclePhase::Execution]
}

/// A configured instance of a library component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Component type name (e.g. `drag_simple`)
    pub name: String,

    /// User-configured parameters, in insertion order
    #[serde(default)]
    pub parameters: IndexMap<String, ParamValue>,

    /// Lifecycle phases enabled for this instance
    #[serde(rename = "lifecycle", default = "default_lifecycle")]
    pub enabled_lifecycle: Vec<LifecyclePhase>,

    /// Optional label distinguishing several instances of one type
    #[serde(rename = "label", default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
}

impl Component {
    /// New instance with the `def,exec` lifecycle
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: IndexMap::new(),
            enabled_lifecycle: default_lifecycle(),
            custom_label: None,
        }
    }

    pub fn with_lifecycle(name: impl Into<String>, phases: &[LifecyclePhase]) -> Self {
        let mut comp = Self::new(name);
        comp.enabled_lifecycle = Vec::new();
        for phase in phases {
            comp = comp.enable(*phase);
        }
        comp
    }

    /// Set a parameter value (last write wins)
    pub fn set_parameter(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.custom_label = Some(label.into());
        self
    }

    pub fn enable(mut self, phase: LifecyclePhase) -> Self {
        if !self.enabled_lifecycle.contains(&phase) {
            self.enabled_lifecycle.push(phase);
            self.enabled_lifecycle.sort();
        }
        self
    }

    pub fn disable(mut self, phase: LifecyclePhase) -> Self {
        self.enabled_lifecycle.retain(|p| *p != phase);
        self
    }

    pub fn enable_init(self) -> Self {
        self.enable(LifecyclePhase::Initialization)
    }

    pub fn disable_init(self) -> Self {
        self.disable(LifecyclePhase::Initialization)
    }

    pub fn has_phase(&self, phase: LifecyclePhase) -> bool {
        self.enabled_lifecycle.contains(&phase)
    }

    /// MODULES entry for this component on its own (`name   def,exec`)
    pub fn module_spec(&self) -> String {
        format!("{}   {}", self.name, phase_list(&self.enabled_lifecycle))
    }
}

/// Comma-separated phase tokens (`def,init,exec`)
pub fn phase_list(phases: &[LifecyclePhase]) -> String {
    phases
        .iter()
        .map(|p| p.token())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(label) = &self.custom_label {
            write!(f, " ({})", label)?;
        }
        write!(f, ", {} params", self.parameters.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_component_defaults() {
        let comp = Component::new("wind_none");
        assert_eq!(comp.enabled_lifecycle, default_lifecycle());
        assert!(comp.parameters.is_empty());
        assert!(comp.custom_label.is_none());
    }

    #[test]
    fn test_set_parameter_last_write_wins() {
        let comp = Component::new("drag_simple")
            .set_parameter("cd", 0.3)
            .set_parameter("area", 0.01)
            .set_parameter("cd", 0.47);
        assert_eq!(comp.parameters.len(), 2);
        assert_eq!(comp.parameters["cd"], ParamValue::Number(0.47));
        assert_eq!(comp.parameters.get_index(0).unwrap().0, "cd");
    }

    #[test]
    fn test_enable_and_disable_init() {
        let comp = Component::new("kinematics_3dof_flat").enable_init();
        assert_eq!(comp.module_spec(), "kinematics_3dof_flat   def,init,exec");

        let comp = comp.enable_init().disable_init();
        assert_eq!(comp.module_spec(), "kinematics_3dof_flat   def,exec");
    }

    #[test]
    fn test_display_with_label() {
        let comp = Component::new("target_fixed")
            .with_label("primary")
            .set_parameter("x", 1000.0);
        assert_eq!(comp.to_string(), "target_fixed (primary), 1 params");
    }

    #[test]
    fn test_deserialize_from_toml() {
        let text = r#"
name = "drag_simple"
lifecycle = ["def", "exec"]
label = "main"

[parameters]
cd = 0.47
area = 0.01
"#;
        let comp: Component = toml::from_str(text).unwrap();
        assert_eq!(comp.name, "drag_simple");
        assert_eq!(comp.custom_label.as_deref(), Some("main"));
        assert_eq!(comp.parameters["area"], ParamValue::Number(0.01));
    }

    #[test]
    fn test_deserialize_rejects_unknown_phase() {
        let text = "name = \"x\"\nlifecycle = [\"run\"]\n";
        assert!(toml::from_str::<Component>(text).is_err());
    }
}
