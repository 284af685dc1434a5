use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle phase of a simulation module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecyclePhase {
    /// Slot declaration (`def_<module>`)
    #[serde(rename = "def", alias = "definition")]
    Definition,
    /// Initial value computation (`init_<module>`)
    #[serde(rename = "init", alias = "initialization")]
    Initialization,
    /// Per-step computation (`<module>`)
    #[serde(rename = "exec", alias = "execution")]
    Execution,
}

impl LifecyclePhase {
    pub fn all() -> [LifecyclePhase; 3] {
        [
            LifecyclePhase::Definition,
            LifecyclePhase::Initialization,
            LifecyclePhase::Execution,
        ]
    }

    /// Token used in the MODULES section of the input deck
    pub fn token(&self) -> &'static str {
        match self {
            LifecyclePhase::Definition => "def",
            LifecyclePhase::Initialization => "init",
            LifecyclePhase::Execution => "exec",
        }
    }

    /// Phase implied by a module function name
    pub fn from_function_name(name: &str) -> Self {
        if name.starts_with("def_") {
            LifecyclePhase::Definition
        } else if name.starts_with("init_") {
            LifecyclePhase::Initialization
        } else {
            LifecyclePhase::Execution
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for LifecyclePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "def" | "definition" => Ok(LifecyclePhase::Definition),
            "init" | "initialization" => Ok(LifecyclePhase::Initialization),
            "exec" | "execution" => Ok(LifecyclePhase::Execution),
            other => Err(format!("Invalid lifecycle method: {}", other)),
        }
    }
}

/// Motion fidelity supported by a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dof {
    ThreeDof,
    SixDof,
    /// Compatible with both 3DoF and 6DoF simulations
    Both,
}

impl Dof {
    /// Parse the free-form DoF tag found in metadata documents
    ///
    /// Accepts `3`, `3DoF`, `6`, `6DoF`, `3/6` and descriptive forms such as
    /// `3DoF / 6DoF compatible`.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        let lower = tag.to_lowercase();
        let has3 = lower.contains('3');
        let has6 = lower.contains('6');
        match (has3, has6) {
            (true, true) => Some(Dof::Both),
            (true, false) => Some(Dof::ThreeDof),
            (false, true) => Some(Dof::SixDof),
            (false, false) => None,
        }
    }

    /// Whether a component tagged `self` satisfies a `query`
    pub fn matches(&self, query: Dof) -> bool {
        match (self, query) {
            (_, Dof::Both) => true,
            (Dof::Both, _) => true,
            (a, b) => *a == b,
        }
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dof::ThreeDof => write!(f, "3DoF"),
            Dof::SixDof => write!(f, "6DoF"),
            Dof::Both => write!(f, "3/6"),
        }
    }
}

/// A user-supplied component parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Number(f64),
    List(Vec<f64>),
    Text(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Number(x) => Some(*x),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(i) => write!(f, "{}", i),
            ParamValue::Number(x) => write!(f, "{}", x),
            ParamValue::List(values) => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(" "))
            }
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Number(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Integer(v as i64)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::List(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}
