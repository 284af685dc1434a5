use crate::error::{Result, SimforgeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name looked up in the current directory
pub const CONFIG_FILENAME: &str = "simforge.toml";

/// Simforge project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimforgeConfig {
    /// Configuration file version
    pub version: String,

    /// Component library and framework locations
    pub paths: PathsConfig,

    /// Native compiler settings
    pub toolchain: ToolchainConfig,

    /// Process timeouts and output discovery
    pub execution: ExecutionConfig,

    /// Target vehicle entity the donors are rewritten for
    pub target: TargetConfig,

    /// Simulation assembly rules
    pub assembly: AssemblyConfig,

    /// Default run configuration
    pub run: RunConfig,
}

impl Default for SimforgeConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: PathsConfig::default(),
            toolchain: ToolchainConfig::default(),
            execution: ExecutionConfig::default(),
            target: TargetConfig::default(),
            assembly: AssemblyConfig::default(),
            run: RunConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the donor component sources (searched recursively)
    pub components: PathBuf,

    /// Root of the metadata documents
    pub metadata: PathBuf,

    /// Metadata document file name
    pub metadata_file: String,

    /// Directory holding the framework skeleton
    pub framework: PathBuf,

    /// Parent directory for per-simulation working directories
    pub simulations: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            components: PathBuf::from("components"),
            metadata: PathBuf::from("components"),
            metadata_file: "INDEX.md".to_string(),
            framework: PathBuf::from("framework"),
            simulations: PathBuf::from("sims"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// Compiler executable
    pub compiler: String,

    /// Language standard flag
    pub standard: String,

    /// Optimization flag
    pub optimization: String,

    /// Warning suppression flags
    pub warning_flags: Vec<String>,

    /// Extra include directories
    pub include_dirs: Vec<PathBuf>,

    /// Framework files copied into every build directory
    pub framework_files: Vec<String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "g++".to_string(),
            standard: "-std=c++11".to_string(),
            optimization: "-O2".to_string(),
            warning_flags: vec![
                "-Wno-write-strings".to_string(),
                "-Wno-unused-result".to_string(),
            ],
            include_dirs: vec![],
            framework_files: [
                "class_hierarchy.hpp",
                "global_header.hpp",
                "global_constants.hpp",
                "utility_header.hpp",
                "utility_functions.cpp",
                "global_functions.cpp",
                "class_functions.cpp",
                "execution.cpp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Compile timeout in seconds
    pub compile_timeout_secs: u64,

    /// Run timeout in seconds
    pub run_timeout_secs: u64,

    /// Trajectory file names probed after a run, in order
    pub output_candidates: Vec<String>,

    /// Name of the generated configuration deck
    pub input_deck: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            compile_timeout_secs: 60,
            run_timeout_secs: 300,
            output_candidates: vec![
                "plot1.asc".to_string(),
                "traj.asc".to_string(),
                "trajectory.asc".to_string(),
            ],
            input_deck: "input.asc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Class qualifier of the target entity
    pub class_name: String,

    /// State array accessor of the target entity
    pub state_array: String,

    /// Class qualifier used by donor sources
    pub generic_class: String,

    /// State array accessor used by donor sources
    pub generic_array: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            class_name: "Ball".to_string(),
            state_array: "ball".to_string(),
            generic_class: "Vehicle".to_string(),
            generic_array: "vehicle".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Components every simulation must contain
    pub required_components: Vec<String>,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            required_components: vec!["time_management".to_string(), "termination".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulated duration in seconds
    pub duration: f64,

    /// Integration step in seconds
    pub dt: f64,

    /// Output sampling step in seconds
    pub output_step: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            duration: 100.0,
            dt: 0.01,
            output_step: 0.1,
        }
    }
}

impl SimforgeConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SimforgeError::io(path, e))?;
        let config = toml::from_str(&content)
            .map_err(|e| SimforgeError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Load `simforge.toml` from `dir` if present, otherwise defaults
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| SimforgeError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SimforgeError::io(path, e))?;
        Ok(())
    }

    /// Resolve every relative path against `base`
    pub fn rooted_at(mut self, base: &Path) -> Self {
        let root = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        root(&mut self.paths.components);
        root(&mut self.paths.metadata);
        root(&mut self.paths.framework);
        root(&mut self.paths.simulations);
        for dir in &mut self.toolchain.include_dirs {
            root(dir);
        }
        self
    }
}
