//! Simulation assembly: components, initial state, run configuration, and
//! the compile/run/compare lifecycle around them.

pub mod definition;
pub mod input_deck;

pub use definition::{ComponentDefinition, SimulationDefinition};

use crate::build::{BuildArtifact, BuildOrchestrator};
use crate::component::Component;
use crate::compose::{ComposeEngine, TargetEntity};
use crate::config::{RunConfig, SimforgeConfig};
use crate::error::{Result, SimforgeError};
use crate::registry::ComponentRegistry;
use crate::runner::Runner;
use crate::trajectory::{Trajectory, TrajectoryComparator};
use crate::types::ParamValue;
use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// A simulation under assembly
#[derive(Debug, Clone)]
pub struct Simulation {
    name: String,
    working_dir: PathBuf,
    config: SimforgeConfig,
    registry: Arc<ComponentRegistry>,
    components: Vec<Component>,
    initial_state: IndexMap<String, ParamValue>,
    run: RunConfig,
    /// Unknown configuration keys, kept but not used by the runner
    extra: IndexMap<String, ParamValue>,
    artifact: Option<BuildArtifact>,
}

impl Simulation {
    pub fn new(
        name: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        config: SimforgeConfig,
        registry: Arc<ComponentRegistry>,
    ) -> Self {
        let run = config.run.clone();
        Self {
            name: name.into(),
            working_dir: working_dir.into(),
            config,
            registry,
            components: Vec::new(),
            initial_state: IndexMap::new(),
            run,
            extra: IndexMap::new(),
            artifact: None,
        }
    }

    /// Assemble a simulation from a definition file's contents
    pub fn from_definition(
        definition: &SimulationDefinition,
        working_dir: impl Into<PathBuf>,
        config: SimforgeConfig,
        registry: Arc<ComponentRegistry>,
    ) -> Result<Self> {
        let mut sim = Self::new(&definition.name, working_dir, config, registry);
        for comp in &definition.components {
            sim.add_component(comp.to_component());
        }
        sim.set_initial_state(definition.initial_state.clone());
        sim.set_config(definition.config.clone())?;
        Ok(sim)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn initial_state(&self) -> &IndexMap<String, ParamValue> {
        &self.initial_state
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    pub fn extra_config(&self) -> &IndexMap<String, ParamValue> {
        &self.extra
    }

    pub fn is_compiled(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Option<&BuildArtifact> {
        self.artifact.as_ref()
    }

    pub fn input_deck_path(&self) -> PathBuf {
        self.working_dir.join(&self.config.execution.input_deck)
    }

    /// Append a component; invalidates any previous build
    pub fn add_component(&mut self, component: Component) -> &mut Self {
        self.components.push(component);
        self.artifact = None;
        self
    }

    /// Merge initial-state values (last write wins)
    pub fn set_initial_state<K, V, I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        for (key, value) in values {
            self.initial_state.insert(key.into(), value.into());
        }
        self
    }

    /// Merge run configuration values
    ///
    /// `duration`, `dt` and `output_step` must be numeric; other keys are
    /// stored as extras.
    pub fn set_config<K, V, I>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<ParamValue>,
    {
        for (key, value) in values {
            let key = key.into();
            let value = value.into();
            let slot = match key.as_str() {
                "duration" => &mut self.run.duration,
                "dt" => &mut self.run.dt,
                "output_step" => &mut self.run.output_step,
                _ => {
                    self.extra.insert(key, value);
                    continue;
                }
            };
            *slot = value.as_f64().ok_or_else(|| {
                SimforgeError::Config(format!("'{}' must be a number, got '{}'", key, value))
            })?;
        }
        Ok(self)
    }

    /// Problems preventing a build; empty when valid
    pub fn validate(&self) -> Vec<String> {
        let names = self.component_names();
        let mut errors: Vec<String> = self
            .config
            .assembly
            .required_components
            .iter()
            .filter(|required| !names.contains(&required.as_str()))
            .map(|required| format!("Missing required component: {}", required))
            .collect();
        errors.extend(
            self.components
                .iter()
                .filter(|c| !self.registry.contains(&c.name))
                .map(|c| format!("Unknown component: {}", c.name)),
        );
        errors
    }

    /// Deck contents for the current assembly
    pub fn render_input_deck(&self) -> String {
        input_deck::render(&input_deck::DeckInputs {
            title: &self.name,
            class_name: &self.config.target.class_name,
            components: &self.components,
            initial_state: &self.initial_state,
            run: &self.run,
            registry: &self.registry,
        })
    }

    /// Write the configuration deck into the working directory
    pub fn generate_input_file(&self) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.working_dir)
            .map_err(|e| SimforgeError::io(&self.working_dir, e))?;
        let path = self.input_deck_path();
        std::fs::write(&path, self.render_input_deck()).map_err(|e| SimforgeError::io(&path, e))?;
        info!("Generated input file: {}", path.display());
        Ok(path)
    }

    fn compose_engine(&self) -> ComposeEngine {
        ComposeEngine::new(
            &self.config.paths.components,
            TargetEntity::from(&self.config.target),
        )
    }

    /// Validate, write the deck, compose and build; cached until invalidated
    pub fn compile(&mut self, force: bool) -> Result<PathBuf> {
        if let (Some(artifact), false) = (&self.artifact, force) {
            return Ok(artifact.executable.clone());
        }

        let errors = self.validate();
        if !errors.is_empty() {
            return Err(SimforgeError::Validation(errors));
        }

        self.generate_input_file()?;

        info!("Compiling simulation '{}'", self.name);
        let sources = self.compose_engine().compose(&self.component_names())?;
        let artifact = BuildOrchestrator::from_config(&self.config).build(
            &self.name,
            &self.working_dir,
            &sources,
        )?;
        let executable = artifact.executable.clone();
        self.artifact = Some(artifact);
        Ok(executable)
    }

    /// Run with optional duration/step overrides, recompiling when needed
    pub fn run(
        &mut self,
        duration: Option<f64>,
        dt: Option<f64>,
        recompile: bool,
    ) -> Result<Trajectory> {
        if let Some(duration) = duration {
            self.run.duration = duration;
        }
        if let Some(dt) = dt {
            self.run.dt = dt;
        }

        let executable = self.compile(recompile)?;
        let deck = self.generate_input_file()?;

        info!("Running simulation '{}'", self.name);
        let output = Runner::from_config(&self.config.execution).run(&executable, &deck)?;
        let trajectory = Trajectory::from_file(&output)?;
        info!("Simulation complete. Output: {}", output.display());
        Ok(trajectory)
    }

    /// Compare a trajectory against a reference file
    pub fn compare(&self, trajectory: Trajectory, reference: &Path) -> Result<TrajectoryComparator> {
        TrajectoryComparator::against_file(trajectory, reference)
    }
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation: {}", self.name)?;
        writeln!(f, "Working Directory: {}", self.working_dir.display())?;
        write!(f, "Components ({}):", self.components.len())?;
        for comp in &self.components {
            write!(f, "\n  - {}", comp.name)?;
        }
        if !self.initial_state.is_empty() {
            write!(f, "\nInitial State:")?;
            for (key, value) in &self.initial_state {
                write!(f, "\n  {} = {}", key, value)?;
            }
        }
        Ok(())
    }
}
