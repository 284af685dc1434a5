//! Execution of a built simulation artifact.

use crate::config::ExecutionConfig;
use crate::error::{ExecutionError, Result, SimforgeError};
use crate::process::BoundedCommand;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Runs an artifact next to its configuration deck and finds its output
#[derive(Debug, Clone)]
pub struct Runner {
    timeout: Duration,
    output_candidates: Vec<String>,
}

impl Runner {
    pub fn new(timeout: Duration, output_candidates: Vec<String>) -> Self {
        Self {
            timeout,
            output_candidates,
        }
    }

    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(
            Duration::from_secs(config.run_timeout_secs),
            config.output_candidates.clone(),
        )
    }

    /// Run `executable` with `input_deck` and return the trajectory file path
    pub fn run(&self, executable: &Path, input_deck: &Path) -> Result<PathBuf> {
        // The child runs inside run_dir, so a relative path would no longer resolve
        let executable = executable
            .canonicalize()
            .map_err(|_| ExecutionError::ArtifactMissing(executable.to_path_buf()))?;
        if !input_deck.exists() {
            return Err(ExecutionError::InputMissing(input_deck.to_path_buf()).into());
        }

        let run_dir = executable
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        stage_deck(input_deck, &run_dir)?;
        self.clear_outputs(&run_dir)?;

        info!("Running {}", executable.display());
        let output = BoundedCommand::new(&executable, self.timeout)
            .current_dir(&run_dir)
            .run()?;

        if !output.success() {
            return Err(ExecutionError::Failed {
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            }
            .into());
        }
        debug!("Simulation stdout:\n{}", output.stdout);

        self.find_output(&run_dir)
    }

    /// Remove outputs left by an earlier run
    fn clear_outputs(&self, dir: &Path) -> Result<()> {
        for name in &self.output_candidates {
            let path = dir.join(name);
            match std::fs::remove_file(&path) {
                Ok(()) => debug!("Removed stale output {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(SimforgeError::io(&path, e)),
            }
        }
        Ok(())
    }

    /// First existing output candidate in `dir`
    pub fn find_output(&self, dir: &Path) -> Result<PathBuf> {
        self.output_candidates
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                ExecutionError::OutputMissing {
                    dir: dir.to_path_buf(),
                    candidates: self.output_candidates.clone(),
                }
                .into()
            })
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::from_config(&ExecutionConfig::default())
    }
}

/// Copy the deck into `run_dir` unless it already lives there
fn stage_deck(input_deck: &Path, run_dir: &Path) -> Result<()> {
    let Some(file_name) = input_deck.file_name() else {
        return Err(ExecutionError::InputMissing(input_deck.to_path_buf()).into());
    };
    let dest = run_dir.join(file_name);
    if same_file(input_deck, &dest) {
        return Ok(());
    }
    std::fs::copy(input_deck, &dest).map_err(|e| SimforgeError::io(&dest, e))?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
