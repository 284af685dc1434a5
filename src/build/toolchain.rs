//! Native compiler invocation.

use crate::config::ToolchainConfig;
use crate::process::BoundedCommand;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Compiler settings resolved from configuration
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub compiler: String,
    pub standard: String,
    pub optimization: String,
    pub warning_flags: Vec<String>,
    pub include_dirs: Vec<PathBuf>,
    pub timeout: Duration,
}

impl Toolchain {
    pub fn from_config(config: &ToolchainConfig, timeout_secs: u64) -> Self {
        Self {
            compiler: config.compiler.clone(),
            standard: config.standard.clone(),
            optimization: config.optimization.clone(),
            warning_flags: config.warning_flags.clone(),
            include_dirs: config.include_dirs.clone(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// `<compiler> <std> <opt> <warnings> <sources> -I <build_dir> [-I extra] -o <output>`
    ///
    /// Sources are given relative to `build_dir`, which is also the working
    /// directory of the invocation.
    pub fn command(&self, build_dir: &Path, sources: &[String], output: &str) -> BoundedCommand {
        let mut cmd = BoundedCommand::new(&self.compiler, self.timeout)
            .current_dir(build_dir)
            .arg(&self.standard)
            .arg(&self.optimization)
            .args(&self.warning_flags)
            .args(sources)
            .arg("-I")
            .arg(build_dir);
        for dir in &self.include_dirs {
            cmd = cmd.arg("-I").arg(dir);
        }
        cmd.arg("-o").arg(output)
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::from_config(&ToolchainConfig::default(), 60)
    }
}
