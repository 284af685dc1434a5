//! Pluggable merge strategies for multi-donor modules.

use super::donor::DonorSource;
use super::strategies::{ConcatMerge, EnvironmentMerge, ForcesMerge};
use super::MergedModule;
use crate::error::CompositionError;
use std::collections::HashMap;

/// Combines several donors contributing to one module
pub trait MergeStrategy: Send + Sync {
    /// Strategy name for diagnostics
    fn name(&self) -> &'static str;

    /// Merge `donors` (in bucket order) into a single module
    fn merge(&self, module: &str, donors: &[DonorSource]) -> Result<MergedModule, CompositionError>;
}

/// Merge strategies keyed by module name
pub struct StrategyRegistry {
    strategies: HashMap<String, Box<dyn MergeStrategy>>,
    fallback: Box<dyn MergeStrategy>,
}

impl StrategyRegistry {
    /// Registry with no module-specific strategies
    pub fn empty() -> Self {
        Self {
            strategies: HashMap::new(),
            fallback: Box::new(ConcatMerge),
        }
    }

    pub fn register(mut self, module: impl Into<String>, strategy: Box<dyn MergeStrategy>) -> Self {
        self.strategies.insert(module.into(), strategy);
        self
    }

    /// Strategy for `module`, or the concatenating fallback
    pub fn get(&self, module: &str) -> &dyn MergeStrategy {
        self.strategies
            .get(module)
            .map(|s| s.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn has(&self, module: &str) -> bool {
        self.strategies.contains_key(module)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::empty()
            .register("environment", Box::new(EnvironmentMerge))
            .register("forces", Box::new(ForcesMerge))
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut modules: Vec<_> = self.strategies.keys().collect();
        modules.sort();
        f.debug_struct("StrategyRegistry")
            .field("modules", &modules)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
