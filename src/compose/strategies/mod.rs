//! Built-in merge strategies.

mod concat;
mod environment;
mod forces;

pub use concat::ConcatMerge;
pub use environment::{EnvironmentMerge, EnvironmentRole};
pub use forces::ForcesMerge;

use super::donor::DonorSource;
use crate::error::CompositionError;

pub(crate) fn unsupported(
    module: &str,
    donors: &[DonorSource],
    reason: impl Into<String>,
) -> CompositionError {
    CompositionError::UnsupportedCombination {
        module: module.to_string(),
        donors: donors.iter().map(|d| d.component.clone()).collect(),
        reason: reason.into(),
    }
}

/// Deduplicated includes across donors, first occurrence wins
pub(crate) fn merged_includes(donors: &[DonorSource]) -> Vec<String> {
    let mut includes: Vec<String> = Vec::new();
    for donor in donors {
        for inc in &donor.includes {
            if !includes.contains(inc) {
                includes.push(inc.clone());
            }
        }
    }
    includes
}
