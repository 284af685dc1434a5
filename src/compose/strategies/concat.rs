use super::merged_includes;
use crate::compose::donor::DonorSource;
use crate::compose::strategy::MergeStrategy;
use crate::compose::{EmittedFunction, MergedModule};
use crate::error::CompositionError;

/// Fallback for modules without a dedicated strategy: every donor's
/// functions in donor order, with duplicate includes removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatMerge;

impl MergeStrategy for ConcatMerge {
    fn name(&self) -> &'static str {
        "concat"
    }

    fn merge(&self, module: &str, donors: &[DonorSource]) -> Result<MergedModule, CompositionError> {
        let functions = donors
            .iter()
            .flat_map(|donor| {
                donor.functions.iter().map(move |f| EmittedFunction {
                    note: Some(format!("From {}", donor.component)),
                    function: f.clone(),
                })
            })
            .collect();

        Ok(MergedModule {
            module: module.to_string(),
            donors: donors.iter().map(|d| d.component.clone()).collect(),
            includes: merged_includes(donors),
            functions,
        })
    }
}
