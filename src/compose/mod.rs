//! Module grouping and adaptation/merge engine.
//!
//! Requested components are bucketed into simulation modules using the
//! fixed [`table::MODULE_TABLE`]. Each bucket's donor sources are parsed
//! into an intermediate form, merged when several donors share a module,
//! checked against the build-wide [`SlotAllocator`] and rendered for the
//! target vehicle entity.

pub mod donor;
pub mod render;
pub mod slots;
pub mod strategies;
pub mod strategy;
pub mod table;

pub use donor::{DonorFunction, DonorSource};
pub use render::TargetEntity;
pub use slots::SlotAllocator;
pub use strategy::{MergeStrategy, StrategyRegistry};

use crate::error::{Result, SimforgeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Module name -> donor component names, in bucket order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGrouping {
    pub modules: IndexMap<String, Vec<String>>,
    /// Requested components with no module mapping
    pub unmapped: Vec<String>,
}

impl ModuleGrouping {
    pub fn get(&self, module: &str) -> Option<&Vec<String>> {
        self.modules.get(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Display for ModuleGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (module, donors) in &self.modules {
            writeln!(f, "{:<14} <- {}", module, donors.join(", "))?;
        }
        if !self.unmapped.is_empty() {
            writeln!(f, "{:<14}    {}", "(native)", self.unmapped.join(", "))?;
        }
        Ok(())
    }
}

/// Bucket components into modules
///
/// Buckets appear in order of the first component mapping to them; donors
/// inside a bucket follow their rank in the module table.
pub fn group_components<S: AsRef<str>>(components: &[S]) -> ModuleGrouping {
    let mut grouping = ModuleGrouping::default();
    for name in components {
        let name = name.as_ref();
        match table::module_for(name) {
            Some(module) => grouping
                .modules
                .entry(module.to_string())
                .or_default()
                .push(name.to_string()),
            None => {
                warn!("Component '{}' has no module mapping; skipping", name);
                grouping.unmapped.push(name.to_string());
            }
        }
    }
    for donors in grouping.modules.values_mut() {
        donors.sort_by_key(|d| table::rank(d).unwrap_or(usize::MAX));
    }
    grouping
}

/// A function in a merged module, with an optional provenance note
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedFunction {
    pub note: Option<String>,
    pub function: DonorFunction,
}

/// Module IR ready for slot checking and rendering
#[derive(Debug, Clone, PartialEq)]
pub struct MergedModule {
    pub module: String,
    pub donors: Vec<String>,
    pub includes: Vec<String>,
    pub functions: Vec<EmittedFunction>,
}

impl MergedModule {
    /// Single-donor adaptation: the donor's functions as they are
    pub fn from_donor(module: &str, donor: &DonorSource) -> Self {
        Self {
            module: module.to_string(),
            donors: vec![donor.component.clone()],
            includes: donor.includes.clone(),
            functions: donor
                .functions
                .iter()
                .map(|f| EmittedFunction {
                    note: None,
                    function: f.clone(),
                })
                .collect(),
        }
    }

    pub fn declarations(&self) -> impl Iterator<Item = &donor::SlotDecl> {
        self.functions.iter().flat_map(|f| f.function.declarations())
    }
}

/// Generated source for one simulation module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptedModuleSource {
    pub module: String,
    pub source: String,
    pub donors: Vec<String>,
}

impl AdaptedModuleSource {
    pub fn file_name(&self) -> String {
        format!("{}.cpp", self.module)
    }
}

/// Turns a component list into adapted module sources
#[derive(Debug)]
pub struct ComposeEngine {
    components_dir: PathBuf,
    target: TargetEntity,
    strategies: StrategyRegistry,
}

impl ComposeEngine {
    pub fn new(components_dir: impl Into<PathBuf>, target: TargetEntity) -> Self {
        Self {
            components_dir: components_dir.into(),
            target,
            strategies: StrategyRegistry::default(),
        }
    }

    pub fn with_strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn components_dir(&self) -> &Path {
        &self.components_dir
    }

    pub fn target(&self) -> &TargetEntity {
        &self.target
    }

    /// Locate `<name>.cpp` anywhere below the components directory
    pub fn locate_donor(&self, name: &str) -> Result<PathBuf> {
        let file_name = format!("{}.cpp", name);
        let mut matches: Vec<PathBuf> = WalkDir::new(&self.components_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == file_name.as_str())
            .map(|e| e.into_path())
            .collect();
        matches.sort();
        matches
            .into_iter()
            .next()
            .ok_or_else(|| SimforgeError::Lookup {
                component: name.to_string(),
                search_root: self.components_dir.clone(),
            })
    }

    pub fn load_donor(&self, name: &str) -> Result<DonorSource> {
        let path = self.locate_donor(name)?;
        debug!("Parsing donor {} from {}", name, path.display());
        Ok(DonorSource::from_file(name, &path, &self.target)?)
    }

    /// Merge the donors of one module
    pub fn merge_module(&self, module: &str, donors: &[DonorSource]) -> Result<MergedModule> {
        let merged = match donors {
            [single] => MergedModule::from_donor(module, single),
            _ => {
                let strategy = self.strategies.get(module);
                info!(
                    "Merging {} donors into '{}' with the {} strategy",
                    donors.len(),
                    module,
                    strategy.name()
                );
                strategy.merge(module, donors)?
            }
        };
        Ok(merged)
    }

    /// Group, merge, slot-check and render every module
    pub fn compose<S: AsRef<str>>(&self, components: &[S]) -> Result<Vec<AdaptedModuleSource>> {
        let grouping = group_components(components);
        let mut allocator = SlotAllocator::new();
        let mut sources = Vec::with_capacity(grouping.len());

        for (module, names) in &grouping.modules {
            let donors = names
                .iter()
                .map(|n| self.load_donor(n))
                .collect::<Result<Vec<_>>>()?;
            let merged = self.merge_module(module, &donors)?;

            for decl in merged.declarations() {
                allocator.reserve(decl.index, &decl.name, &decl.owner)?;
            }

            sources.push(AdaptedModuleSource {
                module: module.clone(),
                source: render::render_module(&merged, &self.target),
                donors: merged.donors,
            });
        }

        info!(
            "Composed {} modules reserving {} state slots",
            sources.len(),
            allocator.len()
        );
        Ok(sources)
    }

    /// Write adapted sources into `dir`, returning the written paths
    pub fn write_sources(sources: &[AdaptedModuleSource], dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| SimforgeError::io(dir, e))?;
        sources
            .iter()
            .map(|s| {
                let path = dir.join(s.file_name());
                std::fs::write(&path, &s.source).map_err(|e| SimforgeError::io(&path, e))?;
                Ok(path)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompositionError;
    use tempfile::TempDir;

    const GRAVITY: &str = "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_environment()\n{\n\tvehicle[0].init(\"grav\",\"D\",0,\"Gravity - m/s^2\",\"environment\",\"out\",\"\");\n}\nvoid Vehicle::environment(double int_step)\n{\n\tdouble grav=vehicle[0].real();\n\tgrav = 9.81;\n\tvehicle[0].gets(grav);\n}\n";

    const ATMOSPHERE: &str = "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_environment()\n{\n\tvehicle[12].init(\"rho\",0,\"Air density - kg/m^3\",\"out\",\"\",\"\");\n}\nvoid Vehicle::environment(double int_step)\n{\n\tdouble rho=vehicle[12].real();\n\trho = 1.225;\n\tvehicle[12].gets(rho);\n}\n";

    const KINEMATICS: &str = "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_kinematics()\n{\n\tvehicle[20].init(\"SBEL\",0,0,0,\"Position - m\",\"kinematics\",\"state\",\"\");\n\tvehicle[21].init(\"VBEL\",0,0,0,\"Velocity - m/s\",\"kinematics\",\"state\",\"\");\n}\nvoid Vehicle::init_kinematics()\n{\n\tMatrix SBEL=vehicle[20].vec();\n}\nvoid Vehicle::kinematics(double int_step)\n{\n\tMatrix FSPA=vehicle[14].vec();\n\tvehicle[20].gets_vec(SBEL);\n}\n";

    const DRAG: &str = "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_forces()\n{\n\tvehicle[10].init(\"cd\",0,\"Drag coefficient - ND\",\"data\",\"\",\"\");\n\tvehicle[11].init(\"area\",0,\"Reference area - m^2\",\"data\",\"\",\"\");\n\tvehicle[13].init(\"dvbe\",0,\"Speed - m/s\",\"out\",\"scrn\",\"plot\");\n\tvehicle[14].init(\"FSPB\",0,0,0,\"Specific force - m/s^2\",\"out\",\"\",\"\");\n}\nvoid Vehicle::forces(double int_step)\n{\n\tdouble cd=vehicle[10].real();\n\tdouble area=vehicle[11].real();\n\tdouble grav=vehicle[0].real();\n\tdouble rho=vehicle[12].real();\n\tMatrix VBEL=vehicle[21].vec();\n}\n";

    const SUMMATION: &str = "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_forces()\n{\n\tvehicle[14].init(\"FSPA\",0,0,0,\"Specific force - m/s^2\",\"forces\",\"out\",\"\");\n}\nvoid Vehicle::forces(double int_step)\n{\n\tMatrix FSPA(3,1);\n\tvehicle[14].gets_vec(FSPA);\n}\n";

    fn library() -> TempDir {
        let dir = TempDir::new().unwrap();
        let aero = DRAG
            .replace("def_forces", "def_aerodynamics")
            .replace("::forces", "::aerodynamics");
        let files = [
            ("environment/gravity_constant.cpp", GRAVITY),
            ("environment/atmosphere_constant.cpp", ATMOSPHERE),
            ("kinematics/kinematics_3dof_flat.cpp", KINEMATICS),
            ("aerodynamics/drag_simple.cpp", DRAG),
            ("dynamics/forces_3dof.cpp", SUMMATION),
            ("aerodynamics/aero_3dof_table.cpp", aero.as_str()),
        ];
        for (rel, content) in files {
            let path = dir.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        dir
    }

    fn engine(dir: &TempDir) -> ComposeEngine {
        ComposeEngine::new(dir.path(), TargetEntity::default())
    }

    // ============================================================================
    // GROUPING TESTS
    // ============================================================================

    #[test]
    fn test_group_orders_donors_by_table_rank() {
        let grouping = group_components(&[
            "drag_simple",
            "forces_3dof",
            "gravity_constant",
            "atmosphere_constant",
        ]);
        let expected: IndexMap<String, Vec<String>> = [
            (
                "forces".to_string(),
                vec!["forces_3dof".to_string(), "drag_simple".to_string()],
            ),
            (
                "environment".to_string(),
                vec![
                    "gravity_constant".to_string(),
                    "atmosphere_constant".to_string(),
                ],
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(grouping.modules, expected);
        assert!(grouping.unmapped.is_empty());
    }

    #[test]
    fn test_group_bucket_order_follows_first_request() {
        let grouping = group_components(&[
            "time_management",
            "atmosphere_constant",
            "kinematics_3dof_flat",
            "gravity_constant",
            "termination",
        ]);
        let modules: Vec<&String> = grouping.modules.keys().collect();
        assert_eq!(modules, vec!["environment", "kinematics"]);
        assert_eq!(
            grouping.get("environment").unwrap(),
            &vec!["gravity_constant", "atmosphere_constant"]
        );
        assert_eq!(grouping.unmapped, vec!["time_management", "termination"]);
    }

    #[test]
    fn test_group_keeps_repeated_names() {
        let grouping = group_components(&["wind_none", "wind_none"]);
        assert_eq!(grouping.get("environment").unwrap().len(), 2);
    }

    // ============================================================================
    // COMPOSITION TESTS
    // ============================================================================

    #[test]
    fn test_locate_donor_recursive() {
        let dir = library();
        let path = engine(&dir).locate_donor("drag_simple").unwrap();
        assert!(path.ends_with("aerodynamics/drag_simple.cpp"));
    }

    #[test]
    fn test_missing_donor_is_lookup_error() {
        let dir = library();
        let err = engine(&dir).locate_donor("warp_drive").unwrap_err();
        assert!(matches!(err, SimforgeError::Lookup { .. }));
    }

    #[test]
    fn test_compose_ballistic_set() {
        let dir = library();
        let sources = engine(&dir)
            .compose(&[
                "time_management",
                "kinematics_3dof_flat",
                "forces_3dof",
                "drag_simple",
                "gravity_constant",
                "atmosphere_constant",
                "termination",
            ])
            .unwrap();

        let modules: Vec<&str> = sources.iter().map(|s| s.module.as_str()).collect();
        assert_eq!(modules, vec!["kinematics", "forces", "environment"]);

        let kinematics = &sources[0];
        assert!(kinematics.source.contains("void Ball::init_kinematics()"));
        assert!(kinematics.source.contains("ball[20].init(\"SBEL\""));
        assert!(!kinematics.source.contains("vehicle["));

        let forces = &sources[1];
        assert_eq!(forces.donors, vec!["forces_3dof", "drag_simple"]);
        assert!(forces.source.contains("ball[14].gets_vec(FSPA);"));

        let environment = &sources[2];
        assert!(environment.source.contains("ball[0].init(\"grav\""));
        assert!(environment.source.contains("ball[12].init(\"rho\""));
    }

    #[test]
    fn test_compose_detects_slot_conflict() {
        let dir = library();
        let err = engine(&dir)
            .compose(&["drag_simple", "aero_3dof_table"])
            .unwrap_err();
        match err {
            SimforgeError::Composition(CompositionError::SlotConflict {
                index, held_by, ..
            }) => {
                assert_eq!(index, 10);
                assert_eq!(held_by, "drag_simple");
            }
            other => panic!("expected slot conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_compose_unsupported_environment_pair() {
        let dir = library();
        std::fs::write(dir.path().join("environment/gravity_wgs84_simple.cpp"), GRAVITY).unwrap();
        let err = engine(&dir)
            .compose(&["gravity_constant", "gravity_wgs84_simple"])
            .unwrap_err();
        assert!(matches!(
            err,
            SimforgeError::Composition(CompositionError::UnsupportedCombination { .. })
        ));
    }

    #[test]
    fn test_custom_target_entity() {
        let dir = library();
        let sources = ComposeEngine::new(dir.path(), TargetEntity::new("Rocket", "rocket"))
            .compose(&["gravity_constant"])
            .unwrap();
        assert!(sources[0].source.contains("void Rocket::def_environment()"));
        assert!(sources[0].source.contains("rocket[0].gets(grav);"));
    }

    #[test]
    fn test_write_sources() {
        let dir = library();
        let out = TempDir::new().unwrap();
        let sources = engine(&dir).compose(&["gravity_constant"]).unwrap();
        let written = ComposeEngine::write_sources(&sources, &out.path().join("build")).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].ends_with("environment.cpp"));
        assert!(written[0].exists());
    }
}
