//! Component metadata store.
//!
//! Loads declarative descriptions of the available physics components from
//! metadata documents found anywhere below a directory.

pub mod parser;
pub mod types;

pub use types::{ComponentMetadata, Dependencies, Lifecycle, SlotRange, VariableSpec};

use crate::error::{Result, SimforgeError};
use crate::types::Dof;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Default metadata document name
pub const INDEX_FILENAME: &str = "INDEX.md";

/// Registry of all available components
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    root: Option<PathBuf>,
    index_file: String,
    components: IndexMap<String, ComponentMetadata>,
}

impl ComponentRegistry {
    /// Empty registry that looks for `INDEX.md` documents
    pub fn new() -> Self {
        Self {
            root: None,
            index_file: INDEX_FILENAME.to_string(),
            components: IndexMap::new(),
        }
    }

    /// Load every `INDEX.md` below `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        Self::load_with(dir, INDEX_FILENAME)
    }

    /// Load every document named `index_file` below `dir`
    pub fn load_with(dir: &Path, index_file: &str) -> Result<Self> {
        let mut registry = Self {
            index_file: index_file.to_string(),
            ..Self::new()
        };
        registry.reload(dir)?;
        Ok(registry)
    }

    /// Replace the index with the documents found below `dir`
    ///
    /// Documents are read in sorted path order; when two entries share a
    /// name the later one wins.
    pub fn reload(&mut self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            return Err(SimforgeError::io(
                dir,
                std::io::Error::new(std::io::ErrorKind::NotFound, "metadata directory not found"),
            ));
        }

        let mut documents: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && e.file_name() == self.index_file.as_str())
            .map(|e| e.into_path())
            .collect();
        documents.sort();

        let mut components: IndexMap<String, ComponentMetadata> = IndexMap::new();
        for doc in &documents {
            let content = std::fs::read_to_string(doc).map_err(|e| SimforgeError::io(doc, e))?;
            for parsed in parser::parse_document(&content, doc) {
                match parsed {
                    Ok(meta) => {
                        if let Some(previous) = components.get(&meta.name) {
                            warn!(
                                "Duplicate component '{}' in {} replaces entry from {}",
                                meta.name,
                                doc.display(),
                                previous
                                    .source_file
                                    .as_deref()
                                    .map(|p| p.display().to_string())
                                    .unwrap_or_default()
                            );
                        }
                        debug!("Loaded component metadata: {}", meta.name);
                        components.insert(meta.name.clone(), meta);
                    }
                    Err(e) => warn!("Skipping metadata block: {}", e),
                }
            }
        }

        info!(
            "Loaded {} components from {} metadata documents under {}",
            components.len(),
            documents.len(),
            dir.display()
        );
        self.components = components;
        self.root = Some(dir.to_path_buf());
        Ok(())
    }

    /// Register metadata directly
    pub fn insert(&mut self, meta: ComponentMetadata) {
        self.components.insert(meta.name.clone(), meta);
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Get component metadata by name
    pub fn get(&self, name: &str) -> Option<&ComponentMetadata> {
        self.components.get(name)
    }

    /// All component names, sorted
    pub fn list_all(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        names.sort();
        names
    }

    /// Components in a category (case-insensitive), sorted
    pub fn list_by_category(&self, category: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .components
            .values()
            .filter(|m| m.category.eq_ignore_ascii_case(category))
            .map(|m| m.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Unique categories, sorted
    pub fn get_categories(&self) -> Vec<String> {
        self.components
            .values()
            .map(|m| m.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Components supporting a DoF query (`3`, `6`, `3DoF`, `6DoF`, `3/6`)
    ///
    /// A component tagged `3/6` matches both fidelities; the `3/6` query
    /// matches every component with a recognizable tag.
    pub fn find_by_dof(&self, query: &str) -> Vec<String> {
        let Some(wanted) = Dof::parse_tag(query) else {
            return Vec::new();
        };
        let mut names: Vec<String> = self
            .components
            .values()
            .filter(|m| m.dof_tag().is_some_and(|tag| tag.matches(wanted)))
            .map(|m| m.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Dependency declarations of a component (empty when unknown)
    pub fn check_dependencies(&self, name: &str) -> Dependencies {
        self.get(name)
            .map(|m| m.dependencies.clone())
            .unwrap_or_default()
    }
}

impl fmt::Display for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component Registry ({} components)", self.components.len())?;
        for category in self.get_categories() {
            let comps = self.list_by_category(&category);
            write!(f, "\n\n{} ({}):", category, comps.len())?;
            for comp in comps {
                write!(f, "\n  - {}", comp)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(name: &str, category: &str, dof: &str) -> String {
        format!(
            "# Component Index: {name}\n\n```yaml\ncomponent:\n  name: {name}\n  category: {category}\n  dof: {dof}\n  description: {name} component\n\nlifecycle:\n  def: true\n  init: false\n  exec: true\n\ndependencies:\n  required_before: ['environment']\n  required_after: []\n  optional: []\n```\n"
        )
    }

    fn library() -> TempDir {
        let dir = TempDir::new().unwrap();
        let env = dir.path().join("environment");
        let dyn_ = dir.path().join("dynamics");
        std::fs::create_dir_all(&env).unwrap();
        std::fs::create_dir_all(&dyn_).unwrap();
        std::fs::write(
            env.join(INDEX_FILENAME),
            [
                entry("gravity_constant", "Environment", "3/6"),
                entry("atmosphere_us76", "Environment", "3/6"),
            ]
            .join("\n---\n"),
        )
        .unwrap();
        std::fs::write(
            dyn_.join(INDEX_FILENAME),
            [
                entry("forces_3dof", "Dynamics", "3DoF"),
                entry("newton_6dof", "dynamics", "6DoF"),
                "```yaml\ncomponent:\n  name: [broken\n```\n".to_string(),
            ]
            .join("\n---\n"),
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_load_skips_malformed_blocks() {
        let dir = library();
        let registry = ComponentRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.len(), 4);
        assert!(registry.get("forces_3dof").is_some());
    }

    #[test]
    fn test_list_all_sorted() {
        let dir = library();
        let registry = ComponentRegistry::load(dir.path()).unwrap();
        assert_eq!(
            registry.list_all(),
            vec![
                "atmosphere_us76",
                "forces_3dof",
                "gravity_constant",
                "newton_6dof"
            ]
        );
    }

    #[test]
    fn test_list_by_category_case_insensitive() {
        let dir = library();
        let registry = ComponentRegistry::load(dir.path()).unwrap();
        assert_eq!(
            registry.list_by_category("DYNAMICS"),
            vec!["forces_3dof", "newton_6dof"]
        );
        assert!(registry.list_by_category("guidance").is_empty());
    }

    #[test]
    fn test_get_categories_unique_sorted() {
        let dir = library();
        let registry = ComponentRegistry::load(dir.path()).unwrap();
        assert_eq!(
            registry.get_categories(),
            vec!["Dynamics", "Environment", "dynamics"]
        );
    }

    #[test]
    fn test_find_by_dof() {
        let dir = library();
        let registry = ComponentRegistry::load(dir.path()).unwrap();

        assert_eq!(
            registry.find_by_dof("3"),
            vec!["atmosphere_us76", "forces_3dof", "gravity_constant"]
        );
        assert_eq!(
            registry.find_by_dof("6DoF"),
            vec!["atmosphere_us76", "gravity_constant", "newton_6dof"]
        );
        assert_eq!(registry.find_by_dof("3/6").len(), 4);
        assert!(registry.find_by_dof("x").is_empty());
    }

    #[test]
    fn test_check_dependencies() {
        let dir = library();
        let registry = ComponentRegistry::load(dir.path()).unwrap();
        assert_eq!(
            registry.check_dependencies("forces_3dof").required_before,
            vec!["environment"]
        );
        assert!(registry.check_dependencies("unknown").is_empty());
    }

    #[test]
    fn test_duplicate_name_last_document_wins() {
        let dir = TempDir::new().unwrap();
        for sub in ["a", "b"] {
            let d = dir.path().join(sub);
            std::fs::create_dir_all(&d).unwrap();
            std::fs::write(d.join(INDEX_FILENAME), entry("wind_none", sub, "3")).unwrap();
        }
        let registry = ComponentRegistry::load(dir.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("wind_none").unwrap().category, "b");
    }

    #[test]
    fn test_reload_is_identical() {
        let dir = library();
        let first = ComponentRegistry::load(dir.path()).unwrap();
        let mut second = first.clone();
        second.reload(dir.path()).unwrap();
        assert_eq!(first.list_all(), second.list_all());
        for name in first.list_all() {
            assert_eq!(first.get(&name), second.get(&name));
        }
    }

    #[test]
    fn test_reload_replaces_index() {
        let dir = library();
        let mut registry = ComponentRegistry::load(dir.path()).unwrap();
        let other = TempDir::new().unwrap();
        std::fs::write(
            other.path().join(INDEX_FILENAME),
            entry("tvc_simple", "Actuators", "6DoF"),
        )
        .unwrap();
        registry.reload(other.path()).unwrap();
        assert_eq!(registry.list_all(), vec!["tvc_simple"]);
    }

    #[test]
    fn test_custom_index_file_name() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("META.md"),
            entry("gps_perfect", "Sensors", "3/6"),
        )
        .unwrap();
        let registry = ComponentRegistry::load_with(dir.path(), "META.md").unwrap();
        assert!(registry.contains("gps_perfect"));
        assert!(ComponentRegistry::load(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let err = ComponentRegistry::load(Path::new("/nonexistent/simforge/components"));
        assert!(err.is_err());
    }

    #[test]
    fn test_display_groups_by_category() {
        let dir = library();
        let registry = ComponentRegistry::load(dir.path()).unwrap();
        let text = registry.to_string();
        assert!(text.starts_with("Component Registry (4 components)"));
        assert!(text.contains("Environment (2):\n  - atmosphere_us76\n  - gravity_constant"));
    }
}
