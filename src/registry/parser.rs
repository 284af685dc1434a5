//! Metadata document parsing.
//!
//! A document holds one or more entries separated by a line containing
//! exactly `---`. Each entry carries its metadata in a fenced `yaml` block.

use super::types::{
    lenient_string, scalar_to_string, ComponentMetadata, Dependencies, Lifecycle, VariableSpec,
};
use crate::error::{Result, SimforgeError};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    dof: String,
    #[serde(default, deserialize_with = "lenient_string")]
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    component: Option<RawHeader>,
    #[serde(default)]
    lifecycle: Lifecycle,
    #[serde(default, deserialize_with = "nullable_vec")]
    inputs: Vec<VariableSpec>,
    #[serde(default, deserialize_with = "nullable_vec")]
    outputs: Vec<VariableSpec>,
    #[serde(default, deserialize_with = "nullable_vec")]
    parameters: Vec<VariableSpec>,
    #[serde(default)]
    dependencies: Dependencies,
    #[serde(default, deserialize_with = "lenient_string")]
    usage_example: String,
    #[serde(default)]
    notes: Vec<serde_yaml::Value>,
}

fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Split a document into its `---` separated entries
pub fn split_entries(content: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            entries.push(&content[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    entries.push(&content[start..]);
    entries.into_iter().filter(|e| !e.trim().is_empty()).collect()
}

/// Extract the body of the first fenced `yaml` block in an entry
pub fn extract_yaml_block(entry: &str) -> Option<String> {
    let mut lines = entry.lines();
    lines.by_ref().find(|l| l.trim_start().starts_with("```yaml"))?;
    let mut body = Vec::new();
    for line in lines {
        if line.trim_start().starts_with("```") {
            return Some(body.join("\n"));
        }
        body.push(line);
    }
    None
}

/// Parse one entry. `Ok(None)` when the entry carries no component block.
pub fn parse_entry(entry: &str, source_file: &Path) -> Result<Option<ComponentMetadata>> {
    let Some(yaml) = extract_yaml_block(entry) else {
        return Ok(None);
    };

    let raw: Option<RawEntry> =
        serde_yaml::from_str(&yaml).map_err(|e| SimforgeError::MetadataParse {
            path: source_file.to_path_buf(),
            message: e.to_string(),
        })?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let Some(header) = raw.component else {
        return Ok(None);
    };
    if header.name.is_empty() {
        return Err(SimforgeError::MetadataParse {
            path: source_file.to_path_buf(),
            message: "component block has no name".to_string(),
        });
    }

    Ok(Some(ComponentMetadata {
        name: header.name,
        category: header.category,
        dof: header.dof,
        description: header.description,
        lifecycle: raw.lifecycle,
        inputs: raw.inputs,
        outputs: raw.outputs,
        parameters: raw.parameters,
        dependencies: raw.dependencies,
        usage_example: raw.usage_example.trim_end().to_string(),
        notes: raw.notes.into_iter().map(scalar_to_string).collect(),
        source_file: Some(source_file.to_path_buf()),
    }))
}

/// Parse every entry of a document, collecting per-entry outcomes
pub fn parse_document(content: &str, source_file: &Path) -> Vec<Result<ComponentMetadata>> {
    split_entries(content)
        .into_iter()
        .filter_map(|entry| parse_entry(entry, source_file).transpose())
        .collect()
}
