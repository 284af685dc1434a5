//! Native configuration deck (`input.asc`) generation.

use crate::component::{phase_list, Component};
use crate::compose::table;
use crate::config::RunConfig;
use crate::registry::{ComponentRegistry, VariableSpec};
use crate::types::{LifecyclePhase, ParamValue};
use indexmap::IndexMap;
use std::fmt::Write;

/// Display toggles written on the OPTIONS line
pub const OPTIONS: &str = "y_scrn n_events y_tabout y_plot";

/// Inputs to one deck
#[derive(Debug, Clone, Copy)]
pub struct DeckInputs<'a> {
    pub title: &'a str,
    pub class_name: &'a str,
    pub components: &'a [Component],
    pub initial_state: &'a IndexMap<String, ParamValue>,
    pub run: &'a RunConfig,
    pub registry: &'a ComponentRegistry,
}

/// MODULES entries: module (or unmapped component) name and phase union,
/// in order of first appearance
pub fn module_entries(components: &[Component]) -> IndexMap<String, Vec<LifecyclePhase>> {
    let mut entries: IndexMap<String, Vec<LifecyclePhase>> = IndexMap::new();
    for comp in components {
        let key = table::module_for(&comp.name).unwrap_or(&comp.name);
        let phases = entries.entry(key.to_string()).or_default();
        for phase in &comp.enabled_lifecycle {
            if !phases.contains(phase) {
                phases.push(*phase);
            }
        }
        phases.sort();
    }
    entries
}

/// `//description - unit` for a variable, or a fallback description
fn trailing_comment(spec: Option<&VariableSpec>, fallback: &str) -> String {
    match spec {
        Some(v) if !v.unit.is_empty() => format!("//{} - {}", non_empty(&v.description, fallback), v.unit),
        Some(v) => format!("//{}", non_empty(&v.description, fallback)),
        None => format!("//{}", fallback),
    }
}

fn non_empty<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}

/// Any variable with this name declared by one of the components
fn find_variable<'a>(
    registry: &'a ComponentRegistry,
    components: &[Component],
    name: &str,
) -> Option<&'a VariableSpec> {
    components
        .iter()
        .filter_map(|c| registry.get(&c.name))
        .flat_map(|m| m.parameters.iter().chain(&m.outputs).chain(&m.inputs))
        .find(|v| v.name == name)
}

/// Render the full deck
pub fn render(inputs: &DeckInputs<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "TITLE {}", inputs.title);
    let _ = writeln!(out, "OPTIONS {}", OPTIONS);

    out.push_str("MODULES\n");
    for (name, phases) in module_entries(inputs.components) {
        let _ = writeln!(out, "\t{:<20}{}", name, phase_list(&phases));
    }
    out.push_str("END\n");

    out.push_str("TIMING\n");
    let _ = writeln!(out, "\tscrn_step {}", inputs.run.output_step);
    let _ = writeln!(out, "\tplot_step {}", inputs.run.output_step);
    let _ = writeln!(out, "\tint_step {}", inputs.run.dt);
    out.push_str("END\n");

    out.push_str("VEHICLES 1\n");
    let _ = writeln!(out, "\t{} {}", inputs.class_name, inputs.title);
    for comp in inputs.components {
        if comp.parameters.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\t\t//{}", comp.name);
        let meta = inputs.registry.get(&comp.name);
        for (key, value) in &comp.parameters {
            let spec = meta.and_then(|m| m.parameter(key));
            let _ = writeln!(
                out,
                "\t\t{} {}  {}",
                key,
                value,
                trailing_comment(spec, &format!("{} parameter", comp.name))
            );
        }
    }
    if !inputs.initial_state.is_empty() {
        out.push_str("\t\t//initial state\n");
        for (key, value) in inputs.initial_state {
            let spec = find_variable(inputs.registry, inputs.components, key);
            let _ = writeln!(
                out,
                "\t\t{} {}  {}",
                key,
                value,
                trailing_comment(spec, "Initial state")
            );
        }
    }
    out.push_str("\tEND\n");

    let _ = writeln!(out, "ENDTIME {}", inputs.run.duration);
    out.push_str("STOP\n");
    out
}
