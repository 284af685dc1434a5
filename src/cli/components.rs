//! Component catalog commands: list, show, categories, group

use colored::Colorize;
use simforge::{group_components, ComponentRegistry};

/// Names matching the optional category and DoF filters
pub fn filter_components(
    registry: &ComponentRegistry,
    category: Option<&str>,
    dof: Option<&str>,
) -> Vec<String> {
    let mut names = match category {
        Some(category) => registry.list_by_category(category),
        None => registry.list_all(),
    };
    if let Some(dof) = dof {
        let matching = registry.find_by_dof(dof);
        names.retain(|name| matching.contains(name));
    }
    names
}

pub fn cmd_components_list(
    registry: &ComponentRegistry,
    category: Option<String>,
    dof: Option<String>,
) -> anyhow::Result<()> {
    let names = filter_components(registry, category.as_deref(), dof.as_deref());
    if names.is_empty() {
        println!("{}", "No matching components".yellow());
        return Ok(());
    }

    println!(
        "{} ({})",
        "Components".bright_cyan().bold(),
        names.len()
    );
    for name in names {
        let Some(meta) = registry.get(&name) else {
            continue;
        };
        println!(
            "  {:<28} {:<16} {}",
            name.cyan(),
            meta.category.dimmed(),
            meta.dof
        );
    }
    Ok(())
}

pub fn cmd_components_show(registry: &ComponentRegistry, name: &str) -> anyhow::Result<()> {
    let Some(meta) = registry.get(name) else {
        anyhow::bail!("Component '{}' not found in the metadata registry", name);
    };
    print!("{}", meta);
    if !meta.usage_example.is_empty() {
        println!("  Usage:");
        for line in meta.usage_example.lines() {
            println!("    {}", line.dimmed());
        }
    }
    Ok(())
}

pub fn cmd_components_categories(registry: &ComponentRegistry) -> anyhow::Result<()> {
    println!("{}", "Categories".bright_cyan().bold());
    for category in registry.get_categories() {
        let count = registry.list_by_category(&category).len();
        println!("  {:<20} {}", category, count.to_string().dimmed());
    }
    Ok(())
}

pub fn cmd_group(names: &[String]) -> anyhow::Result<()> {
    let grouping = group_components(names);
    println!(
        "{} ({} modules)",
        "Module Grouping".bright_cyan().bold(),
        grouping.len()
    );
    print!("{}", grouping);
    Ok(())
}
