//! Rendering of module IR into target-entity source text.

use super::donor::{DonorFunction, Line, Segment, Statement};
use super::MergedModule;
use crate::config::TargetConfig;
use std::fmt::Write as _;

/// Naming of the vehicle entity on both sides of the rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntity {
    /// Class qualifier emitted in generated code (`Ball`)
    pub class_name: String,
    /// State array emitted in generated code (`ball`)
    pub array: String,
    /// Class qualifier donors are written against (`Vehicle`)
    pub generic_class: String,
    /// State array donors are written against (`vehicle`)
    pub generic_array: String,
}

impl TargetEntity {
    pub fn new(class_name: impl Into<String>, array: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            array: array.into(),
            ..Self::default()
        }
    }
}

impl Default for TargetEntity {
    fn default() -> Self {
        TargetEntity::from(&TargetConfig::default())
    }
}

impl From<&TargetConfig> for TargetEntity {
    fn from(config: &TargetConfig) -> Self {
        Self {
            class_name: config.class_name.clone(),
            array: config.state_array.clone(),
            generic_class: config.generic_class.clone(),
            generic_array: config.generic_array.clone(),
        }
    }
}

/// Render one statement (without indentation)
pub fn render_statement(stmt: &Statement, target: &TargetEntity) -> String {
    let arr = &target.array;
    match stmt {
        Statement::Blank => String::new(),
        Statement::Declare(decl) => {
            format!("{}[{}].init(\"{}\",{});", arr, decl.index, decl.name, decl.args)
        }
        Statement::Load(load) => match &load.ty {
            Some(ty) => format!(
                "{} {}={}[{}].{}();",
                ty, load.target, arr, load.index, load.getter
            ),
            None => format!("{}={}[{}].{}();", load.target, arr, load.index, load.getter),
        },
        Statement::Store(store) => {
            format!("{}[{}].{}({});", arr, store.index, store.setter, store.value)
        }
        Statement::Code(segments) => {
            let mut out = String::new();
            for seg in segments {
                match seg {
                    Segment::Text(t) => out.push_str(t),
                    Segment::SlotRef(i) => {
                        let _ = write!(out, "{}[{}]", arr, i);
                    }
                    Segment::ClassRef => {
                        let _ = write!(out, "{}::", target.class_name);
                    }
                }
            }
            out
        }
    }
}

pub fn render_line(line: &Line, target: &TargetEntity) -> String {
    match line.stmt {
        Statement::Blank => String::new(),
        _ => format!("{}{}", line.indent, render_statement(&line.stmt, target)),
    }
}

/// Render a function definition with the target class qualifier
pub fn render_function(function: &DonorFunction, target: &TargetEntity) -> String {
    let mut out = format!(
        "{} {}::{}({})\n{{\n",
        function.return_type, target.class_name, function.name, function.params
    );
    for line in &function.body {
        out.push_str(&render_line(line, target));
        out.push('\n');
    }
    out.push_str("}\n");
    out
}

/// Render a complete module source file
pub fn render_module(module: &MergedModule, target: &TargetEntity) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Module: {}", module.module);
    let _ = writeln!(out, "// Components: {}", module.donors.join(", "));
    for include in &module.includes {
        out.push_str(include);
        out.push('\n');
    }
    for emitted in &module.functions {
        out.push('\n');
        if let Some(note) = &emitted.note {
            let _ = writeln!(out, "// {}", note);
        }
        out.push_str(&render_function(&emitted.function, target));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::donor::{SlotDecl, SlotLoad, SlotStore};

    fn ball() -> TargetEntity {
        TargetEntity::default()
    }

    #[test]
    fn test_target_entity_default() {
        let t = ball();
        assert_eq!(t.class_name, "Ball");
        assert_eq!(t.array, "ball");
        assert_eq!(t.generic_class, "Vehicle");
        assert_eq!(t.generic_array, "vehicle");
    }

    #[test]
    fn test_render_declare() {
        let stmt = Statement::Declare(SlotDecl {
            index: 12,
            name: "rho".to_string(),
            args: "0,\"Air density - kg/m^3\",\"out\",\"\",\"\"".to_string(),
            owner: "atmosphere_constant".to_string(),
        });
        assert_eq!(
            render_statement(&stmt, &ball()),
            "ball[12].init(\"rho\",0,\"Air density - kg/m^3\",\"out\",\"\",\"\");"
        );
    }

    #[test]
    fn test_render_load_with_and_without_type() {
        let typed = Statement::Load(SlotLoad {
            ty: Some("Matrix".to_string()),
            target: "VBEL".to_string(),
            index: 21,
            getter: "vec".to_string(),
        });
        assert_eq!(render_statement(&typed, &ball()), "Matrix VBEL=ball[21].vec();");

        let untyped = Statement::Load(SlotLoad {
            ty: None,
            target: "FSPB".to_string(),
            index: 14,
            getter: "vec".to_string(),
        });
        assert_eq!(render_statement(&untyped, &ball()), "FSPB=ball[14].vec();");
    }

    #[test]
    fn test_render_store() {
        let stmt = Statement::Store(SlotStore {
            index: 14,
            setter: "gets_vec".to_string(),
            value: "FSPB".to_string(),
        });
        assert_eq!(render_statement(&stmt, &ball()), "ball[14].gets_vec(FSPB);");
    }

    #[test]
    fn test_render_code_segments() {
        let stmt = Statement::Code(vec![
            Segment::Text("x = ".to_string()),
            Segment::SlotRef(3),
            Segment::Text(".real() + 1;".to_string()),
        ]);
        assert_eq!(render_statement(&stmt, &ball()), "x = ball[3].real() + 1;");
    }
}
