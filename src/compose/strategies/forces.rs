use super::{merged_includes, unsupported};
use crate::compose::donor::{
    DonorFunction, DonorSource, Line, SlotDecl, SlotLoad, SlotStore, Statement,
};
use crate::compose::strategy::MergeStrategy;
use crate::compose::{EmittedFunction, MergedModule};
use crate::error::CompositionError;

const DRAG_DONOR: &str = "drag_simple";
const SUMMATION_DONOR: &str = "forces_3dof";

/// Speed below which the drag direction is undefined
const MIN_SPEED: &str = "0.01";

/// Merges a drag donor with a force summation donor
///
/// The generated per-step function computes drag from dynamic pressure,
/// opposite the velocity, adds gravity on the down axis and stores speed
/// and specific force. Slot indices come from the donors' own declarations
/// and loads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForcesMerge;

struct ForceSlots {
    cd: SlotDecl,
    area: SlotDecl,
    speed: SlotDecl,
    force: SlotDecl,
    grav: usize,
    rho: usize,
    velocity: usize,
}

fn declared(module: &str, donor: &DonorSource, slot: &str) -> Result<SlotDecl, CompositionError> {
    donor
        .declaration(slot)
        .cloned()
        .ok_or_else(|| missing(module, donor, slot))
}

fn loaded(module: &str, donor: &DonorSource, slot: &str) -> Result<usize, CompositionError> {
    donor
        .load(slot)
        .map(|l| l.index)
        .ok_or_else(|| missing(module, donor, slot))
}

fn missing(module: &str, donor: &DonorSource, slot: &str) -> CompositionError {
    CompositionError::MissingSlot {
        module: module.to_string(),
        component: donor.component.clone(),
        slot: slot.to_string(),
    }
}

fn load(ty: &str, target: &str, index: usize, getter: &str) -> Line {
    Line::new(
        "\t",
        Statement::Load(SlotLoad {
            ty: Some(ty.to_string()),
            target: target.to_string(),
            index,
            getter: getter.to_string(),
        }),
    )
}

fn store(index: usize, setter: &str, value: &str) -> Line {
    Line::new(
        "\t",
        Statement::Store(SlotStore {
            index,
            setter: setter.to_string(),
            value: value.to_string(),
        }),
    )
}

impl ForcesMerge {
    fn slots(
        module: &str,
        drag: &DonorSource,
        summation: &DonorSource,
    ) -> Result<ForceSlots, CompositionError> {
        Ok(ForceSlots {
            cd: declared(module, drag, "cd")?,
            area: declared(module, drag, "area")?,
            speed: declared(module, drag, "dvbe")?,
            force: declared(module, summation, "FSPA")?,
            grav: loaded(module, drag, "grav")?,
            rho: loaded(module, drag, "rho")?,
            velocity: loaded(module, drag, "VBEL")?,
        })
    }

    fn definition(slots: &ForceSlots) -> DonorFunction {
        let decl = |d: &SlotDecl| Line::new("\t", Statement::Declare(d.clone()));
        DonorFunction {
            return_type: "void".to_string(),
            name: "def_forces".to_string(),
            params: String::new(),
            body: vec![
                Line::code("\t", "//input data"),
                decl(&slots.cd),
                decl(&slots.area),
                Line::code("\t", "//output to other modules"),
                decl(&slots.speed),
                decl(&slots.force),
            ],
        }
    }

    fn execution(slots: &ForceSlots) -> DonorFunction {
        let force = slots.force.name.as_str();
        let speed = slots.speed.name.as_str();
        DonorFunction {
            return_type: "void".to_string(),
            name: "forces".to_string(),
            params: "double int_step".to_string(),
            body: vec![
                Line::code("\t", "//localizing module-variables"),
                load("double", "cd", slots.cd.index, "real"),
                load("double", "area", slots.area.index, "real"),
                load("double", "grav", slots.grav, "real"),
                load("double", "rho", slots.rho, "real"),
                load("Matrix", "VBEL", slots.velocity, "vec"),
                Line::blank(),
                Line::code("\t", format!("double {}=VBEL.absolute();", speed)),
                Line::blank(),
                Line::code("\t", "//drag opposing velocity"),
                Line::code("\t", format!("Matrix {}(3,1);", force)),
                Line::code("\t", format!("if({}>{}){{", speed, MIN_SPEED)),
                Line::code("\t\t", format!("double pdynmc=0.5*rho*{s}*{s};", s = speed)),
                Line::code("\t\t", format!("Matrix drag_dir=VBEL*(-1.0/{});", speed)),
                Line::code("\t\t", format!("{}=drag_dir*(pdynmc*cd*area);", force)),
                Line::code("\t", "}"),
                Line::blank(),
                Line::code("\t", "//gravity on the down axis"),
                Line::code("\t", format!("{f}[2]={f}[2]+grav;", f = force)),
                Line::blank(),
                Line::code("\t", "//loading module-variables"),
                store(slots.speed.index, "gets", speed),
                store(slots.force.index, "gets_vec", force),
            ],
        }
    }
}

impl MergeStrategy for ForcesMerge {
    fn name(&self) -> &'static str {
        "forces"
    }

    fn merge(&self, module: &str, donors: &[DonorSource]) -> Result<MergedModule, CompositionError> {
        let [first, second] = donors else {
            return Err(unsupported(
                module,
                donors,
                "only a drag donor paired with a force summation donor can be merged",
            ));
        };
        let (drag, summation) = match (first.component.as_str(), second.component.as_str()) {
            (DRAG_DONOR, SUMMATION_DONOR) => (first, second),
            (SUMMATION_DONOR, DRAG_DONOR) => (second, first),
            _ => {
                return Err(unsupported(
                    module,
                    donors,
                    format!("expected {} with {}", DRAG_DONOR, SUMMATION_DONOR),
                ))
            }
        };

        let slots = Self::slots(module, drag, summation)?;
        Ok(MergedModule {
            module: module.to_string(),
            donors: donors.iter().map(|d| d.component.clone()).collect(),
            includes: merged_includes(donors),
            functions: vec![
                EmittedFunction {
                    note: None,
                    function: Self::definition(&slots),
                },
                EmittedFunction {
                    note: None,
                    function: Self::execution(&slots),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::donor::parse_donor;
    use crate::compose::render::{render_module, TargetEntity};
    use std::path::Path;

    const DRAG: &str = r#"#include "class_hierarchy.hpp"

void Vehicle::def_forces()
{
	vehicle[10].init("cd",0,"Drag coefficient - ND","data","","");
	vehicle[11].init("area",0,"Reference area - m^2","data","","");
	vehicle[13].init("dvbe",0,"Speed - m/s","out","scrn","plot");
	vehicle[14].init("FSPB",0,0,0,"Specific force in body frame - m/s^2","out","","");
}

void Vehicle::forces(double int_step)
{
	Matrix FSPB(3,1);
	double cd=vehicle[10].real();
	double area=vehicle[11].real();
	double grav=vehicle[0].real();
	double rho=vehicle[12].real();
	Matrix VBEL=vehicle[21].vec();
	double dvbe = VBEL.absolute();
	vehicle[13].gets(dvbe);
	vehicle[14].gets_vec(FSPB);
}
"#;

    const SUMMATION: &str = r#"#include "class_hierarchy.hpp"

void Vehicle::def_forces()
{
	vehicle[14].init("FSPA",0,0,0,"Specific force in body frame - m/s^2","forces","out","");
	vehicle[150].init("aax",0,"Axial acceleration - g's","forces","diag","");
}

void Vehicle::forces(double int_step)
{
	Matrix FSPA(3,1);
	double grav=vehicle[0].real();
	vehicle[14].gets_vec(FSPA);
}
"#;

    fn donor(name: &str, src: &str) -> DonorSource {
        parse_donor(name, Path::new("x.cpp"), src, &TargetEntity::default()).unwrap()
    }

    #[test]
    fn test_merge_drag_with_summation() {
        let donors = vec![donor("forces_3dof", SUMMATION), donor("drag_simple", DRAG)];
        let merged = ForcesMerge.merge("forces", &donors).unwrap();
        let text = render_module(&merged, &TargetEntity::default());

        assert!(text.contains("ball[10].init(\"cd\""));
        assert!(text.contains("ball[11].init(\"area\""));
        assert!(text.contains("ball[13].init(\"dvbe\""));
        assert!(text.contains("ball[14].init(\"FSPA\",0,0,0"));
        assert!(!text.contains("FSPB"));
        assert!(!text.contains("aax"));

        assert!(text.contains("double rho=ball[12].real();"));
        assert!(text.contains("Matrix VBEL=ball[21].vec();"));
        assert!(text.contains("if(dvbe>0.01){"));
        assert!(text.contains("double pdynmc=0.5*rho*dvbe*dvbe;"));
        assert!(text.contains("FSPA[2]=FSPA[2]+grav;"));
        assert!(text.contains("ball[13].gets(dvbe);"));
        assert!(text.contains("ball[14].gets_vec(FSPA);"));
    }

    #[test]
    fn test_declarations_keep_their_owners() {
        let donors = vec![donor("forces_3dof", SUMMATION), donor("drag_simple", DRAG)];
        let merged = ForcesMerge.merge("forces", &donors).unwrap();
        let owners: Vec<(String, String)> = merged
            .declarations()
            .map(|d| (d.name.clone(), d.owner.clone()))
            .collect();
        assert_eq!(
            owners,
            vec![
                ("cd".to_string(), "drag_simple".to_string()),
                ("area".to_string(), "drag_simple".to_string()),
                ("dvbe".to_string(), "drag_simple".to_string()),
                ("FSPA".to_string(), "forces_3dof".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_pair_is_unsupported() {
        let donors = vec![donor("forces_3dof", SUMMATION), donor("forces_6dof", SUMMATION)];
        let err = ForcesMerge.merge("forces", &donors).unwrap_err();
        assert!(matches!(err, CompositionError::UnsupportedCombination { .. }));
    }

    #[test]
    fn test_three_donors_is_unsupported() {
        let donors = vec![
            donor("forces_3dof", SUMMATION),
            donor("drag_simple", DRAG),
            donor("forces_6dof", SUMMATION),
        ];
        assert!(ForcesMerge.merge("forces", &donors).is_err());
    }

    #[test]
    fn test_missing_slot_reported() {
        let no_velocity = DRAG.replace("\tMatrix VBEL=vehicle[21].vec();\n", "");
        let donors = vec![donor("forces_3dof", SUMMATION), donor("drag_simple", &no_velocity)];
        let err = ForcesMerge.merge("forces", &donors).unwrap_err();
        assert_eq!(
            err,
            CompositionError::MissingSlot {
                module: "forces".to_string(),
                component: "drag_simple".to_string(),
                slot: "VBEL".to_string(),
            }
        );
    }
}
