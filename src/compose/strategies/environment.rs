use super::{merged_includes, unsupported};
use crate::compose::donor::{DonorFunction, DonorSource, Line, Statement};
use crate::compose::strategy::MergeStrategy;
use crate::compose::{EmittedFunction, MergedModule};
use crate::error::CompositionError;
use crate::types::LifecyclePhase;

/// Quantity an environment provider computes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentRole {
    Gravity,
    Atmosphere,
    Wind,
}

impl EnvironmentRole {
    /// Role of a known provider component
    pub fn of(component: &str) -> Option<Self> {
        match component {
            "gravity_constant" | "gravity_wgs84_simple" => Some(EnvironmentRole::Gravity),
            "atmosphere_constant" | "atmosphere_us76" => Some(EnvironmentRole::Atmosphere),
            "wind_none" | "wind_constant" => Some(EnvironmentRole::Wind),
            _ => None,
        }
    }
}

/// Combines gravity, atmosphere and wind providers into one environment module
///
/// The definition function lists every provider's slot declarations. The
/// initialization and per-step functions run each provider's body in its
/// own scope so their locals cannot collide.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentMerge;

impl MergeStrategy for EnvironmentMerge {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn merge(&self, module: &str, donors: &[DonorSource]) -> Result<MergedModule, CompositionError> {
        let mut seen: Vec<EnvironmentRole> = Vec::new();
        for donor in donors {
            let Some(role) = EnvironmentRole::of(&donor.component) else {
                return Err(unsupported(
                    module,
                    donors,
                    format!("'{}' is not a known environment provider", donor.component),
                ));
            };
            if seen.contains(&role) {
                return Err(unsupported(
                    module,
                    donors,
                    format!("more than one {:?} provider", role),
                ));
            }
            seen.push(role);
        }

        let mut functions = Vec::new();
        for phase in LifecyclePhase::all() {
            let contributing: Vec<(&DonorSource, &DonorFunction)> = donors
                .iter()
                .filter_map(|d| d.function(phase).map(|f| (d, f)))
                .collect();
            let Some((_, first)) = contributing.first() else {
                continue;
            };

            let mut body = Vec::new();
            for (i, (donor, function)) in contributing.iter().enumerate() {
                if i > 0 {
                    body.push(Line::blank());
                }
                body.push(Line::code("\t", format!("//{}", donor.component)));
                match phase {
                    LifecyclePhase::Definition => {
                        body.extend(
                            function
                                .body
                                .iter()
                                .filter(|l| matches!(l.stmt, Statement::Declare(_)))
                                .map(|l| Line::new("\t", l.stmt.clone())),
                        );
                    }
                    _ => {
                        body.push(Line::code("\t", "{"));
                        body.extend(function.body.iter().map(|l| match l.stmt {
                            Statement::Blank => Line::blank(),
                            _ => Line::new(format!("\t{}", l.indent), l.stmt.clone()),
                        }));
                        body.push(Line::code("\t", "}"));
                    }
                }
            }

            functions.push(EmittedFunction {
                note: None,
                function: DonorFunction {
                    return_type: first.return_type.clone(),
                    name: first.name.clone(),
                    params: first.params.clone(),
                    body,
                },
            });
        }

        Ok(MergedModule {
            module: module.to_string(),
            donors: donors.iter().map(|d| d.component.clone()).collect(),
            includes: merged_includes(donors),
            functions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::donor::parse_donor;
    use crate::compose::render::{render_module, TargetEntity};
    use std::path::Path;

    const GRAVITY: &str = "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_environment()\n{\n\tvehicle[0].init(\"grav\",\"D\",0,\"Gravity acceleration - m/s^2\",\"environment\",\"out\",\"\");\n}\nvoid Vehicle::environment(double int_step)\n{\n\tdouble grav=vehicle[0].real();\n\tgrav = 9.81;\n\tvehicle[0].gets(grav);\n}\n";

    const ATMOSPHERE: &str = "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_environment()\n{\n\t//output data\n\tvehicle[12].init(\"rho\",0,\"Air density - kg/m^3\",\"out\",\"\",\"\");\n}\nvoid Vehicle::environment(double int_step)\n{\n\tdouble rho=vehicle[12].real();\n\trho = 1.225;\n\tvehicle[12].gets(rho);\n}\n";

    fn donor(name: &str, src: &str) -> DonorSource {
        parse_donor(name, Path::new("x.cpp"), src, &TargetEntity::default()).unwrap()
    }

    #[test]
    fn test_role_of_known_providers() {
        assert_eq!(EnvironmentRole::of("gravity_wgs84_simple"), Some(EnvironmentRole::Gravity));
        assert_eq!(EnvironmentRole::of("atmosphere_us76"), Some(EnvironmentRole::Atmosphere));
        assert_eq!(EnvironmentRole::of("wind_none"), Some(EnvironmentRole::Wind));
        assert_eq!(EnvironmentRole::of("drag_simple"), None);
    }

    #[test]
    fn test_merge_gravity_and_atmosphere() {
        let donors = vec![
            donor("gravity_constant", GRAVITY),
            donor("atmosphere_constant", ATMOSPHERE),
        ];
        let merged = EnvironmentMerge.merge("environment", &donors).unwrap();
        assert_eq!(merged.functions.len(), 2);
        assert_eq!(merged.includes.len(), 1);

        let text = render_module(&merged, &TargetEntity::default());
        assert!(text.contains("void Ball::def_environment()"));
        assert!(text.contains("\tball[0].init(\"grav\""));
        assert!(text.contains("\tball[12].init(\"rho\""));
        assert!(!text.contains("//output data"));
        assert!(text.contains("void Ball::environment(double int_step)"));
        assert!(text.contains("\t{\n\t\tdouble grav=ball[0].real();"));
        assert!(text.contains("\t\tball[12].gets(rho);\n\t}"));
        assert!(!text.contains("vehicle"));

        let grav_at = text.find("double grav").unwrap();
        let rho_at = text.find("double rho").unwrap();
        assert!(grav_at < rho_at);
    }

    #[test]
    fn test_unknown_provider_is_unsupported() {
        let donors = vec![
            donor("gravity_constant", GRAVITY),
            donor("custom_env", ATMOSPHERE),
        ];
        let err = EnvironmentMerge.merge("environment", &donors).unwrap_err();
        assert!(matches!(err, CompositionError::UnsupportedCombination { .. }));
    }

    #[test]
    fn test_two_providers_for_one_role_is_unsupported() {
        let donors = vec![
            donor("gravity_constant", GRAVITY),
            donor("gravity_wgs84_simple", GRAVITY),
        ];
        let err = EnvironmentMerge.merge("environment", &donors).unwrap_err();
        assert!(err.to_string().contains("more than one Gravity provider"));
    }
}
