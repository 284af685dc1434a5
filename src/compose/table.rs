//! Fixed component to module mapping.

/// Component to module table, in declaration order
///
/// `time_management` and `termination` are handled natively by the target
/// program and are deliberately absent.
pub const MODULE_TABLE: &[(&str, &str)] = &[
    ("kinematics_3dof_flat", "kinematics"),
    ("kinematics_6dof", "kinematics"),
    ("forces_3dof", "forces"),
    ("drag_simple", "forces"),
    ("forces_6dof", "forces"),
    ("newton_6dof", "newton"),
    ("euler_6dof", "euler"),
    ("aero_3dof_table", "aerodynamics"),
    ("aerodynamics_6dof", "aerodynamics"),
    ("gravity_constant", "environment"),
    ("gravity_wgs84_simple", "environment"),
    ("atmosphere_constant", "environment"),
    ("atmosphere_us76", "environment"),
    ("wind_none", "environment"),
    ("wind_constant", "environment"),
    ("thrust_constant", "propulsion"),
    ("thrust_table", "propulsion"),
    ("rocket_motor_simple", "propulsion"),
    ("propulsion_staging", "propulsion"),
    ("guidance_none", "guidance"),
    ("guidance_pitch_program", "guidance"),
    ("guidance_proportional_nav", "guidance"),
    ("control_none", "control"),
    ("control_rate_damping", "control"),
    ("control_accel_autopilot", "control"),
    ("control_accel_6dof", "control"),
    ("actuator_first_order", "actuator"),
    ("tvc_simple", "tvc"),
    ("seeker_perfect", "seeker"),
    ("gps_perfect", "gps"),
    ("target_fixed", "target"),
    ("target_const_velocity", "target"),
    ("intercept_simple", "intercept"),
];

/// Module a component contributes to
pub fn module_for(component: &str) -> Option<&'static str> {
    MODULE_TABLE
        .iter()
        .find(|(c, _)| *c == component)
        .map(|(_, m)| *m)
}

/// Position of a component in the table
pub fn rank(component: &str) -> Option<usize> {
    MODULE_TABLE.iter().position(|(c, _)| *c == component)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_for() {
        assert_eq!(module_for("drag_simple"), Some("forces"));
        assert_eq!(module_for("wind_constant"), Some("environment"));
        assert_eq!(module_for("time_management"), None);
        assert_eq!(module_for("termination"), None);
    }

    #[test]
    fn test_rank_follows_declaration_order() {
        assert!(rank("forces_3dof").unwrap() < rank("drag_simple").unwrap());
        assert!(rank("gravity_constant").unwrap() < rank("atmosphere_constant").unwrap());
        assert_eq!(rank("rcs_simple"), None);
    }
}
