//! Static catalog of the component library.
//!
//! Every library component has a constructor on [`ComponentFactory`] that
//! sets its default lifecycle and parameters. [`by_name`] resolves a name
//! to a parameterless instance for data-driven assembly.

use super::Component;
use crate::types::LifecyclePhase::{self, Definition as Def, Execution as Exec, Initialization as Init};

const DEF_EXEC: &[LifecyclePhase] = &[Def, Exec];
const DEF_INIT_EXEC: &[LifecyclePhase] = &[Def, Init, Exec];

/// Catalog row describing one library component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub category: &'static str,
    pub lifecycle: &'static [LifecyclePhase],
    pub summary: &'static str,
}

pub const CATALOG: &[CatalogEntry] = &[
    entry("time_management", "Utilities", DEF_EXEC, "Time management (required)"),
    entry("termination", "Utilities", DEF_EXEC, "Termination conditions"),
    entry("gravity_constant", "Environment", DEF_EXEC, "Constant gravity"),
    entry("gravity_wgs84_simple", "Environment", DEF_EXEC, "Altitude-varying gravity"),
    entry("atmosphere_constant", "Environment", DEF_EXEC, "Constant density atmosphere"),
    entry("atmosphere_us76", "Environment", DEF_EXEC, "US Standard Atmosphere 1976"),
    entry("wind_none", "Environment", DEF_EXEC, "No wind"),
    entry("wind_constant", "Environment", DEF_EXEC, "Constant wind vector"),
    entry("kinematics_3dof_flat", "Kinematics", DEF_INIT_EXEC, "3DoF kinematics on flat Earth"),
    entry("kinematics_6dof", "Kinematics", DEF_INIT_EXEC, "6DoF kinematics with DCM integration"),
    entry("forces_3dof", "Dynamics", DEF_EXEC, "3DoF force summation"),
    entry("newton_6dof", "Dynamics", DEF_INIT_EXEC, "6DoF translational dynamics"),
    entry("euler_6dof", "Dynamics", DEF_INIT_EXEC, "6DoF rotational dynamics"),
    entry("forces_6dof", "Dynamics", DEF_EXEC, "6DoF force and moment summation"),
    entry("drag_simple", "Aerodynamics", DEF_EXEC, "Drag-only aerodynamics"),
    entry("aero_3dof_table", "Aerodynamics", DEF_EXEC, "3DoF table aerodynamics"),
    entry("aerodynamics_6dof", "Aerodynamics", DEF_EXEC, "6DoF table aerodynamics"),
    entry("thrust_constant", "Propulsion", DEF_EXEC, "Constant thrust"),
    entry("rocket_motor_simple", "Propulsion", DEF_INIT_EXEC, "Simple rocket motor"),
    entry("propulsion_staging", "Propulsion", DEF_INIT_EXEC, "Multi-stage propulsion"),
    entry("guidance_none", "Guidance", DEF_EXEC, "Ballistic, no guidance"),
    entry("guidance_proportional_nav", "Guidance", DEF_EXEC, "Proportional navigation"),
    entry("guidance_pitch_program", "Guidance", DEF_INIT_EXEC, "Time-based pitch program"),
    entry("control_none", "Control", DEF_EXEC, "No control"),
    entry("control_rate_damping", "Control", DEF_EXEC, "Rate damping"),
    entry("control_accel_autopilot", "Control", DEF_INIT_EXEC, "3DoF acceleration autopilot"),
    entry("control_accel_6dof", "Control", DEF_INIT_EXEC, "6DoF acceleration autopilot"),
    entry("actuator_first_order", "Actuators", DEF_INIT_EXEC, "First-order actuator lag"),
    entry("tvc_simple", "Actuators", DEF_INIT_EXEC, "Thrust vector control"),
    entry("rcs_simple", "Actuators", DEF_INIT_EXEC, "Reaction control system"),
    entry("seeker_perfect", "Sensors", DEF_EXEC, "Perfect target seeker"),
    entry("gps_perfect", "Sensors", DEF_EXEC, "Perfect GPS"),
    entry("target_fixed", "Navigation", DEF_INIT_EXEC, "Stationary target"),
    entry("target_const_velocity", "Navigation", DEF_INIT_EXEC, "Constant velocity target"),
    entry("intercept_simple", "Navigation", DEF_EXEC, "Miss distance calculation"),
];

const fn entry(
    name: &'static str,
    category: &'static str,
    lifecycle: &'static [LifecyclePhase],
    summary: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        name,
        category,
        lifecycle,
        summary,
    }
}

/// Parameterless instance of a catalog component with its default lifecycle
pub fn by_name(name: &str) -> Option<Component> {
    CATALOG
        .iter()
        .find(|e| e.name == name)
        .map(|e| Component::with_lifecycle(e.name, e.lifecycle))
}

fn base(name: &str) -> Component {
    by_name(name).unwrap_or_else(|| Component::new(name))
}

/// Constructors for the component library
pub struct ComponentFactory;

impl ComponentFactory {
    // ===== UTILITIES =====

    pub fn time_management() -> Component {
        base("time_management")
    }

    pub fn termination(altitude_min: Option<f64>, time_max: Option<f64>) -> Component {
        let mut comp = base("termination");
        if let Some(alt) = altitude_min {
            comp = comp.set_parameter("altitude_min", alt);
        }
        if let Some(t) = time_max {
            comp = comp.set_parameter("time_max", t);
        }
        comp
    }

    // ===== ENVIRONMENT =====

    pub fn gravity_constant(grav: f64) -> Component {
        base("gravity_constant").set_parameter("grav", grav)
    }

    pub fn gravity_wgs84_simple() -> Component {
        base("gravity_wgs84_simple")
    }

    pub fn atmosphere_constant(rho: f64) -> Component {
        base("atmosphere_constant").set_parameter("rho", rho)
    }

    pub fn atmosphere_us76() -> Component {
        base("atmosphere_us76")
    }

    pub fn wind_none() -> Component {
        base("wind_none")
    }

    /// Constant wind: speed (m/s), direction from north (deg), vertical (m/s, down positive)
    pub fn wind_constant(dvae: f64, psiwdx: f64, vaed3: f64) -> Component {
        base("wind_constant")
            .set_parameter("dvae", dvae)
            .set_parameter("psiwdx", psiwdx)
            .set_parameter("vaed3", vaed3)
    }

    // ===== KINEMATICS =====

    pub fn kinematics_3dof_flat() -> Component {
        base("kinematics_3dof_flat")
    }

    pub fn kinematics_6dof(psi: f64, theta: f64, phi: f64) -> Component {
        base("kinematics_6dof")
            .set_parameter("psibdx", psi)
            .set_parameter("thtbdx", theta)
            .set_parameter("phibdx", phi)
    }

    // ===== DYNAMICS =====

    pub fn forces_3dof() -> Component {
        base("forces_3dof")
    }

    pub fn newton_6dof() -> Component {
        base("newton_6dof")
    }

    pub fn euler_6dof() -> Component {
        base("euler_6dof")
    }

    pub fn forces_6dof() -> Component {
        base("forces_6dof")
    }

    // ===== AERODYNAMICS =====

    pub fn drag_simple(cd: f64, area: f64) -> Component {
        base("drag_simple")
            .set_parameter("cd", cd)
            .set_parameter("area", area)
    }

    pub fn aero_3dof_table() -> Component {
        base("aero_3dof_table")
    }

    pub fn aerodynamics_6dof(maero: i64, refa: f64, refd: f64) -> Component {
        base("aerodynamics_6dof")
            .set_parameter("maero", maero)
            .set_parameter("refa", refa)
            .set_parameter("refd", refd)
    }

    // ===== PROPULSION =====

    pub fn thrust_constant(thrust: f64) -> Component {
        base("thrust_constant").set_parameter("thrust", thrust)
    }

    pub fn rocket_motor_simple(thrust: f64, burntime: f64, spi: f64) -> Component {
        base("rocket_motor_simple")
            .set_parameter("thrust", thrust)
            .set_parameter("burntime", burntime)
            .set_parameter("spi", spi)
    }

    pub fn propulsion_staging(
        mprop: i64,
        vmass0: f64,
        fmass0: f64,
        spi: f64,
        fuel_flow_rate: f64,
    ) -> Component {
        base("propulsion_staging")
            .set_parameter("mprop", mprop)
            .set_parameter("vmass0", vmass0)
            .set_parameter("fmass0", fmass0)
            .set_parameter("spi", spi)
            .set_parameter("fuel_flow_rate", fuel_flow_rate)
    }

    // ===== GUIDANCE =====

    pub fn guidance_none() -> Component {
        base("guidance_none")
    }

    pub fn guidance_proportional_nav(gnav: f64, gmax: f64) -> Component {
        base("guidance_proportional_nav")
            .set_parameter("gnav", gnav)
            .set_parameter("gmax", gmax)
    }

    pub fn guidance_pitch_program(time_table: Vec<f64>, pitch_table: Vec<f64>) -> Component {
        base("guidance_pitch_program")
            .set_parameter("npitch", time_table.len() as i64)
            .set_parameter("time_table", time_table)
            .set_parameter("pitch_table", pitch_table)
    }

    // ===== CONTROL =====

    pub fn control_none() -> Component {
        base("control_none")
    }

    pub fn control_rate_damping(gain: f64) -> Component {
        base("control_rate_damping").set_parameter("gain", gain)
    }

    pub fn control_accel_autopilot(waclp: f64, zaclp: f64, paclp: f64) -> Component {
        base("control_accel_autopilot")
            .set_parameter("waclp", waclp)
            .set_parameter("zaclp", zaclp)
            .set_parameter("paclp", paclp)
    }

    pub fn control_accel_6dof(waclp: f64, zaclp: f64, paclp: f64) -> Component {
        base("control_accel_6dof")
            .set_parameter("waclp", waclp)
            .set_parameter("zaclp", zaclp)
            .set_parameter("paclp", paclp)
    }

    // ===== ACTUATORS =====

    pub fn actuator_first_order(tau: f64) -> Component {
        base("actuator_first_order").set_parameter("tau", tau)
    }

    pub fn tvc_simple(wntvc: f64, zettvc: f64, tvclimx: f64) -> Component {
        base("tvc_simple")
            .set_parameter("wntvc", wntvc)
            .set_parameter("zettvc", zettvc)
            .set_parameter("tvclimx", tvclimx)
    }

    pub fn rcs_simple(rcs_zeta: f64, rcs_freq: f64) -> Component {
        base("rcs_simple")
            .set_parameter("rcs_zeta", rcs_zeta)
            .set_parameter("rcs_freq", rcs_freq)
    }

    // ===== SENSORS =====

    pub fn seeker_perfect() -> Component {
        base("seeker_perfect")
    }

    pub fn gps_perfect() -> Component {
        base("gps_perfect")
    }

    // ===== NAVIGATION =====

    pub fn target_fixed(x: f64, y: f64, z: f64) -> Component {
        base("target_fixed")
            .set_parameter("x", x)
            .set_parameter("y", y)
            .set_parameter("z", z)
    }

    pub fn target_const_velocity(x: f64, y: f64, z: f64, vx: f64, vy: f64, vz: f64) -> Component {
        base("target_const_velocity")
            .set_parameter("x", x)
            .set_parameter("y", y)
            .set_parameter("z", z)
            .set_parameter("vx", vx)
            .set_parameter("vy", vy)
            .set_parameter("vz", vz)
    }

    pub fn intercept_simple() -> Component {
        base("intercept_simple")
    }
}
