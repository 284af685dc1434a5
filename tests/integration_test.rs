#![allow(deprecated)]

/// CLI integration tests: registry browsing, grouping, comparison and the
/// full regression run against a stand-in toolchain
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const INDEX: &str = r#"# Components

```yaml
component:
  name: time_management
  category: Core
  dof: 3/6
```

---

```yaml
component:
  name: termination
  category: Core
  dof: 3/6
```

---

```yaml
component:
  name: gravity_constant
  category: Environment
  dof: 3/6
  description: Constant gravitational acceleration
parameters:
  - index: 0
    name: grav
    type: double
    unit: m/s^2
    description: Gravity
```

---

```yaml
component:
  name: drag_simple
  category: Aerodynamics
  dof: 3DoF
```
"#;

const SIM: &str = r#"
name = "ball3"

[[components]]
name = "time_management"

[[components]]
name = "gravity_constant"
parameters = { grav = 9.81 }

[[components]]
name = "termination"

[config]
duration = 1.0
"#;

fn simforge() -> Command {
    Command::cargo_bin("simforge").unwrap()
}

/// Project with metadata, one donor source and a framework skeleton
fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("components/environment")).unwrap();
    fs::write(root.join("components/INDEX.md"), INDEX).unwrap();
    fs::write(
        root.join("components/environment/gravity_constant.cpp"),
        "#include \"class_hierarchy.hpp\"\nvoid Vehicle::def_environment()\n{\n\tvehicle[0].init(\"grav\",0,\"Gravity - m/s^2\",\"out\",\"\",\"\");\n}\nvoid Vehicle::environment(double int_step)\n{\n\tdouble grav=vehicle[0].real();\n\tvehicle[0].gets(grav);\n}\n",
    )
    .unwrap();

    fs::create_dir_all(root.join("framework")).unwrap();
    fs::write(root.join("framework/execution.cpp"), "int main() {}\n").unwrap();

    fs::write(root.join("ball3.toml"), SIM).unwrap();
    temp_dir
}

fn write(root: &Path, name: &str, content: &str) {
    fs::write(root.join(name), content).unwrap();
}

// ============================================================================
// REGISTRY AND GROUPING
// ============================================================================

#[test]
fn test_components_list() {
    let project = project();
    simforge()
        .current_dir(project.path())
        .args(["components", "list", "--category", "core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("time_management"))
        .stdout(predicate::str::contains("termination"))
        .stdout(predicate::str::contains("drag_simple").not());
}

#[test]
fn test_components_show() {
    let project = project();
    simforge()
        .current_dir(project.path())
        .args(["components", "show", "gravity_constant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Constant gravitational acceleration"))
        .stdout(predicate::str::contains("grav"));
}

#[test]
fn test_components_show_unknown_fails() {
    let project = project();
    simforge()
        .current_dir(project.path())
        .args(["components", "show", "warp_drive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("warp_drive"));
}

#[test]
fn test_components_without_metadata_fails() {
    let temp_dir = TempDir::new().unwrap();
    simforge()
        .current_dir(temp_dir.path())
        .args(["components", "categories"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load component metadata"));
}

#[test]
fn test_group_command() {
    let temp_dir = TempDir::new().unwrap();
    simforge()
        .current_dir(temp_dir.path())
        .args(["group", "gravity_constant", "drag_simple", "forces_3dof", "wind_none"])
        .assert()
        .success()
        .stdout(predicate::str::contains("environment"))
        .stdout(predicate::str::contains("forces"));
}

#[test]
fn test_compose_writes_module_sources() {
    let project = project();
    let out = project.path().join("out");
    simforge()
        .current_dir(project.path())
        .args(["compose", "--sim", "ball3.toml", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("environment.cpp"));

    let source = fs::read_to_string(out.join("environment.cpp")).unwrap();
    assert!(source.contains("def_environment"));
}

// ============================================================================
// COMPARISON
// ============================================================================

#[test]
fn test_compare_within_tolerance() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "test.asc", "time alt\n0 10\n1 5\n");
    write(temp_dir.path(), "ref.asc", "time alt\n0 10\n1 5.001\n");

    simforge()
        .current_dir(temp_dir.path())
        .args(["compare", "test.asc", "ref.asc", "--tol", "alt=0.01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Verdict: PASS"));
}

#[test]
fn test_compare_out_of_tolerance_fails() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "test.asc", "time alt\n0 10\n1 5\n");
    write(temp_dir.path(), "ref.asc", "time alt\n0 10\n1 7\n");

    simforge()
        .current_dir(temp_dir.path())
        .args(["compare", "test.asc", "ref.asc", "--tol", "alt=0.01"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Verdict: FAIL"))
        .stderr(predicate::str::contains("Regression failed: alt"));
}

#[test]
fn test_compare_json_report() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "test.asc", "time alt\n0 10\n1 5\n");
    write(temp_dir.path(), "ref.asc", "time alt\n0 10\n1 5\n");

    let output = simforge()
        .current_dir(temp_dir.path())
        .args(["compare", "test.asc", "ref.asc", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["simulation"], "test");
    assert_eq!(report["comparison"]["rms"]["alt"], 0.0);
}

#[test]
fn test_compare_missing_reference_fails() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "test.asc", "time alt\n0 10\n1 5\n");

    simforge()
        .current_dir(temp_dir.path())
        .args(["compare", "test.asc", "missing.asc"])
        .assert()
        .failure();
}

// ============================================================================
// FULL REGRESSION
// ============================================================================

#[cfg(unix)]
mod regress {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_CXX: &str = "#!/bin/sh\nwhile [ $# -gt 0 ]; do\n  if [ \"$1\" = \"-o\" ]; then shift; printf '#!/bin/sh\\nprintf \"time alt\\\\n0 10\\\\n1 5\\\\n\" > plot1.asc\\n' > \"$1\"; chmod +x \"$1\"; fi\n  shift\ndone\n";

    fn with_toolchain(root: &Path) {
        let cxx = root.join("fake-cxx");
        fs::write(&cxx, FAKE_CXX).unwrap();
        fs::set_permissions(&cxx, fs::Permissions::from_mode(0o755)).unwrap();
        write(
            root,
            "simforge.toml",
            &format!(
                "[toolchain]\ncompiler = \"{}\"\nframework_files = [\"execution.cpp\"]\n",
                cxx.display()
            ),
        );
    }

    #[test]
    fn test_run_exports_csv() {
        let project = project();
        with_toolchain(project.path());

        simforge()
            .current_dir(project.path())
            .args(["run", "--sim", "ball3.toml", "--csv", "ball3.csv"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Trajectory: 2 time points"));

        let csv = fs::read_to_string(project.path().join("ball3.csv")).unwrap();
        assert!(csv.starts_with("time,alt\n"));
    }

    #[test]
    fn test_regress_passes() {
        let project = project();
        with_toolchain(project.path());
        write(project.path(), "ref.asc", "time alt\n0 10\n1 5\n");

        simforge()
            .current_dir(project.path())
            .args([
                "regress", "--sim", "ball3.toml", "--reference", "ref.asc", "--tol", "alt=1e-6",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("Regression passed"));
    }

    #[test]
    fn test_regress_markdown_report_on_drift() {
        let project = project();
        with_toolchain(project.path());
        write(project.path(), "ref.asc", "time alt\n0 10\n1 9\n");

        simforge()
            .current_dir(project.path())
            .args([
                "regress",
                "--sim",
                "ball3.toml",
                "--reference",
                "ref.asc",
                "--tol",
                "alt=0.1",
                "--keep-going",
                "--format",
                "markdown",
                "--output",
                "report.md",
            ])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Regression failed: alt"));

        let report = fs::read_to_string(project.path().join("report.md")).unwrap();
        assert!(report.starts_with("# Regression Report: ball3"));
        assert!(report.contains("| alt |"));
    }
}
