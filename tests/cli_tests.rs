use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use reach_matrix::infra::fs::copy_dir_all;

fn sample_project() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/sample_project")
}

fn reach_matrix(cwd: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("reach-matrix").unwrap();
    cmd.current_dir(cwd).arg("--lang").arg("en");
    cmd
}

/// `plan` lists all nineteen configurations with their generated profiles
/// without touching the toolchain.
///
/// `plan` 列出全部十九个配置及其生成的 profile，且不调用工具链。
#[test]
fn plan_lists_the_whole_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = reach_matrix(dir.path());
    cmd.arg("plan")
        .arg("--project-dir")
        .arg(dir.path())
        .env("CARGO", "/definitely/not/cargo");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("19 configurations"))
        .stdout(predicate::str::contains("o0-none-debug"))
        .stdout(predicate::str::contains("reach-oz-fat"));
}

/// `plan --format json` emits machine-readable rows.
#[test]
fn plan_json_for_a_single_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let output = reach_matrix(dir.path())
        .args(["plan", "--only", "o1-fat", "--format", "json"])
        .arg("--project-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["configName"], "o1-fat");
    assert_eq!(rows[0]["profile"], "reach-o1-fat");
    assert_eq!(rows[0]["applicable"], serde_json::json!(["opt1"]));
    assert_eq!(
        rows[0]["expectedFailures"],
        serde_json::json!(["opt2", "lto", "fail", "fail_black_box"])
    );
}

/// Names outside the matrix are rejected before anything runs.
#[test]
fn unknown_configuration_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    reach_matrix(dir.path())
        .args(["plan", "--only", "o9-none"])
        .arg("--project-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("o9"));
}

/// `init --non-interactive` writes a settings file that `plan` then picks up.
///
/// `init --non-interactive` 写入设置文件，随后 `plan` 会读取它。
#[test]
fn init_writes_default_settings() {
    let dir = tempfile::tempdir().unwrap();
    reach_matrix(dir.path())
        .args(["init", "--non-interactive"])
        .assert()
        .success();

    let content = fs::read_to_string(dir.path().join("ReachMatrix.toml")).unwrap();
    assert!(content.contains("feature = \"unstable-internal-test\""));
    assert!(content.contains("profile_prefix = \"reach\""));

    // A second run keeps the existing file.
    fs::write(dir.path().join("ReachMatrix.toml"), "profile_prefix = \"mine\"\n").unwrap();
    reach_matrix(dir.path())
        .args(["init", "--non-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    reach_matrix(dir.path())
        .args(["plan", "--only", "o3-thin"])
        .arg("--project-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("mine-o3-thin"));

    reach_matrix(dir.path())
        .args(["init", "--non-interactive", "--force"])
        .assert()
        .success();
    let content = fs::read_to_string(dir.path().join("ReachMatrix.toml")).unwrap();
    assert!(content.contains("profile_prefix = \"reach\""));
}

/// An invalid settings file is reported instead of silently ignored.
#[test]
fn invalid_settings_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ReachMatrix.toml"), "feature = \"\"\n").unwrap();
    reach_matrix(dir.path())
        .arg("plan")
        .arg("--project-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("feature"));
}

/// A missing toolchain aborts the run with a non-zero exit code.
///
/// 缺少工具链会以非零退出码中止运行。
#[test]
fn missing_toolchain_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    reach_matrix(dir.path())
        .env("CARGO", "/definitely/not/cargo")
        .args(["run", "--only", "o0-none", "--only", "o1-none"])
        .arg("--project-dir")
        .arg(sample_project())
        .assert()
        .failure()
        .stdout(predicate::str::contains("o1-none was not run"))
        .stderr(predicate::str::contains("unavailable"));
}

/// A real toolchain run of the debug configuration: every test target of
/// the fixture is applicable and must pass.
///
/// 使用真实工具链运行 debug 配置：夹具的每个测试目标都适用且必须通过。
#[test]
fn debug_configuration_passes_on_the_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    reach_matrix(dir.path())
        .args(["run", "--only", "o0-none-debug"])
        .arg("--project-dir")
        .arg(sample_project())
        .arg("--json")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("All configurations passed."));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["passed"], true);
    assert_eq!(json["verdicts"][0]["configName"], "o0-none-debug");
    assert_eq!(json["verdicts"][0]["failedTests"], serde_json::json!([]));
}

/// Configurations below every threshold, between them and above them all
/// pass on the fixture with a real toolchain.
///
/// 低于所有门槛、介于门槛之间以及高于所有门槛的配置，在真实工具链下都能通过。
#[test]
fn optimized_configurations_pass_on_the_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    reach_matrix(dir.path())
        .args(["run", "--only", "o0-none", "--only", "o1-thin", "--only", "o1-fat"])
        .args(["--only", "o2-fat", "--only", "oz-none"])
        .arg("--project-dir")
        .arg(sample_project())
        .arg("--json")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("All configurations passed."));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["passed"], true);
    let verdicts = json["verdicts"].as_array().unwrap();
    assert_eq!(verdicts.len(), 5);
    for verdict in verdicts {
        assert_eq!(verdict["unexpectedlyBuiltProbes"], serde_json::json!([]));
        assert_eq!(verdict["failedTests"], serde_json::json!([]));
    }
}

/// A failing `#[cfg(test)]` unit test in the library errors the
/// configuration before any matrix test runs.
///
/// 库中失败的 `#[cfg(test)]` 单元测试会使配置在任何矩阵测试运行之前出错。
#[test]
fn failing_inline_test_errors_the_configuration() {
    let project = tempfile::tempdir().unwrap();
    copy_dir_all(&sample_project(), project.path()).unwrap();
    let lib = project.path().join("src/lib.rs");
    let mut source = fs::read_to_string(&lib).unwrap();
    source.push_str(
        "\n#[cfg(test)]\nmod broken {\n    #[test]\n    fn always_fails() {\n        panic!(\"broken inline test\");\n    }\n}\n",
    );
    fs::write(&lib, source).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    reach_matrix(dir.path())
        .args(["run", "--only", "o0-none-debug"])
        .arg("--project-dir")
        .arg(project.path())
        .arg("--json")
        .arg(&report)
        .assert()
        .failure()
        .stdout(predicate::str::contains("o0-none-debug errored"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["passed"], false);
    assert_eq!(json["verdicts"][0]["status"], "errored");
    assert!(
        json["verdicts"][0]["error"]
            .to_string()
            .contains("--lib")
    );
}
