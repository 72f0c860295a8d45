#![allow(non_snake_case)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

const OBJECT_DIR: &str = "CMakeFiles/gitter_lib.dir/src";

/// Stand-in for gcov keyed on the artifact name.
#[cfg(unix)]
const FAKE_GCOV: &str = r#"#!/bin/sh
name=$(basename "$3" .gcda)
case "$name" in
  Broken*) echo "gcov: cannot open $3" >&2; exit 3 ;;
  Silent*) echo "No executable lines" ;;
  Branchless*) echo "File '/repo/src/core/$name' Lines executed:100.00% of 4" ;;
  *) echo "File '/repo/src/core/$name' Lines executed:87.50% of 40 Branches executed:72.00% of 10" ;;
esac
"#;

struct BuildTree {
    dir: TempDir,
    gcov: PathBuf,
}

impl BuildTree {
    fn new() -> Self {
        let dir = tempdir().expect("tempdir");
        let gcov = dir.path().join("fake-gcov");
        write_script(&gcov);
        Self { dir, gcov }
    }

    fn build_dir(&self) -> PathBuf {
        self.dir.path().join("build")
    }

    fn artifact(&self, group: &str, name: &str) {
        let path = self.build_dir().join(OBJECT_DIR).join(group).join(name);
        fs::create_dir_all(path.parent().unwrap()).expect("create object dir");
        fs::write(path, b"").expect("write artifact");
    }

    fn run(&self, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_coverage_report"))
            .arg(self.build_dir())
            .arg("--gcov")
            .arg(&self.gcov)
            .args(extra)
            .env_remove("RUST_LOG")
            .output()
            .expect("run coverage_report")
    }
}

#[cfg(unix)]
fn write_script(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    fs::write(path, FAKE_GCOV).expect("write fake gcov");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod fake gcov");
}

#[cfg(not(unix))]
fn write_script(_path: &Path) {}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn coverage_report_binary__missing_build_dir__then_exits_one_with_hint() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("build/linux-coverage");

    let output = Command::new(env!("CARGO_BIN_EXE_coverage_report"))
        .arg(&missing)
        .output()
        .expect("run coverage_report");

    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.contains(&format!(
        "Error: Build directory '{}' not found",
        missing.display()
    )));
    assert!(text.contains("Run: cmake --preset linux-coverage"));
}

#[test]
fn coverage_report_binary__no_artifacts__then_exits_one() {
    let tree = BuildTree::new();
    fs::create_dir_all(tree.build_dir()).expect("create build dir");

    let output = tree.run(&[]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "No coverage data found. Make sure tests have been run.\n"
    );
}

#[test]
fn coverage_report_binary__build_dir_inside_googletest__then_everything_excluded() {
    let dir = tempdir().expect("tempdir");
    let build = dir.path().join("googletest-build");
    let objects = build.join(OBJECT_DIR).join("core");
    fs::create_dir_all(&objects).expect("create object dir");
    fs::write(objects.join("Index.cpp.gcda"), b"").expect("write artifact");

    let output = Command::new(env!("CARGO_BIN_EXE_coverage_report"))
        .arg(&build)
        .output()
        .expect("run coverage_report");

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("No coverage data found."));
}

#[cfg(unix)]
#[test]
fn coverage_report_binary__mixed_artifacts__then_prints_summary() {
    let tree = BuildTree::new();
    tree.artifact("core", "Index.cpp.gcda");
    tree.artifact("util", "Branchless.cpp.gcda");
    tree.artifact("cli", "Broken.cpp.gcda");
    tree.artifact("cli/commands", "Silent.cpp.gcda");

    let output = tree.run(&[]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        stdout(&output),
        "\
=== Gitter Code Coverage Summary ===

Branchless.cpp
  Lines: 100.00%

Index.cpp
  Lines: 87.50%
  Branches: 72.00%

=== Overall Statistics ===
Files tested: 2
Average line coverage: 93.75%
Average branch coverage: 36.00%
"
    );
    assert!(output.stderr.is_empty());
}

#[cfg(unix)]
#[test]
fn coverage_report_binary__no_artifact_parsed__then_exits_zero_without_statistics() {
    let tree = BuildTree::new();
    tree.artifact("core", "Broken.cpp.gcda");
    tree.artifact("core", "Silent.cpp.gcda");

    let output = tree.run(&[]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "=== Gitter Code Coverage Summary ===\n\n");
}

#[test]
fn coverage_report_binary__gcov_missing__then_exits_zero_without_statistics() {
    let tree = BuildTree::new();
    tree.artifact("core", "Index.cpp.gcda");

    let output = Command::new(env!("CARGO_BIN_EXE_coverage_report"))
        .arg(tree.build_dir())
        .arg("--gcov")
        .arg(tree.dir.path().join("no-such-gcov"))
        .output()
        .expect("run coverage_report");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "=== Gitter Code Coverage Summary ===\n\n");
}

#[cfg(unix)]
#[test]
fn coverage_report_binary__no_branch_figures__then_branch_average_is_zero() {
    let tree = BuildTree::new();
    tree.artifact("core", "BranchlessIndex.cpp.gcda");
    tree.artifact("util", "BranchlessLogger.cpp.gcda");

    let output = tree.run(&[]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "\
=== Gitter Code Coverage Summary ===

BranchlessIndex.cpp
  Lines: 100.00%

BranchlessLogger.cpp
  Lines: 100.00%

=== Overall Statistics ===
Files tested: 2
Average line coverage: 100.00%
Average branch coverage: 0.00%
"
    );

    let output = tree.run(&["--format", "json"]);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let branch_average = value["statistics"]["average_branch_coverage"]
        .as_f64()
        .expect("numeric average");
    assert!(branch_average == 0.0 && branch_average.is_sign_positive());
}

#[cfg(unix)]
#[test]
fn coverage_report_binary__json_format__then_emits_report_object() {
    let tree = BuildTree::new();
    tree.artifact("core", "Index.cpp.gcda");
    tree.artifact("core", "Branchless.cpp.gcda");

    let output = tree.run(&["--format", "json", "--project", "Demo"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value["project"], "Demo");
    assert_eq!(value["entries"][0]["file"], "Branchless.cpp");
    assert!(value["entries"][0]["branches"].is_null());
    assert_eq!(value["entries"][1]["lines"], 87.5);
    assert_eq!(value["statistics"]["files_tested"], 2);
    assert_eq!(value["statistics"]["average_line_coverage"], 93.75);
}
