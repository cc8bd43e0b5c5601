//! Integration tests for `uv-impact affected`

use crate::helpers::{TestWorkspace, diamond, git, run_uv_impact, run_uv_impact_raw, uv_lock};
use anyhow::Result;

const TARGETS: &str = "impacted_targets_json_tmp";

fn diamond_workspace() -> Result<TestWorkspace> {
  let ws = TestWorkspace::new()?;
  ws.add_members(&diamond())?;
  ws.commit("Add packages")?;
  Ok(ws)
}

#[test]
fn test_affected_explicit_files() -> Result<()> {
  let ws = diamond_workspace()?;

  run_uv_impact(&ws.path, &["affected", "--files", "packages/lib-a/src/lib_a/__init__.py"])?;

  assert_eq!(ws.read_targets(TARGETS)?, vec!["app", "lib-a"]);
  Ok(())
}

#[test]
fn test_affected_shared_dependency_impacts_everything() -> Result<()> {
  let ws = diamond_workspace()?;
  git(&ws.path, &["branch", "base"])?;

  ws.write_file("packages/common/src/common/__init__.py", "VALUE = 2\n")?;
  ws.commit("Change common")?;

  let output = run_uv_impact(&ws.path, &["affected", "--base", "base"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(ws.read_targets(TARGETS)?, vec!["app", "common", "lib-a", "lib-b"]);
  assert!(stdout.contains("Direct impact: 1 packages"), "got: {}", stdout);
  assert!(stdout.contains("Transitive dependents: 3 packages"), "got: {}", stdout);
  Ok(())
}

#[test]
fn test_affected_leaf_change_impacts_only_leaf() -> Result<()> {
  let ws = diamond_workspace()?;
  git(&ws.path, &["branch", "base"])?;

  ws.write_file("packages/app/src/app/main.py", "print('hi')\n")?;
  let head = ws.commit("Add app entry point")?;

  run_uv_impact(&ws.path, &["affected", "--base", "base", "--head", &head])?;

  assert_eq!(ws.read_targets(TARGETS)?, vec!["app"]);
  Ok(())
}

#[test]
fn test_affected_no_changes_writes_empty_array() -> Result<()> {
  let ws = diamond_workspace()?;

  let output = run_uv_impact(&ws.path, &["affected"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(ws.read_targets(TARGETS)?.is_empty());
  assert!(stdout.contains("No impacted targets found"), "got: {}", stdout);
  Ok(())
}

#[test]
fn test_affected_uncommitted_changes() -> Result<()> {
  let ws = diamond_workspace()?;

  ws.write_file("packages/lib-b/src/lib_b/__init__.py", "X = 1\n")?;
  run_uv_impact(&ws.path, &["affected", "-o", "out.json"])?;

  assert_eq!(ws.read_targets("out.json")?, vec!["app", "lib-b"]);
  Ok(())
}

#[test]
fn test_affected_untracked_files_only_with_flag() -> Result<()> {
  let ws = diamond_workspace()?;
  ws.write_file(".gitignore", "*.json\n")?;
  ws.commit("Ignore output files")?;
  ws.write_file("packages/lib-b/src/lib_b/new_module.py", "Y = 2\n")?;

  run_uv_impact(&ws.path, &["affected", "-o", "tracked.json"])?;
  assert!(ws.read_targets("tracked.json")?.is_empty());

  run_uv_impact(&ws.path, &["affected", "--untracked", "-o", "untracked.json"])?;
  assert_eq!(ws.read_targets("untracked.json")?, vec!["app", "lib-b"]);
  Ok(())
}

#[test]
fn test_affected_unowned_file_escalates() -> Result<()> {
  let ws = diamond_workspace()?;

  let output = run_uv_impact(&ws.path, &["affected", "--files", "README.md"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(ws.read_targets(TARGETS)?, vec!["app", "common", "lib-a", "lib-b"]);
  assert!(stdout.contains("Files outside every package: 1"), "got: {}", stdout);
  Ok(())
}

#[test]
fn test_affected_lockfile_change_escalates() -> Result<()> {
  let ws = diamond_workspace()?;
  git(&ws.path, &["branch", "base"])?;

  let mut members = diamond();
  members.push(("tools", "packages/tools", &[][..]));
  ws.add_members(&members)?;
  ws.commit("Add tools package")?;

  run_uv_impact(&ws.path, &["affected", "--base", "base"])?;

  assert_eq!(
    ws.read_targets(TARGETS)?,
    vec!["app", "common", "lib-a", "lib-b", "tools"]
  );
  Ok(())
}

#[test]
fn test_affected_ghost_dependency_fails_without_output() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.add_members(&[("app", "packages/app", &["ghost"][..])])?;
  ws.commit("Add app with undeclared dependency")?;

  let output = run_uv_impact_raw(&ws.path, &["affected", "--files", "packages/app/x.py"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr.contains("ghost"), "got: {}", stderr);
  assert!(!ws.file_exists(TARGETS));
  Ok(())
}

#[test]
fn test_affected_malformed_lockfile_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file("uv.lock", "version = 1\n[[package]]\nversion = \"1.0\"\n")?;

  let output = run_uv_impact_raw(&ws.path, &["affected", "--files", "a.py"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(3));
  assert!(stderr.contains("Malformed lockfile"), "got: {}", stderr);
  assert!(!ws.file_exists(TARGETS));
  Ok(())
}

#[test]
fn test_affected_missing_lockfile_fails() -> Result<()> {
  let ws = TestWorkspace::new()?;

  let output = run_uv_impact_raw(&ws.path, &["affected", "--files", "a.py"])?;

  assert!(!output.status.success());
  assert!(!ws.file_exists(TARGETS));
  Ok(())
}

#[test]
fn test_affected_json_format() -> Result<()> {
  let ws = diamond_workspace()?;

  let output = run_uv_impact(
    &ws.path,
    &[
      "affected",
      "--files",
      "packages/lib-a/src/lib_a/__init__.py,./packages/lib-a/pyproject.toml",
      "--format",
      "json",
    ],
  )?;

  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(json["impact"]["direct"], serde_json::json!(["lib-a"]));
  assert_eq!(json["impact"]["dependents"], serde_json::json!(["app"]));
  assert_eq!(json["summary"]["changed_files_count"], 2);
  assert_eq!(json["summary"]["escalated"], false);
  Ok(())
}

#[test]
fn test_affected_quiet_prints_nothing() -> Result<()> {
  let ws = diamond_workspace()?;

  let output = run_uv_impact(&ws.path, &["-q", "affected", "--files", "packages/common/pyproject.toml"])?;

  assert!(output.stdout.is_empty());
  assert_eq!(ws.read_targets(TARGETS)?.len(), 4);
  Ok(())
}

#[test]
fn test_affected_ignore_patterns_from_config() -> Result<()> {
  let ws = diamond_workspace()?;
  ws.write_file("impact.toml", "ignore = [\"**/*.md\", \"docs/**\"]\noutput = \"targets.json\"\n")?;

  run_uv_impact(
    &ws.path,
    &["affected", "--files", "docs/index.md,packages/common/README.md,packages/lib-b/x.py"],
  )?;

  assert_eq!(ws.read_targets("targets.json")?, vec!["app", "lib-b"]);
  Ok(())
}

#[test]
fn test_affected_nested_workspace() -> Result<()> {
  let ws = TestWorkspace::new()?;
  ws.write_file(
    "py/uv.lock",
    &uv_lock(&[
      ("api", "services/api", &["models"][..]),
      ("models", "libs/models", &[][..]),
    ]),
  )?;
  ws.commit("Add nested uv workspace")?;

  run_uv_impact(
    &ws.path,
    &["affected", "--workspace", "py", "--files", "py/libs/models/schema.py"],
  )?;
  assert_eq!(ws.read_targets(TARGETS)?, vec!["api", "models"]);

  run_uv_impact(
    &ws.path,
    &["affected", "--workspace", "py", "--files", "py/services/api/main.py", "-o", "api.json"],
  )?;
  assert_eq!(ws.read_targets("api.json")?, vec!["api"]);
  Ok(())
}

#[test]
fn test_affected_unknown_format_fails() -> Result<()> {
  let ws = diamond_workspace()?;

  let output = run_uv_impact_raw(&ws.path, &["affected", "--files", "a.py", "--format", "yaml"])?;

  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_affected_moved_file_impacts_both_packages() -> Result<()> {
  let ws = diamond_workspace()?;
  ws.write_file("packages/lib-a/src/lib_a/moved.py", "def helper():\n    return 1\n")?;
  ws.commit("Add helper to lib-a")?;
  git(&ws.path, &["branch", "base"])?;

  git(
    &ws.path,
    &["mv", "packages/lib-a/src/lib_a/moved.py", "packages/app/src/app/moved.py"],
  )?;
  ws.commit("Move helper into app")?;

  run_uv_impact(&ws.path, &["affected", "--base", "base"])?;

  assert_eq!(ws.read_targets(TARGETS)?, vec!["app", "lib-a"]);
  Ok(())
}

#[test]
fn test_affected_base_with_uncommitted_changes() -> Result<()> {
  let ws = diamond_workspace()?;
  git(&ws.path, &["branch", "base"])?;

  ws.write_file("packages/app/src/app/main.py", "print('hi')\n")?;
  ws.commit("Add app entry point")?;
  ws.write_file("packages/common/src/common/__init__.py", "VALUE = 3\n")?;

  run_uv_impact(&ws.path, &["affected", "--base", "base", "-o", "range.json"])?;
  assert_eq!(ws.read_targets("range.json")?, vec!["app"]);

  run_uv_impact(
    &ws.path,
    &["affected", "--base", "base", "--uncommitted", "-o", "both.json"],
  )?;
  assert_eq!(ws.read_targets("both.json")?, vec!["app", "common", "lib-a", "lib-b"]);
  Ok(())
}

#[test]
fn test_affected_root_only_ignore_pattern_keeps_package_files() -> Result<()> {
  let ws = diamond_workspace()?;
  ws.write_file("impact.toml", "ignore = [\"*.md\"]\n")?;

  run_uv_impact(&ws.path, &["affected", "--files", "CHANGELOG.md", "-o", "root.json"])?;
  assert!(ws.read_targets("root.json")?.is_empty());

  run_uv_impact(
    &ws.path,
    &["affected", "--files", "packages/common/docs/api.md", "-o", "nested.json"],
  )?;
  assert_eq!(ws.read_targets("nested.json")?, vec!["app", "common", "lib-a", "lib-b"]);
  Ok(())
}

#[test]
fn test_affected_previous_output_is_not_a_change() -> Result<()> {
  let ws = diamond_workspace()?;
  ws.write_file("packages/lib-b/src/lib_b/extra.py", "Z = 3\n")?;

  run_uv_impact(&ws.path, &["affected", "--untracked"])?;
  assert_eq!(ws.read_targets(TARGETS)?, vec!["app", "lib-b"]);

  // The first run left an untracked output file at the repository root.
  run_uv_impact(&ws.path, &["affected", "--untracked"])?;
  assert_eq!(ws.read_targets(TARGETS)?, vec!["app", "lib-b"]);
  Ok(())
}
