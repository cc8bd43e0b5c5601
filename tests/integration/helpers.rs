//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A workspace member: name, root relative to the workspace, workspace dependencies
pub type Member<'a> = (&'a str, &'a str, &'a [&'a str]);

/// A test uv workspace with git history
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create a new git repository with a root pyproject.toml
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().canonicalize()?;

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(
      path.join("pyproject.toml"),
      r#"[project]
name = "monorepo"
version = "0.0.0"

[tool.uv.workspace]
members = ["packages/*"]
"#,
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial workspace setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Add member sources and write a matching uv.lock
  ///
  /// Every member gets `<root>/pyproject.toml` and `<root>/src/<name>/__init__.py`.
  /// `requests` is always locked as an external package that each member depends on.
  pub fn add_members(&self, members: &[Member<'_>]) -> Result<()> {
    for (name, root, _) in members {
      let module = name.replace('-', "_");
      let dir = self.path.join(root);
      std::fs::create_dir_all(dir.join("src").join(&module))?;
      std::fs::write(
        dir.join("pyproject.toml"),
        format!("[project]\nname = \"{}\"\nversion = \"0.1.0\"\n", name),
      )?;
      std::fs::write(dir.join("src").join(&module).join("__init__.py"), "")?;
    }

    self.write_lock(members)
  }

  /// Write uv.lock for the given members (plus the `requests` external)
  pub fn write_lock(&self, members: &[Member<'_>]) -> Result<()> {
    std::fs::write(self.path.join("uv.lock"), uv_lock(members))?;
    Ok(())
  }

  /// Write a file relative to the repository root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(path);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Commit current changes
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Read the impacted targets file written by `affected`
  pub fn read_targets(&self, path: &str) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(self.path.join(path)).with_context(|| format!("{} not written", path))?;
    Ok(serde_json::from_str(&content)?)
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }
}

/// Render a uv.lock with editable members and one registry package
pub fn uv_lock(members: &[Member<'_>]) -> String {
  let names: Vec<String> = members.iter().map(|(name, _, _)| format!("\"{}\"", name)).collect();
  let mut lock = format!(
    "version = 1\nrequires-python = \">=3.12\"\n\n[manifest]\nmembers = [{}]\n",
    names.join(", ")
  );

  for (name, root, deps) in members {
    lock.push_str(&format!(
      "\n[[package]]\nname = \"{}\"\nversion = \"0.1.0\"\nsource = {{ editable = \"{}\" }}\ndependencies = [\n",
      name, root
    ));
    for dep in deps.iter().copied().chain(std::iter::once("requests")) {
      lock.push_str(&format!("    {{ name = \"{}\" }},\n", dep));
    }
    lock.push_str("]\n");
  }

  lock.push_str(
    "\n[[package]]\nname = \"requests\"\nversion = \"2.32.3\"\nsource = { registry = \"https://pypi.org/simple\" }\n",
  );
  lock
}

/// The four-package diamond: common <- lib-a, lib-b <- app
pub fn diamond() -> Vec<Member<'static>> {
  vec![
    ("app", "packages/app", &["lib-a", "lib-b"][..]),
    ("common", "packages/common", &[][..]),
    ("lib-a", "packages/lib-a", &["common"][..]),
    ("lib-b", "packages/lib-b", &["common"][..]),
  ]
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the uv-impact binary, whatever its exit status
pub fn run_uv_impact_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  Command::new(env!("CARGO_BIN_EXE_uv-impact"))
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run uv-impact")
}

/// Run the uv-impact binary and require success
pub fn run_uv_impact(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_uv_impact_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "uv-impact command failed: uv-impact {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
