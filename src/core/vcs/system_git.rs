//! System git backend - zero dependencies
//!
//! Uses plain git commands to list changed files. Paths come back relative to the
//! working tree root because every command runs with `-C <work tree>`.

use crate::core::error::{GitError, ImpactError, ImpactResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
#[derive(Debug, Clone)]
pub struct SystemGit {
  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open the git repository containing `path`
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ImpactResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ImpactError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(ImpactError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let work_tree = PathBuf::from(stdout.trim());

    Ok(Self { work_tree })
  }

  /// Working tree root
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Files changed between two refs (`git diff --name-only <base> <head>`)
  ///
  /// Renames are listed as a deletion plus an addition, so both the old and the new
  /// location show up.
  pub fn changed_files_between(&self, base: &str, head: &str) -> ImpactResult<Vec<String>> {
    self.list_files(&["diff", "--name-only", "--no-renames", "-z", base, head])
  }

  /// Tracked files with uncommitted changes, staged or not (`git diff --name-only HEAD`)
  pub fn uncommitted_files(&self) -> ImpactResult<Vec<String>> {
    self.list_files(&["diff", "--name-only", "--no-renames", "-z", "HEAD"])
  }

  /// Untracked files, honoring .gitignore
  pub fn untracked_files(&self) -> ImpactResult<Vec<String>> {
    self.list_files(&["ls-files", "-z", "--others", "--exclude-standard"])
  }

  /// Run a git command that prints NUL-terminated paths (`-z`, never C-quoted)
  fn list_files(&self, args: &[&str]) -> ImpactResult<Vec<String>> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to run git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ImpactError::Git(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: stderr.trim().to_string(),
      }));
    }

    let files = String::from_utf8_lossy(&output.stdout)
      .split('\0')
      .filter(|path| !path.is_empty())
      .map(str::to_string)
      .collect();

    Ok(files)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree root
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
