//! Unified workspace context - build once, pass everywhere
//!
//! Locating the repository, reading the config and lockfile, building the graph and
//! the ownership index all happen here, once, before any command runs. Commands take
//! `&WorkspaceContext` and never reload anything.

use crate::core::config::ImpactConfig;
use crate::core::error::{GitError, ImpactError, ImpactResult, ResultExt};
use crate::core::vcs::SystemGit;
use crate::graph::{DependencyGraph, OwnershipIndex};
use crate::lockfile::LockedWorkspace;
use crate::utils::clean_relative_path;
use std::path::{Path, PathBuf};

/// Everything a command needs to know about the workspace.
#[derive(Debug, Clone)]
pub struct WorkspaceContext {
  /// Repository root (absolute). Changed paths are relative to this.
  pub repo_root: PathBuf,

  /// uv workspace root (absolute); equal to or inside `repo_root`
  pub workspace_root: PathBuf,

  /// `workspace_root` relative to `repo_root`, `None` when they coincide
  pub prefix: Option<String>,

  pub config: ImpactConfig,

  /// Absolute lockfile path
  pub lockfile: PathBuf,

  pub graph: DependencyGraph,

  /// Member roots, repo-relative
  pub ownership: OwnershipIndex,

  /// Git repository, when there is one
  git: Option<SystemGit>,
}

impl WorkspaceContext {
  /// Locate the repository and workspace, then build the context.
  ///
  /// The repository root is git's top level for `workspace` (or `cwd`). Outside a git
  /// repository the starting directory stands in for it, which is enough for explicit
  /// file lists. The workspace root defaults to the repository root.
  pub fn discover(cwd: &Path, workspace: Option<&Path>) -> ImpactResult<Self> {
    let start = match workspace {
      Some(dir) => dir
        .canonicalize()
        .with_context(|| format!("Workspace directory not found: {}", dir.display()))?,
      None => cwd
        .canonicalize()
        .with_context(|| format!("Failed to resolve current directory {}", cwd.display()))?,
    };

    let git = match SystemGit::open(&start) {
      Ok(git) => Some(git),
      Err(e) => {
        tracing::debug!("Continuing without git: {}", e);
        None
      }
    };

    let repo_root = match &git {
      Some(git) => git
        .work_tree()
        .canonicalize()
        .with_context(|| format!("Failed to resolve repository root {}", git.work_tree().display()))?,
      None => start.clone(),
    };

    let workspace_root = if workspace.is_some() { start } else { repo_root.clone() };

    Self::build(repo_root, workspace_root, git)
  }

  /// Build the context from already-resolved locations.
  pub fn build(repo_root: PathBuf, workspace_root: PathBuf, git: Option<SystemGit>) -> ImpactResult<Self> {
    let relative = workspace_root.strip_prefix(&repo_root).map_err(|_| {
      ImpactError::with_help(
        format!(
          "Workspace {} is not inside repository {}",
          workspace_root.display(),
          repo_root.display()
        ),
        "Pass a --workspace directory inside the current repository",
      )
    })?;
    let prefix = clean_relative_path(&relative.to_string_lossy());

    let config = ImpactConfig::load(&workspace_root)?;
    let lockfile = workspace_root.join(&config.lockfile);

    let locked = LockedWorkspace::load(&lockfile)?;
    let graph = DependencyGraph::from_lock(&locked)?;

    if graph.member_count() == 0 {
      return Err(ImpactError::with_help(
        format!("No workspace members found in {}", lockfile.display()),
        "Check that the lockfile belongs to a uv workspace ([manifest] members or editable packages)",
      ));
    }

    let ownership = OwnershipIndex::for_graph(&graph, prefix.as_deref());

    tracing::info!(
      "Using uv workspace at {} ({} packages)",
      workspace_root.display(),
      graph.member_count()
    );

    Ok(Self {
      repo_root,
      workspace_root,
      prefix,
      config,
      lockfile,
      graph,
      ownership,
      git,
    })
  }

  /// Get the git repository or error if there is none.
  ///
  /// Use this in commands that list changes from version control.
  pub fn require_git(&self) -> ImpactResult<&SystemGit> {
    self.git.as_ref().ok_or_else(|| {
      ImpactError::Git(GitError::RepoNotFound {
        path: self.workspace_root.clone(),
      })
    })
  }

  /// Get workspace root as Path reference (convenience)
  pub fn workspace_root(&self) -> &Path {
    &self.workspace_root
  }
}
