//! Lockfile model
//!
//! The lockfile is the only source of truth for the workspace graph: which packages
//! are members, where each member lives, and what every package depends on. Parsing
//! is a pure text → data transformation; `LockedWorkspace::load` is the one place that
//! touches the filesystem.

pub mod uv;

use crate::core::error::{ConfigError, ImpactError, ImpactResult, ResultExt};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub use uv::parse_uv_lock;

/// Whether a package is built from this workspace or pulled from elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageKind {
  /// Workspace member (editable or virtual source inside the workspace)
  Member,
  /// Registry, git, url or path package recorded by the resolver
  External,
}

/// One resolved package from the lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedPackage {
  pub name: String,
  pub version: Option<String>,
  pub kind: PackageKind,
  /// Source directory relative to the workspace root, `/`-separated.
  ///
  /// `None` for external packages and for a member rooted at the workspace root
  /// itself, which owns no files directly.
  pub root: Option<String>,
  /// Direct dependencies (regular, optional and dev groups).
  pub dependencies: BTreeSet<String>,
}

impl LockedPackage {
  pub fn is_member(&self) -> bool {
    self.kind == PackageKind::Member
  }
}

/// All packages recorded by a lockfile, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedWorkspace {
  pub packages: Vec<LockedPackage>,
}

impl LockedWorkspace {
  /// Read and parse a `uv.lock` file.
  pub fn load(lockfile: &Path) -> ImpactResult<Self> {
    if !lockfile.is_file() {
      return Err(ImpactError::Config(ConfigError::LockfileNotFound {
        path: lockfile.to_path_buf(),
      }));
    }

    let content =
      fs::read_to_string(lockfile).with_context(|| format!("Failed to read lockfile {}", lockfile.display()))?;

    Ok(parse_uv_lock(&content)?)
  }

  /// Workspace members only.
  pub fn members(&self) -> impl Iterator<Item = &LockedPackage> {
    self.packages.iter().filter(|p| p.is_member())
  }

  pub fn get(&self, name: &str) -> Option<&LockedPackage> {
    self
      .packages
      .binary_search_by(|p| p.name.as_str().cmp(name))
      .ok()
      .map(|idx| &self.packages[idx])
  }
}
