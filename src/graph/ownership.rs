//! Path ownership: which package does a changed file belong to?
//!
//! Longest-prefix match over package roots, on whole path segments. Roots are kept in
//! an explicitly sorted list (longest first), so the answer never depends on hash map
//! iteration order.

use super::workspace_graph::DependencyGraph;
use crate::utils::{clean_relative_path, join_relative, path_has_root};
use std::cmp::Reverse;
use std::fmt;

/// Result of resolving a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner<'a> {
  /// The path lies inside this package's root
  Package(&'a str),
  /// The path lies outside every package root (workspace config, tooling, docs, ...)
  Unowned,
}

/// Non-fatal inconsistency between package roots.
///
/// Ownership still resolves: the most specific root wins, and between identical roots
/// the alphabetically first package wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbiguousOwnershipWarning {
  /// Several packages declare the same root
  SharedRoot { root: String, packages: Vec<String> },
  /// One package root lies inside another
  NestedRoot {
    outer_package: String,
    outer_root: String,
    inner_package: String,
    inner_root: String,
  },
}

impl fmt::Display for AmbiguousOwnershipWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AmbiguousOwnershipWarning::SharedRoot { root, packages } => write!(
        f,
        "Packages {} share the root '{}'; files there are attributed to '{}'",
        packages.join(", "),
        root,
        packages[0]
      ),
      AmbiguousOwnershipWarning::NestedRoot {
        outer_package,
        outer_root,
        inner_package,
        inner_root,
      } => write!(
        f,
        "Root '{}' of '{}' is nested inside root '{}' of '{}'; files under it are attributed to '{}'",
        inner_root, inner_package, outer_root, outer_package, inner_package
      ),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OwnedRoot {
  root: String,
  package: String,
}

/// Sorted package roots for longest-prefix ownership lookups.
#[derive(Debug, Clone, Default)]
pub struct OwnershipIndex {
  /// Sorted by (root length descending, root, package)
  roots: Vec<OwnedRoot>,
  warnings: Vec<AmbiguousOwnershipWarning>,
}

impl OwnershipIndex {
  /// Build an index from `(package, root)` pairs.
  ///
  /// Roots are cleaned (`./`, trailing `/`, `\`). Roots that clean to nothing, i.e. the
  /// repository root, own no files and are skipped.
  pub fn new<N, R>(roots: impl IntoIterator<Item = (N, R)>) -> Self
  where
    N: Into<String>,
    R: AsRef<str>,
  {
    let mut entries: Vec<OwnedRoot> = roots
      .into_iter()
      .filter_map(|(package, root)| {
        clean_relative_path(root.as_ref()).map(|root| OwnedRoot {
          root,
          package: package.into(),
        })
      })
      .collect();

    entries.sort_by(|a, b| {
      (Reverse(a.root.len()), &a.root, &a.package).cmp(&(Reverse(b.root.len()), &b.root, &b.package))
    });
    entries.dedup();

    let warnings = find_ambiguities(&entries);
    for warning in &warnings {
      tracing::warn!("{}", warning);
    }

    Self {
      roots: entries,
      warnings,
    }
  }

  /// Build the index for every workspace member of `graph`.
  ///
  /// `prefix` is the workspace root's location inside the repository (`None` when the
  /// workspace is the repository root); member roots are joined onto it so that
  /// repo-relative changed paths match. Members rooted at the workspace root own
  /// nothing directly. Roots that climb out of the repository are skipped.
  pub fn for_graph(graph: &DependencyGraph, prefix: Option<&str>) -> Self {
    let roots = graph.member_nodes().filter_map(|node| {
      let root = node.root.as_deref()?;
      match join_relative(prefix, root) {
        Some(joined) => Some((node.name.clone(), joined)),
        None => {
          tracing::warn!(
            "Root '{}' of '{}' is outside the repository; it cannot own changed files",
            root,
            node.name
          );
          None
        }
      }
    });

    Self::new(roots)
  }

  /// Resolve the owner of a repo-relative, `/`-separated path.
  pub fn owner(&self, path: &str) -> Owner<'_> {
    self
      .roots
      .iter()
      .find(|entry| path_has_root(path, &entry.root))
      .map(|entry| Owner::Package(entry.package.as_str()))
      .unwrap_or(Owner::Unowned)
  }

  /// `(package, root)` pairs in lookup order.
  pub fn roots(&self) -> impl Iterator<Item = (&str, &str)> {
    self.roots.iter().map(|e| (e.package.as_str(), e.root.as_str()))
  }

  /// Root of a package, if it owns one.
  pub fn root_of(&self, package: &str) -> Option<&str> {
    self
      .roots
      .iter()
      .find(|e| e.package == package)
      .map(|e| e.root.as_str())
  }

  pub fn warnings(&self) -> &[AmbiguousOwnershipWarning] {
    &self.warnings
  }

  pub fn is_empty(&self) -> bool {
    self.roots.is_empty()
  }
}

fn find_ambiguities(entries: &[OwnedRoot]) -> Vec<AmbiguousOwnershipWarning> {
  let mut warnings = Vec::new();

  // Identical roots are adjacent after sorting.
  let mut i = 0;
  while i < entries.len() {
    let mut j = i + 1;
    while j < entries.len() && entries[j].root == entries[i].root {
      j += 1;
    }
    if j - i > 1 {
      warnings.push(AmbiguousOwnershipWarning::SharedRoot {
        root: entries[i].root.clone(),
        packages: entries[i..j].iter().map(|e| e.package.clone()).collect(),
      });
    }
    i = j;
  }

  for inner in entries {
    for outer in entries {
      if outer.root.len() < inner.root.len() && path_has_root(&inner.root, &outer.root) {
        warnings.push(AmbiguousOwnershipWarning::NestedRoot {
          outer_package: outer.package.clone(),
          outer_root: outer.root.clone(),
          inner_package: inner.package.clone(),
          inner_root: inner.root.clone(),
        });
      }
    }
  }

  warnings
}
