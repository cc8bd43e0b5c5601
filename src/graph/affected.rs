//! Impacted package analysis
//!
//! Given a set of changed files, determine:
//! - Which packages directly contain those files (the seed)
//! - Which packages transitively depend on the seed
//! - Whether any file escapes every package, which impacts the whole workspace
//!
//! Algorithm:
//! 1. Map files → owning packages (longest root prefix)
//! 2. Any unowned file → seed is every member, no traversal
//! 3. Otherwise BFS over reverse edges from every seed package, guarded by a
//!    visited bit set indexed by node, so cycles terminate
//! 4. Collect into a sorted set

use super::ownership::{Owner, OwnershipIndex};
use super::workspace_graph::DependencyGraph;
use crate::changes::ChangeSet;
use crate::core::error::{ImpactError, ImpactResult};
use petgraph::Direction;
use petgraph::visit::{VisitMap, Visitable};
use std::collections::{BTreeSet, VecDeque};

/// Starting point of propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
  /// A workspace-wide change: every member is impacted
  All,
  /// Packages that directly own changed files
  Packages(BTreeSet<String>),
}

impl Seed {
  pub fn packages<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
    Seed::Packages(names.into_iter().map(Into::into).collect())
  }
}

/// Impacted package names. Sorted and free of duplicates by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactedSet(BTreeSet<String>);

impl ImpactedSet {
  pub fn contains(&self, name: &str) -> bool {
    self.0.contains(name)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  pub fn is_subset(&self, other: &ImpactedSet) -> bool {
    self.0.is_subset(&other.0)
  }

  /// Names in ascending order.
  pub fn to_sorted_vec(&self) -> Vec<String> {
    self.0.iter().cloned().collect()
  }

  pub fn into_sorted_vec(self) -> Vec<String> {
    self.0.into_iter().collect()
  }
}

impl FromIterator<String> for ImpactedSet {
  fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
    ImpactedSet(iter.into_iter().collect())
  }
}

/// Compute every workspace member that depends, directly or transitively, on a seed
/// package, plus the seed packages themselves.
///
/// Only workspace members are entered; external packages never propagate impact.
/// Seeding a name that is not a workspace member is an error.
pub fn propagate(seed: &Seed, graph: &DependencyGraph) -> ImpactResult<ImpactedSet> {
  let names = match seed {
    Seed::All => return Ok(graph.members().into_iter().collect()),
    Seed::Packages(names) => names,
  };

  let inner = graph.inner();
  let mut visited = inner.visit_map();
  let mut queue = VecDeque::with_capacity(names.len());
  let mut impacted = BTreeSet::new();

  for name in names {
    let idx = graph
      .node_index(name)
      .filter(|_| graph.is_member(name))
      .ok_or_else(|| {
        ImpactError::with_help(
          format!("Cannot propagate from '{}': not a workspace member", name),
          format!("Workspace members: {}", graph.members().join(", ")),
        )
      })?;

    if visited.visit(idx) {
      impacted.insert(name.clone());
      queue.push_back(idx);
    }
  }

  while let Some(idx) = queue.pop_front() {
    for dependent in inner.neighbors_directed(idx, Direction::Incoming) {
      let node = &inner[dependent];
      if node.is_member() && visited.visit(dependent) {
        tracing::trace!("{} impacted via {}", node.name, inner[idx].name);
        impacted.insert(node.name.clone());
        queue.push_back(dependent);
      }
    }
  }

  Ok(ImpactedSet(impacted))
}

/// Split changed files into the packages that own them and the files nobody owns.
pub fn seed_from_changes(ownership: &OwnershipIndex, changes: &ChangeSet) -> (BTreeSet<String>, Vec<String>) {
  let mut direct = BTreeSet::new();
  let mut unowned = Vec::new();

  for file in changes.files() {
    match ownership.owner(file) {
      Owner::Package(name) => {
        direct.insert(name.to_string());
      }
      Owner::Unowned => unowned.push(file.to_string()),
    }
  }

  (direct, unowned)
}

/// Complete impact analysis for one change set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactAnalysis {
  /// Files considered, sorted
  pub changed_files: Vec<String>,

  /// Packages directly containing changed files
  pub direct: BTreeSet<String>,

  /// Files outside every package root; any entry impacts the whole workspace
  pub unowned_files: Vec<String>,

  /// Final impacted set
  pub impacted: ImpactedSet,
}

impl ImpactAnalysis {
  /// Whether an unowned file escalated the result to every member.
  pub fn escalated(&self) -> bool {
    !self.unowned_files.is_empty()
  }

  /// Impacted packages that were not directly changed, sorted.
  pub fn dependents(&self) -> Vec<String> {
    self
      .impacted
      .iter()
      .filter(|name| !self.direct.contains(*name))
      .map(str::to_string)
      .collect()
  }
}

/// Analyze which packages are impacted by `changes`.
pub fn analyze(graph: &DependencyGraph, ownership: &OwnershipIndex, changes: &ChangeSet) -> ImpactResult<ImpactAnalysis> {
  if changes.is_empty() {
    return Ok(ImpactAnalysis::default());
  }

  let (direct, unowned_files) = seed_from_changes(ownership, changes);

  let seed = if let Some(first) = unowned_files.first() {
    tracing::info!(
      "{} changed file(s) outside every package root (first: {}); impacting all {} packages",
      unowned_files.len(),
      first,
      graph.member_count()
    );
    Seed::All
  } else {
    Seed::Packages(direct.clone())
  };

  let impacted = propagate(&seed, graph)?;
  tracing::debug!(direct = direct.len(), impacted = impacted.len(), "Propagated impact");

  Ok(ImpactAnalysis {
    changed_files: changes.files().map(str::to_string).collect(),
    direct,
    unowned_files,
    impacted,
  })
}
