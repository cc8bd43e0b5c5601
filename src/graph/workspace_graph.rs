//! Workspace dependency graph built from the lockfile + petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: Packages (workspace members + external packages)
//! - **Reverse view**: incoming edges. There is no second adjacency structure to keep
//!   in sync: dependents are read off the same graph the forward edges live in.
//! - **Index**: name → node index
//!
//! The graph is built once per run and never mutated afterwards.

use crate::core::error::{GraphIntegrityError, ImpactError, ImpactResult};
use crate::lockfile::{LockedPackage, LockedWorkspace, PackageKind};
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A package node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
  pub name: String,
  pub version: Option<String>,
  pub kind: PackageKind,
  /// Root relative to the workspace root (`None` for externals and the workspace root)
  pub root: Option<String>,
}

impl PackageNode {
  pub fn is_member(&self) -> bool {
    self.kind == PackageKind::Member
  }
}

/// Workspace dependency graph.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
  graph: DiGraph<PackageNode, ()>,
  name_to_node: HashMap<String, NodeIndex>,
  /// Workspace members, sorted
  members: BTreeSet<String>,
}

impl DependencyGraph {
  /// Build the graph from a parsed lockfile.
  pub fn from_lock(workspace: &LockedWorkspace) -> Result<Self, GraphIntegrityError> {
    Self::build(&workspace.packages)
  }

  /// Build the graph from a package list.
  ///
  /// Every dependency must name a package in `packages` (member or external);
  /// anything else is a `GraphIntegrityError`. Packages are processed in name order
  /// so the reported error is the same on every run.
  pub fn build<'a>(packages: impl IntoIterator<Item = &'a LockedPackage>) -> Result<Self, GraphIntegrityError> {
    let mut sorted: Vec<&LockedPackage> = packages.into_iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut graph = DiGraph::with_capacity(sorted.len(), 0);
    let mut name_to_node = HashMap::with_capacity(sorted.len());
    let mut members = BTreeSet::new();

    for package in &sorted {
      if name_to_node.contains_key(&package.name) {
        return Err(GraphIntegrityError::DuplicatePackage {
          name: package.name.clone(),
        });
      }

      let idx = graph.add_node(PackageNode {
        name: package.name.clone(),
        version: package.version.clone(),
        kind: package.kind,
        root: package.root.clone(),
      });
      name_to_node.insert(package.name.clone(), idx);

      if package.is_member() {
        members.insert(package.name.clone());
      }
    }

    for package in &sorted {
      let from_idx = name_to_node[&package.name];

      for dep in &package.dependencies {
        let to_idx = name_to_node
          .get(dep)
          .copied()
          .ok_or_else(|| GraphIntegrityError::UndeclaredDependency {
            package: package.name.clone(),
            dependency: dep.clone(),
          })?;
        graph.update_edge(from_idx, to_idx, ());
      }
    }

    let built = Self {
      graph,
      name_to_node,
      members,
    };

    for cycle in built.find_cycles() {
      tracing::warn!(
        "Dependency cycle between workspace packages: {} (members are impacted together)",
        cycle.join(" → ")
      );
    }

    tracing::debug!(
      packages = built.graph.node_count(),
      members = built.members.len(),
      edges = built.graph.edge_count(),
      "Built dependency graph"
    );

    Ok(built)
  }

  /// Get all workspace member names, sorted.
  pub fn members(&self) -> Vec<String> {
    self.members.iter().cloned().collect()
  }

  pub fn member_count(&self) -> usize {
    self.members.len()
  }

  pub fn is_member(&self, name: &str) -> bool {
    self.members.contains(name)
  }

  /// Number of external packages recorded by the lockfile.
  pub fn external_count(&self) -> usize {
    self.graph.node_count() - self.members.len()
  }

  pub fn edge_count(&self) -> usize {
    self.graph.edge_count()
  }

  /// Look up a package node by name.
  pub fn package(&self, name: &str) -> Option<&PackageNode> {
    self.name_to_node.get(name).map(|idx| &self.graph[*idx])
  }

  /// Member nodes in name order.
  pub fn member_nodes(&self) -> impl Iterator<Item = &PackageNode> {
    self.members.iter().map(|name| &self.graph[self.name_to_node[name]])
  }

  /// Get direct dependencies of a package (members and externals).
  pub fn direct_dependencies(&self, name: &str) -> ImpactResult<Vec<String>> {
    let node_idx = self.find_node(name)?;
    Ok(self.neighbor_names(node_idx, Direction::Outgoing, false))
  }

  /// Get direct dependents of a package (workspace members only).
  pub fn direct_dependents(&self, name: &str) -> ImpactResult<Vec<String>> {
    let node_idx = self.find_node(name)?;
    Ok(self.neighbor_names(node_idx, Direction::Incoming, true))
  }

  /// Forward view: package → dependencies, for every package.
  pub fn forward_map(&self) -> BTreeMap<String, BTreeSet<String>> {
    self.adjacency(Direction::Outgoing)
  }

  /// Reverse view: package → dependents, for every package.
  ///
  /// Always the exact inverse of `forward_map`, since both read the same edges.
  pub fn reverse_map(&self) -> BTreeMap<String, BTreeSet<String>> {
    self.adjacency(Direction::Incoming)
  }

  /// Detect dependency cycles among workspace members using Tarjan's SCC algorithm.
  ///
  /// Returns each cycle's members sorted by name, cycles sorted by their first member.
  /// A package that depends on itself is a cycle of one.
  pub fn find_cycles(&self) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| {
        component.len() > 1 || self.graph.find_edge(component[0], component[0]).is_some()
      })
      .map(|component| {
        let mut names: Vec<String> = component
          .into_iter()
          .map(|idx| &self.graph[idx])
          .filter(|node| node.is_member())
          .map(|node| node.name.clone())
          .collect();
        names.sort();
        names
      })
      .filter(|cycle| !cycle.is_empty())
      .collect();

    cycles.sort();
    cycles
  }

  pub(crate) fn inner(&self) -> &DiGraph<PackageNode, ()> {
    &self.graph
  }

  pub(crate) fn node_index(&self, name: &str) -> Option<NodeIndex> {
    self.name_to_node.get(name).copied()
  }

  /// Find node index by package name.
  fn find_node(&self, name: &str) -> ImpactResult<NodeIndex> {
    self.node_index(name).ok_or_else(|| {
      ImpactError::with_help(
        format!("Package '{}' not found in the lockfile", name),
        format!("Workspace members: {}", self.members().join(", ")),
      )
    })
  }

  fn neighbor_names(&self, node_idx: NodeIndex, direction: Direction, members_only: bool) -> Vec<String> {
    let mut names: Vec<String> = self
      .graph
      .neighbors_directed(node_idx, direction)
      .map(|idx| &self.graph[idx])
      .filter(|node| !members_only || node.is_member())
      .map(|node| node.name.clone())
      .collect();
    names.sort();
    names.dedup();
    names
  }

  fn adjacency(&self, direction: Direction) -> BTreeMap<String, BTreeSet<String>> {
    self
      .graph
      .node_indices()
      .map(|idx| {
        let neighbors = self
          .graph
          .neighbors_directed(idx, direction)
          .map(|n| self.graph[n].name.clone())
          .collect();
        (self.graph[idx].name.clone(), neighbors)
      })
      .collect()
  }
}
