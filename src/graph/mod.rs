//! Graph-aware impact analysis
//!
//! Built on the parsed lockfile + petgraph:
//! - **workspace_graph**: forward edges, derived reverse view, integrity and cycle checks
//! - **ownership**: changed path → owning package (longest root prefix)
//! - **affected**: closure over dependents, the impacted set

pub mod affected;
pub mod ownership;
pub mod workspace_graph;

pub use affected::{ImpactAnalysis, ImpactedSet, Seed, analyze, propagate};
pub use ownership::{AmbiguousOwnershipWarning, Owner, OwnershipIndex};
pub use workspace_graph::{DependencyGraph, PackageNode};
