//! Impact detection for uv workspaces
//!
//! Given a `uv.lock` and a list of changed files, work out which workspace packages
//! must be rebuilt and retested:
//!
//! ```text
//! uv.lock ──► lockfile::parse_uv_lock ──► graph::DependencyGraph ──► graph::OwnershipIndex
//!                                                   │                         │
//! changed files ──► changes::ChangeSet ─────────────┴──► graph::analyze ◄─────┘
//!                                                              │
//!                                                              ▼
//!                                                   ImpactedSet (sorted names)
//! ```
//!
//! Everything from parsing to the impacted set is pure and in-memory. Git, config and
//! output files live at the edges (`core::vcs`, `core::config`, the binary).

pub mod changes;
pub mod core;
pub mod graph;
pub mod lockfile;
pub mod utils;
