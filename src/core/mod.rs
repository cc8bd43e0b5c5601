//! Core plumbing shared by every command
//!
//! - **config**: impact.toml parsing and validation
//! - **context**: Unified workspace context (lockfile, graph, ownership) built once per run
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Changed-file listings from system git

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
