//! CLI commands for uv-impact
//!
//! - **affected**: Find packages impacted by changes and write them for CI
//! - **packages**: List workspace members with roots and workspace edges
//! - **check**: Validate the lockfile graph, report cycles and overlapping roots
//!
//! All commands accept `&WorkspaceContext` to avoid redundant workspace loads.

pub mod affected;
pub mod check;
pub mod packages;

pub use affected::{ChangeSource, run_affected};
pub use check::run_check;
pub use packages::run_packages;
