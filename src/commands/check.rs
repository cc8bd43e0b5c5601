//! `uv-impact check` - Validate the lockfile graph and report diagnostics
//!
//! Parse and integrity errors already fail while the workspace context is built, so
//! by the time this runs the graph is sound. What is left to report are the
//! non-fatal findings: dependency cycles and overlapping package roots.

use uv_impact::core::context::WorkspaceContext;
use uv_impact::core::error::{ImpactError, ImpactResult};

/// Run the check command
pub fn run_check(ctx: &WorkspaceContext, json: bool, strict: bool) -> ImpactResult<()> {
  let cycles = ctx.graph.find_cycles();
  let ownership_warnings: Vec<String> = ctx.ownership.warnings().iter().map(|w| w.to_string()).collect();

  if json {
    let output = serde_json::json!({
        "lockfile": ctx.lockfile.display().to_string(),
        "members": ctx.graph.member_count(),
        "externals": ctx.graph.external_count(),
        "edges": ctx.graph.edge_count(),
        "cycles": cycles,
        "ownership_warnings": ownership_warnings,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
  } else {
    println!("Lockfile: {}", ctx.lockfile.display());
    println!(
      "✅ {} workspace packages, {} external packages, {} dependency edges",
      ctx.graph.member_count(),
      ctx.graph.external_count(),
      ctx.graph.edge_count()
    );

    if cycles.is_empty() {
      println!("✅ No dependency cycles between workspace packages");
    } else {
      println!("⚠️  {} dependency cycle(s):", cycles.len());
      for (i, cycle) in cycles.iter().enumerate() {
        println!("  Cycle {}: {}", i + 1, cycle.join(" ↔ "));
      }
    }

    if ownership_warnings.is_empty() {
      println!("✅ Package roots do not overlap");
    } else {
      println!("⚠️  {} ambiguous package root(s):", ownership_warnings.len());
      for warning in &ownership_warnings {
        println!("  {}", warning);
      }
    }
  }

  if strict && (!cycles.is_empty() || !ownership_warnings.is_empty()) {
    return Err(ImpactError::with_help(
      format!(
        "Strict check failed: {} cycle(s), {} ambiguous root(s)",
        cycles.len(),
        ownership_warnings.len()
      ),
      "Cycles and overlapping roots are tolerated without --strict",
    ));
  }

  Ok(())
}
