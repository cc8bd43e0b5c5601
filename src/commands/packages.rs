//! `uv-impact packages` - List workspace members, their roots and workspace edges

use uv_impact::core::context::WorkspaceContext;
use uv_impact::core::error::ImpactResult;

struct PackageRow {
  name: String,
  version: Option<String>,
  root: Option<String>,
  dependencies: Vec<String>,
  dependents: Vec<String>,
}

/// Run the packages command
pub fn run_packages(ctx: &WorkspaceContext, json: bool) -> ImpactResult<()> {
  let rows = collect_rows(ctx)?;

  if json {
    let output: Vec<_> = rows
      .iter()
      .map(|row| {
        serde_json::json!({
            "name": row.name,
            "version": row.version,
            "root": row.root,
            "dependencies": row.dependencies,
            "dependents": row.dependents,
        })
      })
      .collect();
    println!("{}", serde_json::to_string_pretty(&output)?);
    return Ok(());
  }

  println!("Workspace packages: {}", rows.len());
  for row in &rows {
    let version = row.version.as_deref().unwrap_or("-");
    let root = row.root.as_deref().unwrap_or("(workspace root, owns no files)");
    println!("  📦 {} {} at {}", row.name, version, root);
    if !row.dependencies.is_empty() {
      println!("     depends on: {}", row.dependencies.join(", "));
    }
    if !row.dependents.is_empty() {
      println!("     used by:    {}", row.dependents.join(", "));
    }
  }

  Ok(())
}

/// One row per member, dependencies filtered to workspace members
fn collect_rows(ctx: &WorkspaceContext) -> ImpactResult<Vec<PackageRow>> {
  ctx
    .graph
    .member_nodes()
    .map(|node| {
      let dependencies = ctx
        .graph
        .direct_dependencies(&node.name)?
        .into_iter()
        .filter(|dep| ctx.graph.is_member(dep))
        .collect();

      Ok(PackageRow {
        name: node.name.clone(),
        version: node.version.clone(),
        root: ctx.ownership.root_of(&node.name).map(str::to_string),
        dependencies,
        dependents: ctx.graph.direct_dependents(&node.name)?,
      })
    })
    .collect()
}
