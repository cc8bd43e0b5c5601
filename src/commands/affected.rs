//! `uv-impact affected` - Show which packages are impacted by changes
//!
//! This command collects changed files (explicit list or git) and determines:
//! - Which workspace packages directly contain changed files
//! - Which packages transitively depend on those packages
//! - The full impacted set, written as a JSON array for CI

use std::fs;
use std::path::{Path, PathBuf};
use uv_impact::changes::ChangeSet;
use uv_impact::core::context::WorkspaceContext;
use uv_impact::core::error::{ImpactError, ImpactResult, ResultExt};
use uv_impact::graph::{self, ImpactAnalysis};
use uv_impact::utils::normalize_changed_path;

/// Where the changed files come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSource {
  /// Caller-supplied list
  Files(Vec<String>),
  /// Version control
  Git {
    /// `base..head` diff; `None` means working-tree changes
    range: Option<(String, String)>,
    /// Include `git diff HEAD`, on top of the range when one is given
    uncommitted: bool,
    /// Include untracked files
    untracked: bool,
  },
}

impl ChangeSource {
  /// Pick the source from CLI flags.
  ///
  /// `--files` wins. Otherwise `--base` diffs against `--head`; without `--base`,
  /// uncommitted changes are used.
  pub fn from_args(
    base: Option<String>,
    head: String,
    files: Option<String>,
    uncommitted: bool,
    untracked: bool,
  ) -> Self {
    if let Some(list) = files {
      return ChangeSource::Files(
        list
          .split(',')
          .map(str::trim)
          .filter(|f| !f.is_empty())
          .map(str::to_string)
          .collect(),
      );
    }

    let has_base = base.is_some();
    ChangeSource::Git {
      range: base.map(|b| (b, head)),
      uncommitted: uncommitted || !has_base,
      untracked,
    }
  }

  fn describe(&self) -> String {
    match self {
      ChangeSource::Files(files) => format!("files: {}", files.join(", ")),
      ChangeSource::Git { range: Some((base, head)), .. } => format!("changes between {} and {}", base, head),
      ChangeSource::Git { .. } => "uncommitted changes".to_string(),
    }
  }
}

/// Output format for affected command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
  Text,
  Json,
  NamesOnly,
}

impl OutputFormat {
  fn from_str(s: &str) -> ImpactResult<Self> {
    match s.to_lowercase().as_str() {
      "text" => Ok(Self::Text),
      "json" => Ok(Self::Json),
      "names" | "names-only" => Ok(Self::NamesOnly),
      _ => Err(ImpactError::message(format!(
        "Unknown format '{}'. Valid formats: text, json, names-only",
        s
      ))),
    }
  }
}

/// Run the affected command
pub fn run_affected(
  ctx: &WorkspaceContext,
  source: ChangeSource,
  output: Option<PathBuf>,
  format: String,
  quiet: bool,
) -> ImpactResult<()> {
  let output_format = OutputFormat::from_str(&format)?;
  let patterns = ctx.config.ignore_patterns()?;

  tracing::info!("Checking impacted packages for {}", source.describe());

  let output_path = output.unwrap_or_else(|| ctx.config.output.clone());

  let raw_files = collect_changed_files(ctx, &source)?;
  let mut changes = ChangeSet::new(&raw_files, &ctx.repo_root);
  // A previous run's output is not a source change.
  if let Some(previous) = repo_relative_output(&output_path, &ctx.repo_root)
    && changes.remove(&previous)
  {
    tracing::debug!("Skipping previous output file {}", previous);
  }
  let (changes, ignored) = changes.partition_ignored(&patterns);

  if !ignored.is_empty() {
    tracing::info!("Ignoring {} changed file(s) matching ignore patterns", ignored.len());
  }
  tracing::info!("Found {} changed files", changes.len());

  let analysis = graph::analyze(&ctx.graph, &ctx.ownership, &changes)?;

  write_targets(&output_path, &analysis)?;

  if !quiet {
    display_results(&analysis, &output_path, output_format)?;
  }

  Ok(())
}

/// Gather changed file paths from the selected source
fn collect_changed_files(ctx: &WorkspaceContext, source: &ChangeSource) -> ImpactResult<Vec<String>> {
  match source {
    ChangeSource::Files(files) => Ok(files.clone()),
    ChangeSource::Git {
      range,
      uncommitted,
      untracked,
    } => {
      let git = ctx.require_git()?;
      let mut files = match range {
        Some((base, head)) => git.changed_files_between(base, head)?,
        None => Vec::new(),
      };
      if *uncommitted {
        files.extend(git.uncommitted_files()?);
      }
      if *untracked {
        files.extend(git.untracked_files()?);
      }
      Ok(files)
    }
  }
}

/// The output file's location relative to the repository root, if it lies inside it
fn repo_relative_output(output: &Path, repo_root: &Path) -> Option<String> {
  let absolute = if output.is_absolute() {
    output.to_path_buf()
  } else {
    std::env::current_dir().ok()?.canonicalize().ok()?.join(output)
  };
  normalize_changed_path(&absolute.to_string_lossy(), repo_root).filter(|p| !p.starts_with('/'))
}

/// Write the impacted set as a JSON array of names
fn write_targets(path: &Path, analysis: &ImpactAnalysis) -> ImpactResult<()> {
  let json = serde_json::to_string(&analysis.impacted.to_sorted_vec())?;
  fs::write(path, json).with_context(|| format!("Failed to write impacted targets to {}", path.display()))?;
  tracing::debug!("Wrote {}", path.display());
  Ok(())
}

/// Display affected analysis results
fn display_results(analysis: &ImpactAnalysis, output_path: &Path, format: OutputFormat) -> ImpactResult<()> {
  match format {
    OutputFormat::Text => display_text(analysis, output_path),
    OutputFormat::Json => display_json(analysis),
    OutputFormat::NamesOnly => display_names_only(analysis),
  }
}

/// Display results in human-readable text format
fn display_text(analysis: &ImpactAnalysis, output_path: &Path) -> ImpactResult<()> {
  println!("Changed files: {}", analysis.changed_files.len());
  if !analysis.changed_files.is_empty() && analysis.changed_files.len() <= 20 {
    for file in &analysis.changed_files {
      println!("  {}", file);
    }
  }
  println!();

  if analysis.escalated() {
    println!(
      "Files outside every package: {} (impacts the whole workspace)",
      analysis.unowned_files.len()
    );
    for file in analysis.unowned_files.iter().take(20) {
      println!("  {}", file);
    }
    println!();
  }

  println!("Direct impact: {} packages", analysis.direct.len());
  for name in &analysis.direct {
    println!("  📦 {}", name);
  }
  println!();

  let dependents = analysis.dependents();
  println!("Transitive dependents: {} packages", dependents.len());
  for name in &dependents {
    println!("  ⬆  {}", name);
  }
  println!();

  println!(
    "Wrote {} impacted targets to {}",
    analysis.impacted.len(),
    output_path.display()
  );
  if analysis.impacted.is_empty() {
    println!("No impacted targets found");
  } else {
    for name in analysis.impacted.iter() {
      println!("  🎯 {}", name);
    }
  }

  Ok(())
}

/// Display results in JSON format
fn display_json(analysis: &ImpactAnalysis) -> ImpactResult<()> {
  use serde_json::json;

  let dependents = analysis.dependents();
  let impacted = analysis.impacted.to_sorted_vec();

  let output = json!({
      "changed_files": analysis.changed_files,
      "unowned_files": analysis.unowned_files,
      "impact": {
          "direct": analysis.direct,
          "dependents": dependents,
          "impacted": impacted
      },
      "summary": {
          "changed_files_count": analysis.changed_files.len(),
          "direct_count": analysis.direct.len(),
          "dependents_count": dependents.len(),
          "impacted_count": impacted.len(),
          "escalated": analysis.escalated()
      }
  });

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

/// Display only package names (impacted set)
fn display_names_only(analysis: &ImpactAnalysis) -> ImpactResult<()> {
  for name in analysis.impacted.iter() {
    println!("{}", name);
  }

  Ok(())
}
