mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use uv_impact::core::context::WorkspaceContext;
use uv_impact::core::error::{ImpactError, print_error};

/// Find the uv workspace packages impacted by a set of changed files
#[derive(Parser)]
#[command(name = "uv-impact")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Increase log verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// Only print errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  quiet: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Write the packages impacted by changes as a JSON array
  Affected {
    /// Git ref to diff from (default: uncommitted changes)
    #[arg(long)]
    base: Option<String>,
    /// Git ref to diff to
    #[arg(long, default_value = "HEAD")]
    head: String,
    /// Comma-separated changed paths, relative to the repository root (skips git)
    #[arg(long, conflicts_with = "base")]
    files: Option<String>,
    /// Also include uncommitted changes when diffing --base (always on without --base)
    #[arg(long)]
    uncommitted: bool,
    /// Include untracked files
    #[arg(long)]
    untracked: bool,
    /// Where to write the impacted targets (default from config)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output format: text (default), json, names-only
    #[arg(long, default_value = "text")]
    format: String,
    /// uv workspace directory (default: repository root)
    #[arg(long)]
    workspace: Option<PathBuf>,
  },

  /// List workspace packages with their roots and dependencies
  Packages {
    /// uv workspace directory (default: repository root)
    #[arg(long)]
    workspace: Option<PathBuf>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Validate the lockfile graph and report cycles and overlapping roots
  Check {
    /// uv workspace directory (default: repository root)
    #[arg(long)]
    workspace: Option<PathBuf>,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
    /// Treat cycles and overlapping roots as errors
    #[arg(long)]
    strict: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  let heading = anstyle::Style::new()
    .bold()
    .underline()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow)));
  let failure = anstyle::Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red)));

  clap::builder::Styles::styled()
    .usage(heading)
    .header(heading)
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(failure)
    .error(failure)
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` overrides the flags.
fn init_logging(verbose: u8, quiet: bool) {
  let level = if quiet {
    "error"
  } else {
    match verbose {
      0 => "warn",
      1 => "info",
      2 => "debug",
      _ => "trace",
    }
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose, cli.quiet);

  let cwd = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let workspace = match &cli.command {
    Commands::Affected { workspace, .. } | Commands::Packages { workspace, .. } | Commands::Check { workspace, .. } => {
      workspace.clone()
    }
  };

  // Build workspace context once (lockfile, graph, ownership, config)
  let ctx = match WorkspaceContext::discover(&cwd, workspace.as_deref()) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Affected {
      base,
      head,
      files,
      uncommitted,
      untracked,
      output,
      format,
      workspace: _,
    } => commands::run_affected(
      &ctx,
      commands::ChangeSource::from_args(base, head, files, uncommitted, untracked),
      output,
      format,
      cli.quiet,
    ),
    Commands::Packages { json, .. } => commands::run_packages(&ctx, json),
    Commands::Check { json, strict, .. } => commands::run_check(&ctx, json, strict),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ImpactError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
