//! Error types for uv-impact with contextual messages and exit codes
//!
//! Every fatal condition in a detection run maps onto one `ImpactError`. There is
//! no partial-result path: callers either get a complete impacted set or one of
//! these errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for uv-impact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// Validation failure (malformed lockfile, broken graph)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for uv-impact
#[derive(Debug)]
pub enum ImpactError {
  /// Lockfile could not be parsed
  Parse(ParseError),

  /// Lockfile parsed but the dependency graph is inconsistent
  Graph(GraphIntegrityError),

  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ImpactError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ImpactError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error.
  ///
  /// Parse, graph, config and git errors already name their offender and keep their
  /// exit code, so they pass through unchanged. Bare I/O errors carry no path and get
  /// folded into a message.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ImpactError::Message { message, context, help } => ImpactError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ImpactError::Io(e) => ImpactError::Message {
        message: ctx_str,
        context: Some(format!("I/O error: {}", e)),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ImpactError::Parse(_) => ExitCode::Validation,
      ImpactError::Graph(_) => ExitCode::Validation,
      ImpactError::Config(_) => ExitCode::User,
      ImpactError::Git(_) => ExitCode::System,
      ImpactError::Io(_) => ExitCode::System,
      ImpactError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ImpactError::Parse(e) => e.help_message(),
      ImpactError::Graph(e) => e.help_message(),
      ImpactError::Config(e) => e.help_message(),
      ImpactError::Git(e) => e.help_message(),
      ImpactError::Message { help, .. } => help.clone(),
      ImpactError::Io(_) => None,
    }
  }
}

impl fmt::Display for ImpactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ImpactError::Parse(e) => write!(f, "{}", e),
      ImpactError::Graph(e) => write!(f, "{}", e),
      ImpactError::Config(e) => write!(f, "{}", e),
      ImpactError::Git(e) => write!(f, "{}", e),
      ImpactError::Io(e) => write!(f, "I/O error: {}", e),
      ImpactError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ImpactError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ImpactError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ImpactError {
  fn from(err: io::Error) -> Self {
    ImpactError::Io(err)
  }
}

impl From<String> for ImpactError {
  fn from(msg: String) -> Self {
    ImpactError::message(msg)
  }
}

impl From<&str> for ImpactError {
  fn from(msg: &str) -> Self {
    ImpactError::message(msg)
  }
}

impl From<ParseError> for ImpactError {
  fn from(err: ParseError) -> Self {
    ImpactError::Parse(err)
  }
}

impl From<GraphIntegrityError> for ImpactError {
  fn from(err: GraphIntegrityError) -> Self {
    ImpactError::Graph(err)
  }
}

impl From<toml_edit::de::Error> for ImpactError {
  fn from(err: toml_edit::de::Error) -> Self {
    ImpactError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ImpactError {
  fn from(err: serde_json::Error) -> Self {
    ImpactError::message(format!("JSON error: {}", err))
  }
}

/// Lockfile parse errors.
///
/// `entry` names the offending part of the document, e.g. `[[package]] #3 (uv-alpha)`
/// or `[manifest]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
  pub entry: String,
  pub reason: String,
}

impl ParseError {
  pub fn new(entry: impl Into<String>, reason: impl Into<String>) -> Self {
    Self {
      entry: entry.into(),
      reason: reason.into(),
    }
  }

  fn help_message(&self) -> Option<String> {
    Some("Regenerate the lockfile with `uv lock` and commit the result.".to_string())
  }
}

impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Malformed lockfile at {}: {}", self.entry, self.reason)
  }
}

/// Referential integrity violations in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphIntegrityError {
  /// A package depends on a name that is neither a member nor a locked external package
  UndeclaredDependency { package: String, dependency: String },

  /// Two packages share a name
  DuplicatePackage { name: String },
}

impl GraphIntegrityError {
  fn help_message(&self) -> Option<String> {
    match self {
      GraphIntegrityError::UndeclaredDependency { dependency, .. } => Some(format!(
        "'{}' has no [[package]] entry. Run `uv lock` to re-resolve the workspace.",
        dependency
      )),
      GraphIntegrityError::DuplicatePackage { .. } => None,
    }
  }
}

impl fmt::Display for GraphIntegrityError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GraphIntegrityError::UndeclaredDependency { package, dependency } => write!(
        f,
        "Package '{}' depends on '{}', which is not declared in the lockfile",
        package, dependency
      ),
      GraphIntegrityError::DuplicatePackage { name } => {
        write!(f, "Package '{}' is declared more than once", name)
      }
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Lockfile not found at the configured location
  LockfileNotFound { path: PathBuf },

  /// An `ignore` pattern does not compile
  InvalidPattern { pattern: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::LockfileNotFound { .. } => Some(
        "Run from a uv workspace root, pass --workspace, or set `lockfile` in impact.toml.".to_string(),
      ),
      ConfigError::InvalidPattern { .. } => {
        Some("Patterns use glob syntax, e.g. \"docs/**\" or \"**/*.md\" (`*` does not cross `/`).".to_string())
      }
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::LockfileNotFound { path } => {
        write!(f, "Lockfile not found: {}", path.display())
      }
      ConfigError::InvalidPattern { pattern, reason } => {
        write!(f, "Invalid ignore pattern '{}': {}", pattern, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::CommandFailed { stderr, .. } => {
        if stderr.contains("unknown revision") || stderr.contains("bad revision") {
          Some("Make sure both refs exist locally (CI checkouts may need `fetch-depth: 0`).".to_string())
        } else {
          None
        }
      }
      GitError::RepoNotFound { path } => Some(format!(
        "Run inside a git repository, or pass --files with --workspace: {}",
        path.display()
      )),
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
    }
  }
}

/// Result type alias for uv-impact
pub type ImpactResult<T> = Result<T, ImpactError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ImpactError>,
{
  fn context(self, ctx: impl Into<String>) -> ImpactResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ImpactResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ImpactError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
