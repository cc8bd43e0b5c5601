use crate::core::error::{ConfigError, ImpactError, ImpactResult, ResultExt};
use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for uv-impact
/// Searched in order: impact.toml, .impact.toml, .config/impact.toml
///
/// Every field is optional; a workspace without a config file gets the defaults.
///
/// # Example
///
/// ```toml
/// lockfile = "uv.lock"
/// output = "impacted_targets.json"
/// ignore = ["docs/**", "**/*.md"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImpactConfig {
  /// Lockfile path, relative to the workspace root
  pub lockfile: PathBuf,

  /// Where `affected` writes the JSON array of impacted packages
  pub output: PathBuf,

  /// Glob patterns (repo-relative) for changed files that never impact anything.
  /// `*` stays within one path segment; use `**/` to match at any depth.
  /// Matched files are dropped before ownership, so they cannot escalate either.
  pub ignore: Vec<String>,
}

impl Default for ImpactConfig {
  fn default() -> Self {
    Self {
      lockfile: PathBuf::from("uv.lock"),
      output: PathBuf::from("impacted_targets_json_tmp"),
      ignore: Vec::new(),
    }
  }
}

impl ImpactConfig {
  /// Find config file in search order: impact.toml, .impact.toml, .config/impact.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("impact.toml"),
      path.join(".impact.toml"),
      path.join(".config").join("impact.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from the workspace root, or defaults if no config file exists
  pub fn load(path: &Path) -> ImpactResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::from_toml_str(&content)
      .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    tracing::debug!("Loaded config from {}", config_path.display());
    Ok(config)
  }

  /// Parse and validate config text
  pub fn from_toml_str(content: &str) -> ImpactResult<Self> {
    let config: ImpactConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate configuration values
  pub fn validate(&self) -> ImpactResult<()> {
    if self.lockfile.as_os_str().is_empty() {
      return Err(ImpactError::with_help(
        "`lockfile` must not be empty",
        "Remove the key to use the default (uv.lock)",
      ));
    }

    if self.output.as_os_str().is_empty() {
      return Err(ImpactError::with_help(
        "`output` must not be empty",
        "Remove the key to use the default (impacted_targets_json_tmp)",
      ));
    }

    self.ignore_patterns().map(|_| ())
  }

  /// Compile the `ignore` patterns
  pub fn ignore_patterns(&self) -> ImpactResult<Vec<Pattern>> {
    self
      .ignore
      .iter()
      .map(|raw| {
        Pattern::new(raw).map_err(|e| {
          ImpactError::Config(ConfigError::InvalidPattern {
            pattern: raw.clone(),
            reason: e.to_string(),
          })
        })
      })
      .collect()
  }
}
