//! The set of changed files fed into impact analysis

use crate::utils::normalize_changed_path;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::Path;

/// Changed file paths, normalized to repo-relative `/`-separated strings.
///
/// Order and duplicates in the input do not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
  files: BTreeSet<String>,
}

impl ChangeSet {
  /// Normalize `paths` against the repository root.
  ///
  /// Blank entries are dropped; absolute paths inside `repo_root` become relative.
  pub fn new<S: AsRef<str>>(paths: impl IntoIterator<Item = S>, repo_root: &Path) -> Self {
    let files = paths
      .into_iter()
      .filter_map(|p| normalize_changed_path(p.as_ref(), repo_root))
      .collect();
    Self { files }
  }

  /// Drop one file. Returns whether it was present.
  pub fn remove(&mut self, path: &str) -> bool {
    self.files.remove(path)
  }

  /// Split off files matching any of `patterns`. Returns the kept set and the dropped files.
  ///
  /// `*` stays within one path segment; `**/` is needed to match at any depth.
  pub fn partition_ignored(self, patterns: &[Pattern]) -> (Self, Vec<String>) {
    if patterns.is_empty() {
      return (self, Vec::new());
    }

    let options = MatchOptions {
      require_literal_separator: true,
      ..MatchOptions::new()
    };
    let (ignored, kept): (BTreeSet<String>, BTreeSet<String>) = self
      .files
      .into_iter()
      .partition(|file| patterns.iter().any(|p| p.matches_with(file, options)));

    (Self { files: kept }, ignored.into_iter().collect())
  }

  /// Files in sorted order.
  pub fn files(&self) -> impl Iterator<Item = &str> {
    self.files.iter().map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}
