//! `uv.lock` parser
//!
//! Shape of the document this reads:
//!
//! ```toml
//! version = 1
//!
//! [manifest]
//! members = ["uv-alpha", "uv-common"]
//!
//! [[package]]
//! name = "uv-alpha"
//! version = "0.1.0"
//! source = { editable = "uv/lib/alpha" }
//! dependencies = [{ name = "uv-common" }, { name = "requests" }]
//!
//! [package.dev-dependencies]
//! dev = [{ name = "pytest" }]
//! ```
//!
//! Members come from `[manifest] members`. Single-project locks have no manifest; there
//! every editable or virtual package is a member. Everything else is external.

use super::{LockedPackage, LockedWorkspace, PackageKind};
use crate::core::error::ParseError;
use crate::utils::clean_relative_path;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// The only lock schema uv has shipped so far.
const SUPPORTED_VERSION: i64 = 1;

#[derive(Debug, Deserialize)]
struct RawLock {
  version: Option<i64>,
  manifest: Option<RawManifest>,
  #[serde(default, rename = "package")]
  packages: Vec<RawPackage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawManifest {
  #[serde(default)]
  members: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawPackage {
  name: Option<String>,
  version: Option<String>,
  source: Option<RawSource>,
  #[serde(default)]
  dependencies: Vec<RawDependency>,
  #[serde(default)]
  optional_dependencies: BTreeMap<String, Vec<RawDependency>>,
  #[serde(default)]
  dev_dependencies: BTreeMap<String, Vec<RawDependency>>,
}

#[derive(Debug, Deserialize)]
struct RawSource {
  editable: Option<String>,
  #[serde(rename = "virtual")]
  virtual_path: Option<String>,
}

impl RawSource {
  /// Path of a source that lives inside the workspace, if any.
  fn local_path(&self) -> Option<&str> {
    self.editable.as_deref().or(self.virtual_path.as_deref())
  }
}

#[derive(Debug, Deserialize)]
struct RawDependency {
  name: Option<String>,
}

/// Parse the contents of a `uv.lock` file.
///
/// Fails with a `ParseError` naming the offending entry for:
/// - TOML syntax errors and wrongly-typed fields
/// - a missing or unsupported `version`
/// - a `[[package]]` without `name`, or a dependency without `name`
/// - a member without an editable/virtual source, listed twice, or listed in
///   `[manifest]` without a `[[package]]` entry
pub fn parse_uv_lock(content: &str) -> Result<LockedWorkspace, ParseError> {
  let raw: RawLock =
    toml_edit::de::from_str(content).map_err(|e| ParseError::new("document", e.to_string().trim().to_string()))?;

  match raw.version {
    Some(SUPPORTED_VERSION) => {}
    Some(other) => {
      return Err(ParseError::new(
        "version",
        format!("unsupported lock schema version {} (expected {})", other, SUPPORTED_VERSION),
      ));
    }
    None => return Err(ParseError::new("version", "missing lock schema version")),
  }

  let manifest_members: BTreeSet<String> = raw.manifest.unwrap_or_default().members.into_iter().collect();
  let members_from_manifest = !manifest_members.is_empty();

  let mut by_name: BTreeMap<String, LockedPackage> = BTreeMap::new();

  for (idx, pkg) in raw.packages.into_iter().enumerate() {
    let name = pkg
      .name
      .ok_or_else(|| ParseError::new(format!("[[package]] #{}", idx + 1), "missing `name`"))?;
    let entry = format!("[[package]] #{} ({})", idx + 1, name);

    let local_path = pkg.source.as_ref().and_then(RawSource::local_path);
    let is_member = if members_from_manifest {
      manifest_members.contains(&name)
    } else {
      local_path.is_some()
    };

    let root = if is_member {
      let path = local_path.ok_or_else(|| {
        ParseError::new(
          &entry,
          "workspace member has no `editable` or `virtual` source to locate its root",
        )
      })?;
      clean_relative_path(path)
    } else {
      None
    };

    let mut dependencies = BTreeSet::new();
    let groups = std::iter::once(&pkg.dependencies)
      .chain(pkg.optional_dependencies.values())
      .chain(pkg.dev_dependencies.values());
    for dep in groups.flatten() {
      let dep_name = dep
        .name
        .as_ref()
        .ok_or_else(|| ParseError::new(&entry, "dependency entry without `name`"))?;
      // Extras of a package reference the package itself.
      if *dep_name != name {
        dependencies.insert(dep_name.clone());
      }
    }

    let kind = if is_member {
      PackageKind::Member
    } else {
      PackageKind::External
    };

    match by_name.get_mut(&name) {
      None => {
        by_name.insert(
          name.clone(),
          LockedPackage {
            name,
            version: pkg.version,
            kind,
            root,
            dependencies,
          },
        );
      }
      Some(_) if kind == PackageKind::Member => {
        return Err(ParseError::new(&entry, "workspace member is locked more than once"));
      }
      // Resolution forks lock one external package at several versions.
      Some(existing) => existing.dependencies.extend(dependencies),
    }
  }

  for member in &manifest_members {
    if !by_name.contains_key(member) {
      return Err(ParseError::new(
        "[manifest]",
        format!("member '{}' has no [[package]] entry", member),
      ));
    }
  }

  Ok(LockedWorkspace {
    packages: by_name.into_values().collect(),
  })
}
