//! Path string helpers
//!
//! Ownership works on `/`-separated, repo-relative strings rather than `Path`s so the
//! same inputs produce the same answers on every platform and no filesystem access
//! is needed.

use std::path::Path;

/// Clean a relative path from a lockfile or change list.
///
/// Converts `\` to `/`, drops `.` segments, empty segments and trailing slashes, and
/// resolves `..` lexically. Returns `None` when nothing is left (the path names the
/// base directory itself).
///
/// A `..` that climbs above the base is kept as a leading `..` segment so callers can
/// tell the path escapes.
pub fn clean_relative_path(path: &str) -> Option<String> {
  let unified = path.trim().replace('\\', "/");
  let mut segments: Vec<&str> = Vec::new();

  for segment in unified.split('/') {
    match segment {
      "" | "." => {}
      ".." => match segments.last() {
        Some(&last) if last != ".." => {
          segments.pop();
        }
        _ => segments.push(".."),
      },
      other => segments.push(other),
    }
  }

  if segments.is_empty() {
    None
  } else {
    Some(segments.join("/"))
  }
}

/// Join a package root onto the workspace's location inside the repository.
///
/// Returns `None` if the result is the repository root itself or climbs out of it.
pub fn join_relative(prefix: Option<&str>, root: &str) -> Option<String> {
  let joined = match prefix {
    Some(prefix) => format!("{}/{}", prefix, root),
    None => root.to_string(),
  };
  clean_relative_path(&joined).filter(|p| p != ".." && !p.starts_with("../"))
}

/// Normalize a changed-file path to a repo-relative, `/`-separated string.
///
/// Absolute paths under `repo_root` are made relative; absolute paths elsewhere are
/// returned unchanged (apart from separators) and will not match any package root.
pub fn normalize_changed_path(path: &str, repo_root: &Path) -> Option<String> {
  let trimmed = path.trim();
  if trimmed.is_empty() {
    return None;
  }

  let candidate = Path::new(trimmed);
  if candidate.is_absolute() {
    if let Ok(rel) = candidate.strip_prefix(repo_root) {
      return clean_relative_path(&rel.to_string_lossy());
    }
    return Some(trimmed.replace('\\', "/"));
  }

  clean_relative_path(trimmed)
}

/// Whether `root` is a path-segment prefix of `path` (or equal to it).
///
/// `pkgs/foo` contains `pkgs/foo/x.txt` but not `pkgs/foobar/x.txt`.
pub fn path_has_root(path: &str, root: &str) -> bool {
  match path.strip_prefix(root) {
    Some(rest) => rest.is_empty() || rest.starts_with('/'),
    None => false,
  }
}
