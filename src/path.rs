//! Repository path canonicalization
//!
//! Every file identity that crosses a component boundary (discovery,
//! analysis, apply, reporting) uses the canonical form produced here:
//! forward slashes, no empty/`.`/`..` segments, one leading `/`.

use std::path::{Path, PathBuf};

/// Join `path` onto an optional repository-relative `base` and canonicalize
///
/// A leading separator on `path` does not make it absolute relative to the
/// base: `("/src", "/a/b")` and `("/src", "a\\b")` both yield `/src/a/b`.
pub fn canonical_repo_path(base: Option<&str>, path: &str) -> String {
    match base {
        Some(base) if !base.is_empty() => normalize_repo_path(&format!("{}/{}", base, path)),
        _ => normalize_repo_path(path),
    }
}

/// Canonicalize a single repository path
///
/// Idempotent on every host: both `/` and `\` are separators regardless of
/// the platform's native one. `..` never climbs above the repository root.
pub fn normalize_repo_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            part => parts.push(part),
        }
    }
    format!("/{}", parts.join("/"))
}

/// Split a canonical path into its directory and file name
///
/// `/src/app/a.csproj` becomes `("/src/app", "a.csproj")`; a file at the
/// root has directory `/`.
pub fn split_repo_path(canonical: &str) -> (String, String) {
    let normalized = normalize_repo_path(canonical);
    match normalized.rsplit_once('/') {
        Some(("", name)) => ("/".to_string(), name.to_string()),
        Some((directory, name)) => (directory.to_string(), name.to_string()),
        None => ("/".to_string(), normalized),
    }
}

/// Resolve a canonical repository path against the local checkout root
pub fn local_path(repo_root: &Path, canonical: &str) -> PathBuf {
    let mut local = repo_root.to_path_buf();
    for segment in normalize_repo_path(canonical).split('/').filter(|s| !s.is_empty()) {
        local.push(segment);
    }
    local
}
