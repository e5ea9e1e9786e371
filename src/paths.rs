//! Route path helpers: wildcard extraction, joining and cleaning.
//!
//! Wildcards use the `:name` (single segment) or `*name` (catch-all) syntax
//! and must directly follow a `/`.

use std::sync::LazyLock;

use regex::Regex;

static WILDCARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?::|\*)([a-zA-Z0-9_]+)").expect("wildcard pattern is valid"));

/// Returns the wildcard names used in `path`, in order of appearance.
///
/// Names appearing more than once are only returned once.
pub fn extract_wildcards(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cap in WILDCARD.captures_iter(path) {
        let name = &cap[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Whether `path` is absolute, i.e. ignores any base path (`//` prefix).
pub fn is_absolute(path: &str) -> bool {
    path.starts_with("//")
}

/// Canonicalize a URL path.
///
/// The result always starts with `/`, has no empty, `.` or `..` segments,
/// and keeps a trailing slash when the input had one.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut cleaned = format!("/{}", segments.join("/"));
    let trailing = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");
    if trailing && cleaned.len() > 1 {
        cleaned.push('/');
    }
    cleaned
}

/// Join a base path and a relative path.
///
/// Empty elements are ignored and the trailing slash is dropped.
pub fn join_paths(base: &str, path: &str) -> String {
    let joined = clean_path(&format!("{}/{}", base, path));
    match joined.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => joined,
    }
}
