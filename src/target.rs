//! Path matching for decision rules and gate layouts.
//!
//! Two matchers only: the exact page, or a whole subtree. Subtree matching
//! respects segment boundaries, so `/administrator` is not under `/admin`.

use std::borrow::Cow;

/// Strip the query string, fragment and trailing slash from a path.
///
/// Repeated slashes collapse and dot segments are resolved, so `//admin`
/// and `/x/../admin` both become `/admin`. `..` never climbs above the
/// root. The root path stays `/`, and an empty path is treated as the
/// root. Paths that are already canonical are returned borrowed.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Cow::Borrowed("/");
    }
    if is_canonical(trimmed) {
        return Cow::Borrowed(trimmed);
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    if segments.is_empty() {
        return Cow::Borrowed("/");
    }
    Cow::Owned(format!("/{}", segments.join("/")))
}

fn is_canonical(path: &str) -> bool {
    match path.strip_prefix('/') {
        Some(rest) => rest
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != ".."),
        None => false,
    }
}

/// Returns `true` if `path` is `root` or lies below it.
///
/// Both arguments are normalized first.
pub fn is_within(root: &str, path: &str) -> bool {
    let root = normalize_path(root);
    let path = normalize_path(path);
    if root == "/" {
        return true;
    }
    match path.strip_prefix(&*root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// A matcher for a requested path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher<'a> {
    /// Matches exactly this page (after normalization).
    Exact(&'a str),
    /// Matches this page and everything below it.
    Subtree(&'a str),
}

impl<'a> PathMatcher<'a> {
    /// Check if this matcher matches the given path.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(expected) => normalize_path(path) == normalize_path(expected),
            PathMatcher::Subtree(root) => is_within(root, path),
        }
    }
}
