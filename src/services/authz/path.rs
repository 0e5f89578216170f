//! Resource path canonicalization.
//!
//! Pure string operations: nothing here touches the filesystem, so a path that
//! normalizes to somewhere under a base path is only "under" it lexically.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path {path:?} is not under base path {base:?}")]
    NotUnderBase { path: String, base: String },
}

/// Collapse repeated separators and resolve `.` / `..` segments.
///
/// The result is always absolute and never ends in `/` (except the root itself).
/// `..` at the root stays at the root.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    let mut out = String::with_capacity(path.len() + 1);
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Remove `base` from the front of `path`.
///
/// Both arguments are expected to be normalized already. The check is a literal
/// string prefix test, so `/protected` also matches `/protectedfoo`; issuers are
/// configured with the base path they own and nothing finer is enforced here.
pub fn strip_base(path: &str, base: &str) -> Result<String, PathError> {
    if base == "/" {
        return Ok(path.to_string());
    }

    match path.strip_prefix(base) {
        Some(rest) => Ok(rest.to_string()),
        None => Err(PathError::NotUnderBase {
            path: path.to_string(),
            base: base.to_string(),
        }),
    }
}

/// Directory-aware containment: `/a` contains `/a` and `/a/b`, not `/ab`.
pub fn is_within(path: &str, root: &str) -> bool {
    if root == "/" {
        return true;
    }
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
