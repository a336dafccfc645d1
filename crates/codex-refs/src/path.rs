//! Path validation and sanitization
//!
//! Reference paths are always relative, forward-slash separated, and free of
//! traversal components. `validate_path` is the authority for
//! security-sensitive call sites; `sanitize_path` is a best-effort cleanup
//! for legacy reference syntax and must not be used as a trust boundary.

use crate::error::{Error, Result};

/// Protocol prefixes that must never appear inside a reference path
const PROTOCOL_PREFIXES: &[&str] = &["codex://", "http://", "https://", "file://"];

/// Maximum length of a single path segment
const MAX_SEGMENT_LENGTH: usize = 255;

/// Validate a reference path for safety.
///
/// Rejects absolute paths, `..` traversal, home-directory shorthand,
/// protocol prefixes, null bytes, and oversized segments.
///
/// # Errors
///
/// Returns [`Error::UnsafePath`] naming the first hazard found.
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::unsafe_path(path, "path is empty"));
    }

    if path.contains('\0') {
        return Err(Error::unsafe_path(path, "path contains null bytes"));
    }

    for prefix in PROTOCOL_PREFIXES {
        if path.starts_with(prefix) {
            return Err(Error::unsafe_path(
                path,
                format!("path contains protocol prefix '{prefix}'"),
            ));
        }
    }

    if path.starts_with('/') {
        return Err(Error::unsafe_path(path, "absolute paths are not allowed"));
    }

    if path.starts_with('~') {
        return Err(Error::unsafe_path(
            path,
            "home directory shorthand is not allowed",
        ));
    }

    // Windows drive letters and UNC paths
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err(Error::unsafe_path(path, "absolute paths are not allowed"));
    }
    if path.starts_with("\\\\") {
        return Err(Error::unsafe_path(path, "UNC paths are not allowed"));
    }

    for segment in path.replace('\\', "/").split('/') {
        if segment == ".." {
            return Err(Error::unsafe_path(
                path,
                "parent directory traversal is not allowed",
            ));
        }
        if segment.len() > MAX_SEGMENT_LENGTH {
            return Err(Error::unsafe_path(
                path,
                format!("path segment exceeds {MAX_SEGMENT_LENGTH} characters"),
            ));
        }
    }

    Ok(())
}

/// Check a path without surfacing the failure reason.
pub fn is_safe_path(path: &str) -> bool {
    validate_path(path).is_ok()
}

/// Best-effort cleanup of a user-supplied path.
///
/// Strips protocol prefixes, normalizes separators, collapses duplicate
/// slashes, removes leading `/` and `~`, and resolves `.`/`..` segments by
/// dropping them. Never fails; intended for normalizing legacy reference
/// syntax, not for enforcing safety.
pub fn sanitize_path(path: &str) -> String {
    let mut path = path.trim().to_string();

    for prefix in PROTOCOL_PREFIXES {
        if let Some(rest) = path.strip_prefix(prefix) {
            path = rest.to_string();
            break;
        }
    }

    let path = path.replace('\\', "/");

    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    // The leading segment may still carry home-directory shorthand once
    // separators collapse; strip it, dropping the segment if nothing remains.
    if let Some(first) = parts.first() {
        let trimmed = first.trim_start_matches('~');
        if trimmed.is_empty() {
            parts.remove(0);
        } else {
            parts[0] = trimmed;
        }
    }

    parts.join("/")
}

/// Get the file extension of a path, lowercased, without the dot.
///
/// Hidden files such as `.gitignore` are treated as extensionless.
pub fn extension(path: &str) -> Option<String> {
    let name = path.rsplit('/').next()?;
    let idx = name.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some(name[idx + 1..].to_lowercase())
}
