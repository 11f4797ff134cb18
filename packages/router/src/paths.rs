//! View path validation.
//!
//! Runs before any mutation: a rejected path never partially applies.

use crate::router::ViewSummary;
use thiserror::Error;
use trellis_common::CompId;

/// First path segments claimed by the site shell; views cannot shadow them.
pub const RESERVED_PREFIXES: &[&str] = &["settings", "posts", "category", "feed", "api"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Path must start with '/': {path}")]
    NotAbsolute { path: String },

    #[error("Path contains invalid characters: {path}")]
    InvalidCharacters { path: String },

    #[error("Path prefix '{prefix}' is reserved")]
    Reserved { prefix: String },

    #[error("Path '{path}' collides with the path of view {comp_id}")]
    Collides { path: String, comp_id: CompId },
}

/// Strip one trailing slash; the root path is never stripped.
pub fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Validate an author-entered view path against the other views on the site.
///
/// Rejects non-absolute paths, characters outside `[A-Za-z0-9/-]`, reserved
/// first segments, and paths that collide with another view exactly or
/// structurally (differing only by a trailing slash). The view under edit,
/// if any, is excluded from the collision check.
pub fn validate_view_path(
    path: &str,
    views: &[ViewSummary],
    editing: Option<CompId>,
) -> Result<(), PathError> {
    if !path.starts_with('/') {
        return Err(PathError::NotAbsolute {
            path: path.to_string(),
        });
    }
    if path != "/" {
        let body = &path[1..];
        if !body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
        {
            return Err(PathError::InvalidCharacters {
                path: path.to_string(),
            });
        }
        let first_segment = body.split('/').next().unwrap_or_default();
        if let Some(&prefix) = RESERVED_PREFIXES
            .iter()
            .find(|&&p| first_segment.eq_ignore_ascii_case(p))
        {
            return Err(PathError::Reserved {
                prefix: prefix.to_string(),
            });
        }
    }

    let normalized = normalize(path);
    for view in views {
        if editing == Some(view.comp_id) {
            continue;
        }
        if normalize(&view.path) == normalized {
            return Err(PathError::Collides {
                path: path.to_string(),
                comp_id: view.comp_id,
            });
        }
    }
    Ok(())
}
