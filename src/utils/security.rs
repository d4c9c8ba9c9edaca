//! Install path safety
//!
//! Skill names come from `SKILL.md` files in repositories we do not control, so
//! every install path derived from a name goes through this module:
//!
//! 1. [`detect_traversal`] rejects names that try to address another directory
//! 2. [`sanitize_skill_name`] turns what remains into a single safe path segment
//! 3. [`is_within_base`] confirms the joined path stays inside the install base
//!
//! [`resolve_install_path`] runs all three and is what the installer calls.

use crate::core::SkillpmError;
use crate::utils::fs::normalize_path;
use std::path::{Path, PathBuf};

/// Replacement used when sanitization leaves nothing behind.
pub const UNNAMED_SKILL: &str = "unnamed-skill";

/// Longest directory name we produce, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Characters removed outright from skill names.
const FORBIDDEN_CHARS: &[char] = &['/', '\\', ':', '\0'];

/// Turns an arbitrary skill name into a single filesystem-safe path segment.
///
/// Path separators, `:` and NUL are removed; leading and trailing dots and
/// whitespace are trimmed; an empty result becomes [`UNNAMED_SKILL`]; the
/// result is capped at [`MAX_NAME_LENGTH`] characters.
///
/// # Examples
///
/// ```
/// use skillpm_cli::utils::security::sanitize_skill_name;
///
/// assert_eq!(sanitize_skill_name("release-notes"), "release-notes");
/// assert_eq!(sanitize_skill_name("../../etc"), "etc");
/// assert_eq!(sanitize_skill_name("..."), "unnamed-skill");
/// ```
#[must_use]
pub fn sanitize_skill_name(name: &str) -> String {
    let stripped: String = name.chars().filter(|c| !FORBIDDEN_CHARS.contains(c)).collect();

    let trimmed = stripped.trim_matches(|c: char| c == '.' || c.is_whitespace());

    let sanitized = if trimmed.is_empty() { UNNAMED_SKILL } else { trimmed };

    sanitized.chars().take(MAX_NAME_LENGTH).collect()
}

/// Returns `true` when a raw name tries to reach outside its own directory.
///
/// A name is rejected when it contains a path separator, a NUL byte, or is
/// itself a `..` segment.
#[must_use]
pub fn detect_traversal(name: &str) -> bool {
    name.contains('/') || name.contains('\\') || name.contains('\0') || name.trim() == ".."
}

/// Returns `true` when `target` is `base` itself or a strict descendant of it.
///
/// Both paths are normalized lexically first, so `base/a/../../x` is caught
/// without touching the filesystem.
#[must_use]
pub fn is_within_base(base: &Path, target: &Path) -> bool {
    let base = normalize_path(base);
    let target = normalize_path(target);
    target.starts_with(&base)
}

/// Computes `<base>/<sanitized name>` and verifies it stays inside `base`.
///
/// # Errors
///
/// Returns [`SkillpmError::PathTraversal`] when the raw name is a traversal
/// attempt or the computed path escapes `base`. Nothing is written to disk
/// either way.
pub fn resolve_install_path(base: &Path, raw_name: &str) -> Result<PathBuf, SkillpmError> {
    if detect_traversal(raw_name) {
        return Err(SkillpmError::PathTraversal {
            name: raw_name.escape_default().to_string(),
            path: base.display().to_string(),
        });
    }

    let target = base.join(sanitize_skill_name(raw_name));
    if !is_within_base(base, &target) {
        return Err(SkillpmError::PathTraversal {
            name: raw_name.to_string(),
            path: target.display().to_string(),
        });
    }

    Ok(target)
}
