//! Entry-level manifest validation.

use super::{LATEST, ManifestEntry};
use crate::core::SkillpmError;
use crate::source::is_valid_source;

/// Returns `true` for `latest` or a full semantic version, optionally
/// prefixed with `v`.
///
/// ```
/// use skillpm_cli::manifest::is_valid_version;
///
/// assert!(is_valid_version("1.2.3"));
/// assert!(is_valid_version("v2.0.0-beta.1"));
/// assert!(is_valid_version("latest"));
/// assert!(!is_valid_version("^1.2"));
/// assert!(!is_valid_version("main"));
/// ```
#[must_use]
pub fn is_valid_version(version: &str) -> bool {
    let version = version.trim();
    if version.eq_ignore_ascii_case(LATEST) {
        return true;
    }
    let bare = version.strip_prefix(['v', 'V']).unwrap_or(version);
    semver::Version::parse(bare).is_ok()
}

/// Validates every entry and rejects duplicates.
///
/// Entry positions in errors start at 1.
pub fn validate_entries(entries: &[ManifestEntry]) -> Result<(), SkillpmError> {
    for (i, entry) in entries.iter().enumerate() {
        let index = i + 1;
        let invalid = |reason: String| SkillpmError::InvalidManifestEntry {
            index,
            reason,
        };

        if entry.source.trim().is_empty() {
            return Err(invalid("'source' must not be empty".to_string()));
        }
        if entry.name.trim().is_empty() {
            return Err(invalid("'name' must not be empty".to_string()));
        }
        if !is_valid_source(entry.source.trim()) {
            return Err(invalid(format!(
                "source '{}' is neither an owner/repo shorthand nor a repository URL",
                entry.source
            )));
        }
        if let Some(version) = &entry.version
            && !is_valid_version(version)
        {
            return Err(invalid(format!(
                "version '{version}' of skill '{}' is not a semantic version or 'latest'",
                entry.name
            )));
        }

        if let Some(first) = entries[..i].iter().position(|e| e.matches(&entry.source, &entry.name))
        {
            return Err(SkillpmError::DuplicateManifestEntry {
                name: entry.name.clone(),
                source_url: entry.source.clone(),
                first: first + 1,
                second: index,
            });
        }
    }
    Ok(())
}
