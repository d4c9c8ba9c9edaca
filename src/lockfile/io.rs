//! Loading and atomic saving of lockfiles.

use super::{LockFile, is_commit_id};
use crate::core::SkillpmError;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use std::path::Path;

impl LockFile {
    /// Loads a lockfile; a missing or blank file yields an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`SkillpmError::LockfileParseError`] for invalid content,
    /// including a `resolvedRef` that is not a full commit id, and an error for
    /// lockfiles written by a newer format version.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).with_context(|| {
            format!(
                "Cannot read lockfile: {}\n\n\
                    Possible causes:\n\
                    - Permission denied (check file ownership)\n\
                    - File is locked by another process",
                path.display()
            )
        })?;

        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let lockfile: Self = toml::from_str(&content)
            .map_err(|e| SkillpmError::LockfileParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
            .with_context(|| {
                format!(
                    "Invalid TOML syntax in lockfile: {}\n\n\
                    Delete skills.lock and run 'skillpm install' to regenerate it",
                    path.display()
                )
            })?;

        if lockfile.lock_version > Self::CURRENT_VERSION {
            return Err(SkillpmError::Other {
                message: format!(
                    "Lockfile version {} is newer than supported version {}.\n\n\
                    This lockfile was created by a newer version of skillpm.",
                    lockfile.lock_version,
                    Self::CURRENT_VERSION
                ),
            }
            .into());
        }

        if let Some(entry) = lockfile.skills.iter().find(|e| !is_commit_id(&e.resolved_ref)) {
            return Err(SkillpmError::LockfileParseError {
                file: path.display().to_string(),
                reason: format!(
                    "resolvedRef '{}' of skill '{}' is not a full commit SHA",
                    entry.resolved_ref, entry.name
                ),
            }
            .into());
        }

        Ok(lockfile)
    }

    /// Writes the lockfile atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = String::from("# Auto-generated lockfile - DO NOT EDIT\n");
        content.push_str(&toml::to_string_pretty(self).map_err(SkillpmError::from)?);

        atomic_write(path, content.as_bytes()).with_context(|| {
            format!(
                "Cannot write lockfile: {}\n\n\
                    Possible causes:\n\
                    - Permission denied\n\
                    - Disk is full or read-only",
                path.display()
            )
        })?;

        tracing::debug!("Wrote {} lock entries to {}", self.skills.len(), path.display());
        Ok(())
    }
}
