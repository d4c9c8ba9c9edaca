//! Lockfile (`skills.lock`) management
//!
//! The lockfile freezes every manifest entry to the exact commit it was
//! installed from, so `skillpm install --frozen` can reproduce an installation
//! even after tags move or branches advance.
//!
//! # Format
//!
//! ```toml
//! # Auto-generated lockfile - DO NOT EDIT
//! lockVersion = 1
//!
//! [[skills]]
//! source = "acme/tools"
//! name = "release-notes"
//! version = "latest"
//! resolvedRef = "3f0c6a9e1b7d2c4f5a8e9b0c1d2e3f4a5b6c7d8e"
//! installedAt = "2026-10-17T09:30:00Z"
//! ```
//!
//! `resolvedRef` is always a full commit SHA, never a branch or tag name.
//! `version` is the manifest's requested version when it has one, else the
//! version the skill declared, else `latest`.
//!
//! The file lives next to `skills.toml` and is replaced atomically, and only
//! after a fully successful install.

mod io;

use crate::manifest::MANIFEST_FILE_NAME;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the lockfile.
pub const LOCKFILE_NAME: &str = "skills.lock";

/// One installed skill, frozen to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEntry {
    /// Source string as written in the manifest
    pub source: String,
    /// Skill name as written in the manifest
    pub name: String,
    /// Recorded version, or `latest`
    pub version: String,
    /// Full commit SHA the skill was installed from
    pub resolved_ref: String,
    /// When the entry was resolved
    pub installed_at: DateTime<Utc>,
}

/// Whether `value` is a full SHA-1 or SHA-256 commit id.
#[must_use]
pub fn is_commit_id(value: &str) -> bool {
    matches!(value.len(), 40 | 64) && value.bytes().all(|b| b.is_ascii_hexdigit())
}

impl LockEntry {
    /// Case-insensitive `(source, name)` match.
    #[must_use]
    pub fn matches(&self, source: &str, name: &str) -> bool {
        self.source.eq_ignore_ascii_case(source) && self.name.eq_ignore_ascii_case(name)
    }
}

/// Parsed `skills.lock`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockFile {
    /// Format version of the file
    pub lock_version: u32,
    /// Locked skills in manifest order
    #[serde(default)]
    pub skills: Vec<LockEntry>,
}

impl Default for LockFile {
    fn default() -> Self {
        Self::new()
    }
}

impl LockFile {
    /// Format version written by this build.
    pub const CURRENT_VERSION: u32 = 1;

    /// Creates an empty lockfile.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lock_version: Self::CURRENT_VERSION,
            skills: Vec::new(),
        }
    }

    /// Creates a lockfile holding `skills`.
    #[must_use]
    pub const fn with_entries(skills: Vec<LockEntry>) -> Self {
        Self {
            lock_version: Self::CURRENT_VERSION,
            skills,
        }
    }

    /// Finds the entry for `(source, name)`, case-insensitively.
    #[must_use]
    pub fn find(&self, source: &str, name: &str) -> Option<&LockEntry> {
        self.skills.iter().find(|e| e.matches(source, name))
    }

    /// Number of locked skills.
    #[must_use]
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Whether nothing is locked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// The lockfile path belonging to a manifest path.
#[must_use]
pub fn lockfile_path_for(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(dir) if manifest_path.file_name().is_some_and(|n| n == MANIFEST_FILE_NAME) => {
            dir.join(LOCKFILE_NAME)
        }
        _ => manifest_path.with_extension("lock"),
    }
}
