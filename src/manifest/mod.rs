//! Manifest file (`skills.toml`) parsing and persistence
//!
//! The manifest is the user-authored list of skills a project wants, each
//! identified by the repository it comes from and the name in its `SKILL.md`.
//!
//! # File Format
//!
//! ```toml
//! [[skills]]
//! source = "acme/tools"                 # owner/repo shorthand
//! name = "release-notes"
//!
//! [[skills]]
//! source = "acme/tools/extras"          # shorthand with a subdirectory
//! name = "changelog"
//! version = "1.2.0"                     # tag v1.2.0 or 1.2.0
//!
//! [[skills]]
//! source = "https://gitlab.com/team/skills.git"
//! name = "triage"
//! version = "latest"                    # same as omitting it
//! ```
//!
//! # Validation
//!
//! [`Manifest::load`] rejects, naming the offending entry:
//! - a manifest without entries
//! - blank `source` or `name`
//! - a `source` that is neither a shorthand nor a repository URL
//! - a `version` that is neither a semantic version (optionally `v`-prefixed)
//!   nor `latest`
//! - two entries for the same skill from the same source, compared
//!   case-insensitively, whatever their versions

mod validation;

pub use validation::{is_valid_version, validate_entries};

use crate::core::SkillpmError;
use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the manifest.
pub const MANIFEST_FILE_NAME: &str = "skills.toml";

/// Version string meaning "whatever the default branch has".
pub const LATEST: &str = "latest";

/// One requested skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Repository reference: shorthand, web URL or clone URL
    pub source: String,

    /// Skill name as declared in its `SKILL.md`
    pub name: String,

    /// Requested version; `None` and `"latest"` both mean the default branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ManifestEntry {
    /// Creates an entry.
    pub fn new(source: impl Into<String>, name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            version,
        }
    }

    /// The requested version, with `latest` folded into `None`.
    #[must_use]
    pub fn pinned_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(LATEST))
    }

    /// Case-insensitive identity of this entry within a manifest or lockfile.
    #[must_use]
    pub fn matches(&self, source: &str, name: &str) -> bool {
        self.source.eq_ignore_ascii_case(source) && self.name.eq_ignore_ascii_case(name)
    }
}

/// Parsed `skills.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Requested skills, in file order
    #[serde(default)]
    pub skills: Vec<ManifestEntry>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates a manifest file.
    ///
    /// # Errors
    ///
    /// - [`SkillpmError::ManifestNotFound`] when the file does not exist
    /// - [`SkillpmError::ManifestParseError`] for invalid TOML or wrong field types
    /// - the validation errors of [`Manifest::validate`]
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SkillpmError::ManifestNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

        let manifest = Self::parse(&content, path)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parses manifest TOML without validating it.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let manifest: Self = toml::from_str(content)
            .map_err(|e| SkillpmError::ManifestParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
            .with_context(|| format!("Invalid TOML syntax in manifest file: {}", path.display()))?;
        Ok(manifest)
    }

    /// Validates shape, sources, versions and uniqueness.
    pub fn validate(&self) -> Result<(), SkillpmError> {
        if self.skills.is_empty() {
            return Err(SkillpmError::ManifestValidationError {
                reason: "manifest declares no skills; add at least one [[skills]] entry".to_string(),
            });
        }
        validate_entries(&self.skills)
    }

    /// Writes the manifest atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(SkillpmError::from)?;
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Failed to write manifest: {}", path.display()))?;
        Ok(())
    }

    /// Adds an entry unless the same skill from the same source is already
    /// listed; returns whether it was added.
    pub fn add_entry(&mut self, entry: ManifestEntry) -> bool {
        if self.skills.iter().any(|e| e.matches(&entry.source, &entry.name)) {
            return false;
        }
        self.skills.push(entry);
        true
    }
}
