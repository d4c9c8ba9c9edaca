//! Skills: directories described by a `SKILL.md` file
//!
//! A skill is a directory containing a `SKILL.md` whose YAML frontmatter names
//! and describes it. Any other files in the directory (references, scripts,
//! examples) are part of the skill and are copied on install.
//!
//! ## SKILL.md Format
//!
//! ```yaml
//! ---
//! name: release-notes
//! description: Drafts release notes from merged pull requests
//! version: "1.2.0"          # optional, must be a string
//! license: MIT              # optional
//! allowed-tools: [Read]     # optional
//! metadata:                 # optional, scalar values only
//!   internal: false
//! ---
//! # Release notes
//! ```
//!
//! Only `name` and `description` are required. A directory whose `SKILL.md` is
//! missing, unreadable or malformed is simply not a skill; discovery skips it
//! without reporting an error.

pub mod discovery;

pub use discovery::{SkillDiscovery, discover};

use anyhow::{Result, anyhow};
use gray_matter::{Matter, Pod, engine::Engine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// File that marks a directory as a skill.
pub const DESCRIPTOR_FILE: &str = "SKILL.md";

/// Maximum YAML frontmatter size in bytes
const MAX_FRONTMATTER_SIZE_BYTES: usize = 64 * 1024;

/// gray_matter engine that hands back the raw frontmatter text, leaving YAML
/// parsing (and its error messages) to serde_yaml.
struct RawFrontmatter;

impl Engine for RawFrontmatter {
    fn parse(content: &str) -> Result<Pod, gray_matter::Error> {
        Ok(Pod::String(content.to_string()))
    }
}

/// Frontmatter of a `SKILL.md` file.
///
/// Unknown keys are ignored; known keys must have the documented types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillFrontmatter {
    /// Skill name, used as the install directory name after sanitization
    pub name: String,

    /// What the skill does
    pub description: String,

    /// Declared version; only string values count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<serde_yaml::Value>,

    /// License identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Tools the skill may use
    #[serde(rename = "allowed-tools", default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<serde_yaml::Value>,

    /// Free-form key/value metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_yaml::Value>>,
}

impl SkillFrontmatter {
    /// The `version` field when it is a non-empty string.
    #[must_use]
    pub fn version_string(&self) -> Option<&str> {
        match &self.version {
            Some(serde_yaml::Value::String(v)) if !v.trim().is_empty() => Some(v.trim()),
            _ => None,
        }
    }

    /// Scalar metadata values rendered as strings; nested values are dropped.
    #[must_use]
    pub fn metadata_strings(&self) -> Option<BTreeMap<String, String>> {
        let metadata = self.metadata.as_ref()?;
        let flattened: BTreeMap<String, String> = metadata
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    _ => return None,
                };
                Some((key.clone(), rendered))
            })
            .collect();
        if flattened.is_empty() { None } else { Some(flattened) }
    }
}

/// Parses and validates `SKILL.md` content.
///
/// # Errors
///
/// Fails when there is no frontmatter block, the YAML is invalid, or `name` or
/// `description` is missing or blank.
///
/// ```
/// use skillpm_cli::skills::parse_skill_frontmatter;
///
/// let fm = parse_skill_frontmatter("---\nname: alpha\ndescription: First\nversion: \"1.0.0\"\n---\n# Alpha\n").unwrap();
/// assert_eq!(fm.name, "alpha");
/// assert_eq!(fm.version_string(), Some("1.0.0"));
/// ```
pub fn parse_skill_frontmatter(content: &str) -> Result<SkillFrontmatter> {
    let matter: Matter<RawFrontmatter> = Matter::new();
    let raw = matter
        .parse::<String>(content)
        .ok()
        .and_then(|parsed| parsed.data)
        .ok_or_else(|| {
            anyhow!(
                "SKILL.md missing required YAML frontmatter. Format:\n---\nname: skill-name\ndescription: What it does\n---\n# Content"
            )
        })?;

    if raw.len() > MAX_FRONTMATTER_SIZE_BYTES {
        return Err(anyhow!(
            "SKILL.md frontmatter exceeds maximum size of {} KB",
            MAX_FRONTMATTER_SIZE_BYTES / 1024
        ));
    }

    let frontmatter: SkillFrontmatter = serde_yaml::from_str(&raw)
        .map_err(|e| anyhow!("Invalid SKILL.md frontmatter: {e}"))?;

    if frontmatter.name.trim().is_empty() {
        return Err(anyhow!("SKILL.md frontmatter missing required 'name' field"));
    }
    if frontmatter.description.trim().is_empty() {
        return Err(anyhow!("SKILL.md frontmatter missing required 'description' field"));
    }

    Ok(frontmatter)
}

/// Where a skill's version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrigin {
    /// The `version` field of `SKILL.md`
    Descriptor,
    /// The tag the repository was retrieved at
    Tag,
    /// Recorded without a known origin
    None,
}

/// A version together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredVersion {
    /// Version string as written
    pub value: String,
    /// Its origin
    pub origin: VersionOrigin,
}

/// A skill found on disk.
///
/// `content_root` points into a retrieved (usually ephemeral) tree; the skill
/// is only valid while that tree exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    /// Name from the frontmatter, unmodified
    pub name: String,
    /// Description from the frontmatter
    pub description: String,
    /// Directory containing `SKILL.md`
    pub content_root: PathBuf,
    /// Declared version, if any
    pub declared_version: Option<DeclaredVersion>,
    /// Flattened frontmatter metadata
    pub metadata: Option<BTreeMap<String, String>>,
}

impl Skill {
    /// Builds a skill from a directory, or `None` when it is not a valid skill.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Option<Self> {
        let descriptor = dir.join(DESCRIPTOR_FILE);
        if !descriptor.is_file() {
            return None;
        }

        let content = match std::fs::read_to_string(&descriptor) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Skipping {}: {e}", descriptor.display());
                return None;
            }
        };

        match parse_skill_frontmatter(&content) {
            Ok(frontmatter) => Some(Self::from_frontmatter(frontmatter, dir)),
            Err(e) => {
                tracing::debug!("Skipping {}: {e:#}", descriptor.display());
                None
            }
        }
    }

    fn from_frontmatter(frontmatter: SkillFrontmatter, dir: &Path) -> Self {
        let declared_version = frontmatter.version_string().map(|value| DeclaredVersion {
            value: value.to_string(),
            origin: VersionOrigin::Descriptor,
        });
        let metadata = frontmatter.metadata_strings();

        Self {
            name: frontmatter.name.trim().to_string(),
            description: frontmatter.description.trim().to_string(),
            content_root: dir.to_path_buf(),
            declared_version,
            metadata,
        }
    }

    /// Version declared in `SKILL.md`, ignoring versions inferred from tags.
    #[must_use]
    pub fn descriptor_version(&self) -> Option<&str> {
        self.declared_version
            .as_ref()
            .filter(|v| v.origin == VersionOrigin::Descriptor)
            .map(|v| v.value.as_str())
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declared_version {
            Some(version) => write!(f, "{}@{}", self.name, version.value),
            None => write!(f, "{}", self.name),
        }
    }
}
