//! Locating skills inside a retrieved repository.
//!
//! Discovery runs in three stages and stops at the first that yields anything:
//!
//! 1. **Direct pointer**: the search root itself is a skill.
//! 2. **Priority locations**: immediate children of a fixed, ordered list of
//!    conventional directories (the search root, `skills/`, its curated tiers,
//!    then each agent's project skills directory).
//! 3. **Recursive fallback**: a depth-limited walk of the whole search root,
//!    skipping VCS metadata, build output and dependency caches.
//!
//! Names are unique in the result; the first occurrence wins. Children are
//! visited in file-name order, so the same tree always yields the same list.
//! Missing or unreadable directories contribute nothing and are not errors.

use super::Skill;
use crate::core::SkillpmError;
use crate::utils::security::is_within_base;
use anyhow::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Maximum depth of the recursive fallback walk, relative to the search root.
pub const MAX_RECURSION_DEPTH: usize = 5;

/// Directory names never descended into by the recursive fallback.
pub const SKIP_DIRS: &[&str] = &[".git", "node_modules", "dist", "build", "target", "__pycache__"];

/// Conventional skill directories, searched before any agent-specific ones.
const CONVENTIONAL_LOCATIONS: &[&str] =
    &["", "skills", "skills/.curated", "skills/.experimental", "skills/.system"];

/// Ordered skill search over a directory tree.
#[derive(Debug, Clone)]
pub struct SkillDiscovery {
    locations: Vec<PathBuf>,
}

impl Default for SkillDiscovery {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

impl SkillDiscovery {
    /// Builds the priority list: conventional locations followed by
    /// `agent_dirs` (each agent's project skills directory), deduplicated.
    pub fn new<I, P>(agent_dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut locations: Vec<PathBuf> = Vec::new();
        let conventional = CONVENTIONAL_LOCATIONS.iter().map(PathBuf::from);
        let agents = agent_dirs.into_iter().map(|p| p.as_ref().to_path_buf());

        for location in conventional.chain(agents) {
            if !locations.contains(&location) {
                locations.push(location);
            }
        }

        Self {
            locations,
        }
    }

    /// The priority locations, in search order.
    #[must_use]
    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    /// Discovers skills under `root/subpath` on a blocking thread.
    pub async fn discover(&self, root: &Path, subpath: Option<&str>) -> Result<Vec<Skill>> {
        let this = self.clone();
        let root = root.to_path_buf();
        let subpath = subpath.map(str::to_string);

        tokio::task::spawn_blocking(move || this.discover_blocking(&root, subpath.as_deref()))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error during skill discovery: {e}"))?
    }

    /// Synchronous discovery.
    ///
    /// # Errors
    ///
    /// Returns [`SkillpmError::PathTraversal`] when `subpath` points outside
    /// `root`. A subpath that does not exist simply yields no skills.
    pub fn discover_blocking(&self, root: &Path, subpath: Option<&str>) -> Result<Vec<Skill>> {
        let search_root = match subpath {
            Some(sub) => {
                let joined = root.join(sub);
                if !is_within_base(root, &joined) {
                    return Err(SkillpmError::PathTraversal {
                        name: sub.to_string(),
                        path: root.display().to_string(),
                    }
                    .into());
                }
                joined
            }
            None => root.to_path_buf(),
        };

        if let Some(skill) = Skill::from_dir(&search_root) {
            tracing::debug!("{} is itself a skill", search_root.display());
            return Ok(vec![skill]);
        }

        let mut found = SkillSet::default();
        for location in &self.locations {
            for child in sorted_child_dirs(&search_root.join(location)) {
                if let Some(skill) = Skill::from_dir(&child) {
                    found.insert(skill);
                }
            }
        }

        if found.is_empty() {
            tracing::debug!(
                "No skills in priority locations of {}, walking up to depth {}",
                search_root.display(),
                MAX_RECURSION_DEPTH
            );
            for dir in walk_dirs(&search_root) {
                if let Some(skill) = Skill::from_dir(&dir) {
                    found.insert(skill);
                }
            }
        }

        let skills = found.into_vec();
        tracing::debug!("Discovered {} skill(s) under {}", skills.len(), search_root.display());
        Ok(skills)
    }
}

/// Discovers skills with the conventional locations only.
pub async fn discover(root: &Path, subpath: Option<&str>) -> Result<Vec<Skill>> {
    SkillDiscovery::default().discover(root, subpath).await
}

/// Insertion-ordered, first-wins set of skills keyed by case-folded name, the
/// same comparison manifest entries use to look skills up.
#[derive(Default)]
struct SkillSet {
    seen: HashSet<String>,
    skills: Vec<Skill>,
}

impl SkillSet {
    fn insert(&mut self, skill: Skill) {
        if self.seen.insert(skill.name.to_ascii_lowercase()) {
            self.skills.push(skill);
        } else {
            tracing::trace!(
                "Ignoring duplicate skill '{}' at {}",
                skill.name,
                skill.content_root.display()
            );
        }
    }

    fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    fn into_vec(self) -> Vec<Skill> {
        self.skills
    }
}

/// Immediate subdirectories sorted by name; unreadable means none.
fn sorted_child_dirs(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut children: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    children.sort();
    children
}

/// Every directory under `root` (inclusive) up to the depth limit, skipping
/// [`SKIP_DIRS`], in sorted pre-order.
fn walk_dirs(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .max_depth(MAX_RECURSION_DEPTH)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && SKIP_DIRS.contains(&entry.file_name().to_string_lossy().as_ref()))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect()
}
