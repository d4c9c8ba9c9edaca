//! Manifest reconciliation: from `skills.toml` entries to located skills and
//! lock entries.
//!
//! # Process
//!
//! 1. Validate the entries (see [`crate::manifest`]).
//! 2. Group entries by `(source, version)` ([`groups::group_by_version`]).
//! 3. For each group, in order: resolve the revision once
//!    ([`revision::RevisionResolver`]) and discover skills once
//!    ([`crate::skills::SkillDiscovery`]) in the source's subpath.
//! 4. Match every entry of the group to a discovered skill by case-insensitive
//!    name. A missing skill aborts the whole reconciliation with
//!    [`SkillpmError::SkillNotFound`], listing what was discovered.
//! 5. Compare requested and declared versions. Differences produce
//!    [`ResolveWarning`]s, never errors; the group has already been fetched at
//!    a specific revision.
//! 6. Emit one [`LockEntry`] per entry, in manifest order.
//!
//! Frozen reconciliation ([`SkillResolver::reconcile_frozen`]) replaces steps
//! 2, 3 and 5: entries are grouped by their locked commit, that exact commit is
//! fetched, and the recorded lock entries are kept unchanged.
//!
//! Groups are processed strictly one after another. The checkouts stay alive
//! inside the returned [`Reconciliation`] so the skills can be installed from
//! them; dropping it removes every checkout.

pub mod groups;
pub mod revision;

pub use groups::{GroupMember, RetrievalGroup, group_by_lock, group_by_version};
pub use revision::{
    Checkout, GitFetcher, RepositoryFetcher, Resolution, RevisionRequest, RevisionResolver,
};

use crate::config::{AgentRegistry, RuntimeConfig};
use crate::core::SkillpmError;
use crate::lockfile::{LockEntry, LockFile};
use crate::manifest::{LATEST, ManifestEntry, validate_entries};
use crate::skills::{DeclaredVersion, Skill, SkillDiscovery, VersionOrigin};
use crate::source::{SourceSpec, normalize};
use crate::utils::progress::ProgressBar;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fmt;

/// Non-fatal findings of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// The manifest asks for one version and `SKILL.md` declares another
    VersionMismatch {
        /// Skill name
        name: String,
        /// Source string
        source: String,
        /// Version from the manifest
        requested: String,
        /// Version from `SKILL.md`
        declared: String,
    },
    /// The manifest asks for a version but `SKILL.md` declares none
    UnversionedSkill {
        /// Skill name
        name: String,
        /// Source string
        source: String,
        /// Version from the manifest
        requested: String,
    },
    /// No tag matched the requested version; the default branch was used
    VersionNotFound {
        /// Source string
        source: String,
        /// Version from the manifest
        requested: String,
    },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionMismatch {
                name,
                source,
                requested,
                declared,
            } => write!(
                f,
                "Skill '{name}' from '{source}': manifest requests version {requested} but SKILL.md declares {declared}"
            ),
            Self::UnversionedSkill {
                name,
                source,
                requested,
            } => write!(
                f,
                "Skill '{name}' from '{source}' declares no version; installing unversioned skill from source at requested ref {requested}"
            ),
            Self::VersionNotFound {
                source,
                requested,
            } => write!(
                f,
                "No tag matches version {requested} in '{source}': requested version not found, using default branch"
            ),
        }
    }
}

/// A source that has been retrieved and searched.
#[derive(Debug)]
pub struct FetchedSource {
    /// The normalized source
    pub spec: SourceSpec,
    /// The checkout the skills live in
    pub resolution: Resolution,
    /// Discovered skills, in discovery order
    pub skills: Vec<Skill>,
}

impl FetchedSource {
    /// Discovered skill names, in discovery order.
    #[must_use]
    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }
}

/// A manifest entry matched to a skill.
#[derive(Debug, Clone)]
pub struct ResolvedSkill {
    /// Zero-based manifest position
    pub position: usize,
    /// The matched skill; its content root lives in the group's checkout
    pub skill: Skill,
    /// The lock record for this entry
    pub lock: LockEntry,
}

/// One retrieval group after resolution.
#[derive(Debug)]
pub struct ResolvedGroup {
    /// Source string of the group
    pub source: String,
    /// Checkout shared by the group's skills
    pub resolution: Resolution,
    /// Matched skills, in manifest order
    pub skills: Vec<ResolvedSkill>,
}

/// Result of a reconciliation. Owns every checkout.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Resolved groups in processing order
    pub groups: Vec<ResolvedGroup>,
    /// Warnings in the order they were found
    pub warnings: Vec<ResolveWarning>,
}

impl Reconciliation {
    /// Matched skills in manifest order.
    #[must_use]
    pub fn skills(&self) -> Vec<&ResolvedSkill> {
        let mut skills: Vec<&ResolvedSkill> =
            self.groups.iter().flat_map(|g| g.skills.iter()).collect();
        skills.sort_by_key(|s| s.position);
        skills
    }

    /// Lock entries in manifest order.
    #[must_use]
    pub fn lock_entries(&self) -> Vec<LockEntry> {
        self.skills().into_iter().map(|s| s.lock.clone()).collect()
    }

    /// The lockfile describing this reconciliation.
    #[must_use]
    pub fn to_lockfile(&self) -> LockFile {
        LockFile::with_entries(self.lock_entries())
    }

    /// Removes every checkout now, logging failures.
    pub fn cleanup(self) {
        for group in self.groups {
            if let Err(e) = group.resolution.checkout.cleanup() {
                tracing::warn!("Failed to remove checkout for {}: {e:#}", group.source);
            }
        }
    }
}

/// Compares versions semantically, ignoring a leading `v`; falls back to
/// exact string comparison when either side is not a semantic version.
///
/// ```
/// use skillpm_cli::resolver::versions_equal;
///
/// assert!(versions_equal("v1.2.0", "1.2.0"));
/// assert!(!versions_equal("1.2.0", "1.2.1"));
/// assert!(versions_equal("nightly", "nightly"));
/// ```
#[must_use]
pub fn versions_equal(a: &str, b: &str) -> bool {
    let parse = |v: &str| {
        let v = v.trim();
        semver::Version::parse(v.strip_prefix(['v', 'V']).unwrap_or(v)).ok()
    };
    match (parse(a), parse(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a.trim() == b.trim(),
    }
}

/// Reconciles manifest entries against their sources.
pub struct SkillResolver<F = GitFetcher> {
    revisions: RevisionResolver<F>,
    discovery: SkillDiscovery,
    progress: Option<ProgressBar>,
}

impl SkillResolver<GitFetcher> {
    /// Resolver using system git, checkouts under the configured ephemeral
    /// root, and every registered agent's directory as a discovery location.
    #[must_use]
    pub fn new(config: &RuntimeConfig, registry: &AgentRegistry) -> Self {
        Self::with_parts(
            RevisionResolver::new(&config.ephemeral_root),
            SkillDiscovery::new(registry.project_dirs()),
        )
    }
}

impl<F: RepositoryFetcher> SkillResolver<F> {
    /// Resolver from explicit parts.
    pub const fn with_parts(revisions: RevisionResolver<F>, discovery: SkillDiscovery) -> Self {
        Self {
            revisions,
            discovery,
            progress: None,
        }
    }

    /// Reports each retrieval on `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The revision resolver in use.
    pub const fn revisions(&self) -> &RevisionResolver<F> {
        &self.revisions
    }

    /// Retrieves one source and discovers its skills.
    pub async fn fetch_source(
        &self,
        source: &str,
        request: &RevisionRequest,
    ) -> Result<FetchedSource> {
        let spec = normalize(source);
        if let Some(progress) = &self.progress {
            progress.set_message(format!("Fetching {spec} at {request}"));
        }

        let resolution = self.revisions.resolve(&spec.repository_url, request).await?;
        let skills =
            self.discovery.discover(resolution.content_root(), spec.subpath.as_deref()).await?;

        tracing::info!(
            "Found {} skill(s) in {} at {}",
            skills.len(),
            source,
            resolution.resolved_revision
        );

        Ok(FetchedSource {
            spec,
            resolution,
            skills,
        })
    }

    /// Reconciles entries by resolving each `(source, version)` group.
    ///
    /// # Errors
    ///
    /// Validation errors for malformed entries, retrieval errors for a group
    /// whose source cannot be fetched, and [`SkillpmError::SkillNotFound`] for
    /// an entry whose skill is not in its source. Any error aborts the whole
    /// reconciliation; checkouts made so far are removed.
    pub async fn reconcile(&self, entries: &[ManifestEntry]) -> Result<Reconciliation> {
        validate_nonempty(entries)?;
        validate_entries(entries)?;

        let now = Utc::now();
        let mut result = Reconciliation::default();

        for group in group_by_version(entries) {
            tracing::debug!(
                "Resolving {} ({}) for {} entr{}",
                group.source,
                group.request,
                group.len(),
                if group.len() == 1 { "y" } else { "ies" }
            );
            let fetched = self.fetch_source(&group.source, &group.request).await?;

            let requested = match &group.request {
                RevisionRequest::Version(v) => Some(v.as_str()),
                _ => None,
            };
            if let Some(requested) = requested
                && fetched.resolution.matched_ref.is_none()
            {
                push_warning(
                    &mut result.warnings,
                    ResolveWarning::VersionNotFound {
                        source: group.source.clone(),
                        requested: requested.to_string(),
                    },
                );
            }

            let mut skills = Vec::with_capacity(group.len());
            for member in &group.members {
                let mut skill = match_skill(&fetched, member.entry)?;

                if let Some(requested) = requested {
                    check_version(&mut result.warnings, member.entry, &skill, requested);
                    if skill.declared_version.is_none() && fetched.resolution.matched_ref.is_some()
                    {
                        skill.declared_version = Some(DeclaredVersion {
                            value: requested.to_string(),
                            origin: VersionOrigin::Tag,
                        });
                    }
                }

                let version = requested
                    .or_else(|| skill.descriptor_version())
                    .unwrap_or(LATEST)
                    .to_string();
                let lock = new_lock_entry(
                    member.entry,
                    version,
                    &fetched.resolution.resolved_revision,
                    now,
                );
                skills.push(ResolvedSkill {
                    position: member.position,
                    skill,
                    lock,
                });
            }

            result.groups.push(ResolvedGroup {
                source: group.source,
                resolution: fetched.resolution,
                skills,
            });
        }

        Ok(result)
    }

    /// Reconciles entries at the exact commits recorded in `lockfile`.
    ///
    /// # Errors
    ///
    /// [`SkillpmError::LockfileOutOfDate`] when an entry has no lock record,
    /// plus the errors of [`SkillResolver::reconcile`].
    pub async fn reconcile_frozen(
        &self,
        entries: &[ManifestEntry],
        lockfile: &LockFile,
    ) -> Result<Reconciliation> {
        validate_nonempty(entries)?;
        validate_entries(entries)?;

        let mut result = Reconciliation::default();

        for group in group_by_lock(entries, lockfile)? {
            tracing::debug!("Restoring {} at {}", group.source, group.request);
            let fetched = self.fetch_source(&group.source, &group.request).await?;

            let mut skills = Vec::with_capacity(group.len());
            for member in &group.members {
                let skill = match_skill(&fetched, member.entry)?;
                let lock = match member.locked {
                    Some(locked) => locked.clone(),
                    None => {
                        return Err(SkillpmError::LockfileOutOfDate {
                            name: member.entry.name.clone(),
                            source_url: member.entry.source.clone(),
                        }
                        .into());
                    }
                };
                skills.push(ResolvedSkill {
                    position: member.position,
                    skill,
                    lock,
                });
            }

            result.groups.push(ResolvedGroup {
                source: group.source,
                resolution: fetched.resolution,
                skills,
            });
        }

        Ok(result)
    }
}

fn validate_nonempty(entries: &[ManifestEntry]) -> Result<(), SkillpmError> {
    if entries.is_empty() {
        return Err(SkillpmError::ManifestValidationError {
            reason: "manifest declares no skills".to_string(),
        });
    }
    Ok(())
}

fn match_skill(fetched: &FetchedSource, entry: &ManifestEntry) -> Result<Skill, SkillpmError> {
    fetched.find(&entry.name).cloned().ok_or_else(|| SkillpmError::SkillNotFound {
        name: entry.name.clone(),
        source_url: entry.source.clone(),
        available: fetched.skill_names(),
    })
}

fn check_version(
    warnings: &mut Vec<ResolveWarning>,
    entry: &ManifestEntry,
    skill: &Skill,
    requested: &str,
) {
    match skill.descriptor_version() {
        None => push_warning(
            warnings,
            ResolveWarning::UnversionedSkill {
                name: entry.name.clone(),
                source: entry.source.clone(),
                requested: requested.to_string(),
            },
        ),
        Some(declared) if !versions_equal(requested, declared) => push_warning(
            warnings,
            ResolveWarning::VersionMismatch {
                name: entry.name.clone(),
                source: entry.source.clone(),
                requested: requested.to_string(),
                declared: declared.to_string(),
            },
        ),
        Some(_) => {}
    }
}

fn push_warning(warnings: &mut Vec<ResolveWarning>, warning: ResolveWarning) {
    tracing::warn!("{warning}");
    warnings.push(warning);
}

fn new_lock_entry(
    entry: &ManifestEntry,
    version: String,
    revision: &str,
    installed_at: DateTime<Utc>,
) -> LockEntry {
    LockEntry {
        source: entry.source.clone(),
        name: entry.name.clone(),
        version,
        resolved_ref: revision.to_string(),
        installed_at,
    }
}
