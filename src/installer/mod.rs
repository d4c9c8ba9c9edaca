//! Skill installation into agent skill directories.
//!
//! Installing a skill means copying its directory to `<base>/<name>`, where
//! `<base>` is an agent's skills directory and `<name>` is the skill's name made
//! safe for the filesystem.
//!
//! # Safety
//!
//! The destination goes through [`resolve_install_path`] before anything is
//! written: names that try to traverse (`../x`, `a/b`, `a\b`, NUL) are rejected
//! and the sanitized result must stay inside `<base>`.
//!
//! # Copy Rules
//!
//! - An existing install at the destination is replaced, so reinstalling is
//!   idempotent.
//! - `README.md`, `metadata.json`, VCS metadata and any entry whose name starts
//!   with `_` are not copied, at any depth.
//!
//! # Failure Isolation
//!
//! Each (skill, target) pair reports its own [`InstallResult`]. A failing pair
//! never stops the remaining pairs; [`install_all`] collects every outcome in an
//! [`InstallReport`].
//!
//! Within one [`install_all`] run a destination directory belongs to the first
//! skill installed there. Another skill whose name sanitizes to the same
//! directory (`ab` and `a:b`, or `Alpha` and `alpha` on a case-insensitive
//! filesystem) fails instead of replacing it.

use crate::core::SkillpmError;
use crate::skills::Skill;
use crate::utils::fs::{copy_dir_filtered, remove_dir_all};
use crate::utils::security::resolve_install_path;
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File names never copied into an installed skill.
pub const EXCLUDED_FILES: &[&str] = &["README.md", "metadata.json"];

/// Directory names never copied into an installed skill.
const EXCLUDED_DIRS: &[&str] = &[".git"];

/// Whether an entry of a skill directory is part of the installed skill.
#[must_use]
pub fn is_installable(name: &str, is_dir: bool) -> bool {
    if name.starts_with('_') {
        return false;
    }
    if is_dir { !EXCLUDED_DIRS.contains(&name) } else { !EXCLUDED_FILES.contains(&name) }
}

/// Outcome of installing one skill into one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    /// Whether the skill was installed
    pub success: bool,
    /// Destination directory, or the target base when none could be computed
    pub path: String,
    /// What went wrong
    pub error: Option<String>,
}

/// Installs `skill` into `target_base`, never returning an error.
///
/// # Examples
///
/// ```rust,no_run
/// use skillpm_cli::installer::install_skill;
/// use skillpm_cli::skills::Skill;
/// use std::path::Path;
///
/// # async fn example() -> anyhow::Result<()> {
/// let skill = Skill::from_dir(Path::new("checkout/skills/release-notes")).unwrap();
/// let result = install_skill(&skill, Path::new(".claude/skills")).await;
/// assert!(result.success);
/// # Ok(())
/// # }
/// ```
pub async fn install_skill(skill: &Skill, target_base: &Path) -> InstallResult {
    let target_dir = match resolve_install_path(target_base, &skill.name) {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!("Refusing to install '{}': {e}", skill.name);
            return InstallResult {
                success: false,
                path: target_base.display().to_string(),
                error: Some(e.to_string()),
            };
        }
    };

    match copy_skill(&skill.content_root, &target_dir).await {
        Ok(files) => {
            tracing::debug!(
                "Installed '{}' ({files} files) to {}",
                skill.name,
                target_dir.display()
            );
            InstallResult {
                success: true,
                path: target_dir.display().to_string(),
                error: None,
            }
        }
        Err(e) => {
            tracing::debug!("Installing '{}' to {} failed: {e:#}", skill.name, target_dir.display());
            InstallResult {
                success: false,
                path: target_dir.display().to_string(),
                error: Some(format!("{e:#}")),
            }
        }
    }
}

/// Replaces `dest` with a filtered copy of `source`.
async fn copy_skill(source: &Path, dest: &Path) -> Result<usize> {
    if !source.is_dir() {
        return Err(anyhow::anyhow!("Skill source is not a directory: {}", source.display()));
    }

    let source = source.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<usize> {
        remove_dir_all(&dest).context(SkillpmError::FileSystemError {
            operation: "remove previous install".to_string(),
            path: dest.display().to_string(),
        })?;

        copy_dir_filtered(&source, &dest, &is_installable).context(
            SkillpmError::FileSystemError {
                operation: "copy skill files".to_string(),
                path: dest.display().to_string(),
            },
        )
    })
    .await
    .map_err(|e| anyhow::anyhow!("Task join error during skill copy: {e}"))?
}

/// A directory skills are installed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTarget {
    /// Label shown in reports, usually the agent id
    pub label: String,
    /// Skills directory
    pub base: PathBuf,
}

impl InstallTarget {
    /// Creates a target.
    pub fn new(label: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            base: base.into(),
        }
    }
}

/// One (skill, target) pair and its result.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
    /// Skill name
    pub skill: String,
    /// Target label
    pub target: String,
    /// Result of the pair
    pub result: InstallResult,
}

/// Results of an install run.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    /// Every pair, in install order
    pub outcomes: Vec<InstallOutcome>,
}

impl InstallReport {
    /// Pairs that succeeded.
    pub fn succeeded(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| o.result.success)
    }

    /// Pairs that failed.
    pub fn failed(&self) -> impl Iterator<Item = &InstallOutcome> {
        self.outcomes.iter().filter(|o| !o.result.success)
    }

    /// Whether every pair succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.success)
    }
}

/// Installs every skill into every target, one pair at a time.
///
/// A pair whose destination was already taken by a different skill earlier in
/// the run fails without touching the filesystem.
pub async fn install_all(skills: &[&Skill], targets: &[InstallTarget]) -> InstallReport {
    let mut report = InstallReport::default();
    let mut claimed: HashMap<String, &Skill> = HashMap::new();
    for skill in skills {
        for target in targets {
            let result = match claim_destination(&mut claimed, skill, &target.base) {
                Some(conflict) => conflict,
                None => install_skill(skill, &target.base).await,
            };
            report.outcomes.push(InstallOutcome {
                skill: skill.name.clone(),
                target: target.label.clone(),
                result,
            });
        }
    }
    report
}

/// Records `skill` as the owner of its destination under `base`, returning a
/// failed result when another skill already owns it.
///
/// Names that fail path resolution are left to [`install_skill`] to report.
fn claim_destination<'a>(
    claimed: &mut HashMap<String, &'a Skill>,
    skill: &'a Skill,
    base: &Path,
) -> Option<InstallResult> {
    let dest = resolve_install_path(base, &skill.name).ok()?;
    // Case-folded so the check holds on case-insensitive filesystems too
    let key = dest.to_string_lossy().to_lowercase();

    match claimed.get(&key) {
        Some(owner) if owner.content_root != skill.content_root => {
            tracing::warn!(
                "Not installing '{}': '{}' is already installed at {}",
                skill.name,
                owner.name,
                dest.display()
            );
            Some(InstallResult {
                success: false,
                path: dest.display().to_string(),
                error: Some(format!(
                    "Skill '{}' resolves to the same directory as '{}', which was installed there first",
                    skill.name, owner.name
                )),
            })
        }
        Some(_) => None,
        None => {
            claimed.insert(key, skill);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::skill_md;
    use tempfile::TempDir;

    fn make_skill(root: &Path, dir: &str, name: &str) -> Skill {
        let path = root.join(dir);
        std::fs::create_dir_all(path.join("references")).unwrap();
        std::fs::write(path.join("SKILL.md"), skill_md(name, "test", None)).unwrap();
        std::fs::write(path.join("README.md"), "repo docs").unwrap();
        std::fs::write(path.join("metadata.json"), "{}").unwrap();
        std::fs::write(path.join("_sections.md"), "template").unwrap();
        std::fs::write(path.join("references/guide.md"), "guide").unwrap();
        Skill::from_dir(&path).unwrap()
    }

    #[test]
    fn test_is_installable() {
        assert!(is_installable("SKILL.md", false));
        assert!(is_installable("scripts", true));
        assert!(!is_installable("README.md", false));
        assert!(!is_installable("metadata.json", false));
        assert!(!is_installable("_partial.md", false));
        assert!(!is_installable("_templates", true));
        assert!(!is_installable(".git", true));
    }

    #[tokio::test]
    async fn test_install_copies_filtered_content() {
        let source = TempDir::new().unwrap();
        let skill = make_skill(source.path(), "skills/release-notes", "release-notes");
        let target = TempDir::new().unwrap();

        let result = install_skill(&skill, target.path()).await;
        assert!(result.success, "{:?}", result.error);

        let installed = target.path().join("release-notes");
        assert_eq!(result.path, installed.display().to_string());
        assert!(installed.join("SKILL.md").exists());
        assert!(installed.join("references/guide.md").exists());
        assert!(!installed.join("README.md").exists());
        assert!(!installed.join("metadata.json").exists());
        assert!(!installed.join("_sections.md").exists());
    }

    #[tokio::test]
    async fn test_reinstall_overwrites() {
        let source = TempDir::new().unwrap();
        let skill = make_skill(source.path(), "alpha", "alpha");
        let target = TempDir::new().unwrap();
        let stale = target.path().join("alpha/stale.txt");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "old").unwrap();

        assert!(install_skill(&skill, target.path()).await.success);
        assert!(install_skill(&skill, target.path()).await.success);
        assert!(!stale.exists());
        assert!(target.path().join("alpha/SKILL.md").exists());
    }

    #[tokio::test]
    async fn test_traversal_names_are_rejected_without_writes() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let base = target.path().join("skills");

        for name in ["../escape", "..\\escape", "/etc/evil", "a\0b", ".."] {
            let mut skill = make_skill(source.path(), "evil", "evil");
            skill.name = name.to_string();

            let result = install_skill(&skill, &base).await;
            assert!(!result.success, "{name:?} should be rejected");
            assert!(result.error.unwrap().contains("Path traversal"));
        }
        assert!(!base.exists());
        assert!(!target.path().join("escape").exists());
    }

    #[tokio::test]
    async fn test_install_all_isolates_failures() {
        let source = TempDir::new().unwrap();
        let good = make_skill(source.path(), "good", "good");
        let mut missing = make_skill(source.path(), "gone", "gone");
        missing.content_root = source.path().join("does-not-exist");

        let target = TempDir::new().unwrap();
        let targets = vec![
            InstallTarget::new("claude-code", target.path().join(".claude/skills")),
            InstallTarget::new("cursor", target.path().join(".cursor/skills")),
        ];

        let report = install_all(&[&missing, &good], &targets).await;
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.failed().count(), 2);
        assert_eq!(report.succeeded().count(), 2);
        assert!(!report.all_succeeded());
        assert!(target.path().join(".cursor/skills/good/SKILL.md").exists());
    }

    #[tokio::test]
    async fn test_install_all_rejects_colliding_destinations() {
        let source = TempDir::new().unwrap();
        let first = make_skill(source.path(), "first", "ab");
        let second = make_skill(source.path(), "second", "a:b");
        std::fs::write(second.content_root.join("SKILL.md"), skill_md("a:b", "second", None))
            .unwrap();

        let target = TempDir::new().unwrap();
        let targets = vec![InstallTarget::new("claude-code", target.path().join("skills"))];

        let report = install_all(&[&first, &second], &targets).await;
        let results: Vec<_> =
            report.outcomes.iter().map(|o| (o.skill.as_str(), o.result.success)).collect();
        assert_eq!(results, vec![("ab", true), ("a:b", false)]);

        let error = report.outcomes[1].result.error.as_deref().unwrap();
        assert!(error.contains("same directory as 'ab'"), "{error}");
        let installed = std::fs::read_to_string(target.path().join("skills/ab/SKILL.md")).unwrap();
        assert!(!installed.contains("second"), "first install was overwritten: {installed}");
    }

    #[tokio::test]
    async fn test_install_all_rejects_case_variants() {
        let source = TempDir::new().unwrap();
        let upper = make_skill(source.path(), "upper", "Alpha");
        let lower = make_skill(source.path(), "lower", "alpha");

        let target = TempDir::new().unwrap();
        let targets = vec![InstallTarget::new("claude-code", target.path().join("skills"))];

        let report = install_all(&[&upper, &lower], &targets).await;
        assert!(report.outcomes[0].result.success);
        assert!(!report.outcomes[1].result.success);
    }

    #[tokio::test]
    async fn test_copy_failure_is_filesystem_error() {
        let source = TempDir::new().unwrap();
        let skill = make_skill(source.path(), "alpha", "alpha");
        let target = TempDir::new().unwrap();
        // The base is a regular file, so the skill directory cannot be created
        let base = target.path().join("not-a-dir");
        std::fs::write(&base, "file").unwrap();

        let result = install_skill(&skill, &base).await;
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.starts_with("Failed to copy skill files"), "{error}");

        let err = copy_skill(&skill.content_root, &base.join("alpha")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkillpmError>(),
            Some(SkillpmError::FileSystemError { operation, .. }) if operation == "copy skill files"
        ));
    }
}
