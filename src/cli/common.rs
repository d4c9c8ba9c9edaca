//! Shared state and output helpers for CLI commands.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::CliConfig;
use crate::config::{AgentRegistry, GlobalConfig, InstallScope, RuntimeConfig};
use crate::installer::{InstallReport, InstallTarget};
use crate::lockfile::{LockFile, lockfile_path_for};
use crate::core::SkillpmError;
use crate::manifest::{LATEST, MANIFEST_FILE_NAME, Manifest, is_valid_version};
use crate::resolver::SkillResolver;
use crate::utils::fs::find_project_root;
use crate::utils::progress::ProgressBar;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Process context
    pub runtime: RuntimeConfig,
    /// User configuration
    pub global: GlobalConfig,
    /// Known agents, including user overrides
    pub registry: AgentRegistry,
}

impl AppContext {
    /// Builds the context from the environment and the global config file.
    ///
    /// # Errors
    ///
    /// Fails when the process context cannot be determined, the global config
    /// is invalid, or an agent override is incomplete.
    pub async fn load(config: &CliConfig) -> Result<Self> {
        let runtime = RuntimeConfig::from_env()?;
        let no_progress = runtime.no_progress || config.no_progress;
        let global =
            GlobalConfig::load_with_optional(config.config_path.clone(), &runtime.home_dir).await?;
        let registry = AgentRegistry::builtin().with_overrides(&global.agents)?;

        Ok(Self::new(runtime.with_no_progress(no_progress), global, registry))
    }

    /// Creates a context from explicit parts.
    pub const fn new(runtime: RuntimeConfig, global: GlobalConfig, registry: AgentRegistry) -> Self {
        Self {
            runtime,
            global,
            registry,
        }
    }

    /// The same context with project-scoped installs relative to `dir`.
    #[must_use]
    pub fn in_project(&self, dir: &Path) -> Self {
        let mut ctx = self.clone();
        ctx.runtime = ctx.runtime.with_cwd(dir);
        ctx
    }

    /// Skills directories for the given agents, or the configured default
    /// agents when none are given. Agents sharing a directory yield one target.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::SkillpmError::UnknownAgent`] for an unknown id.
    pub fn install_targets(&self, agents: &[String], scope: InstallScope) -> Result<Vec<InstallTarget>> {
        let ids = if agents.is_empty() { self.global.default_agents() } else { agents.to_vec() };

        let mut targets: Vec<InstallTarget> = Vec::new();
        for agent in self.registry.select(&ids)? {
            let base = agent.skills_dir(scope, &self.runtime);
            if targets.iter().any(|t| t.base == base) {
                tracing::debug!("Skipping {}: {} is already a target", agent.id, base.display());
                continue;
            }
            targets.push(InstallTarget::new(&agent.id, base));
        }
        Ok(targets)
    }

    /// A resolver using system git and this context's directories.
    #[must_use]
    pub fn resolver(&self) -> SkillResolver {
        SkillResolver::new(&self.runtime, &self.registry)
    }

    /// A spinner honoring the progress settings.
    #[must_use]
    pub fn spinner(&self) -> ProgressBar {
        ProgressBar::new_spinner(!self.runtime.no_progress)
    }
}

/// Location of the project files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Path to `skills.toml`
    pub manifest_path: PathBuf,
    /// Directory containing the manifest
    pub project_dir: PathBuf,
    /// Path to `skills.lock`
    pub lockfile_path: PathBuf,
}

impl ProjectContext {
    /// Uses `manifest_path` when given, otherwise the nearest `skills.toml` at
    /// or above `cwd`, otherwise `cwd/skills.toml`.
    #[must_use]
    pub fn locate(manifest_path: Option<PathBuf>, cwd: &Path) -> Self {
        let manifest_path = match manifest_path {
            Some(path) if path.is_absolute() => path,
            Some(path) => cwd.join(path),
            None => find_project_root(cwd)
                .unwrap_or_else(|_| cwd.to_path_buf())
                .join(MANIFEST_FILE_NAME),
        };
        let project_dir =
            manifest_path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
        let lockfile_path = lockfile_path_for(&manifest_path);

        Self {
            manifest_path,
            project_dir,
            lockfile_path,
        }
    }

    /// Loads and validates the manifest.
    pub fn load_manifest(&self) -> Result<Manifest> {
        Manifest::load(&self.manifest_path)
    }

    /// Loads the lockfile, empty when it does not exist.
    pub fn load_lockfile(&self) -> Result<LockFile> {
        LockFile::load(&self.lockfile_path)
            .with_context(|| format!("Failed to load lockfile: {}", self.lockfile_path.display()))
    }

    /// Saves the lockfile next to the manifest.
    pub fn save_lockfile(&self, lockfile: &LockFile) -> Result<()> {
        lockfile
            .save(&self.lockfile_path)
            .with_context(|| format!("Failed to save lockfile: {}", self.lockfile_path.display()))
    }
}

/// Rejects a `--version` value that is neither a semantic version nor
/// `latest`, before anything is fetched.
pub fn check_version_arg(version: Option<&str>) -> Result<()> {
    match version {
        Some(version) if !is_valid_version(version) => Err(SkillpmError::Other {
            message: format!("Invalid version '{version}': expected a semantic version or '{LATEST}'"),
        }
        .into()),
        _ => Ok(()),
    }
}

/// Prints one line per (skill, target) pair followed by a summary.
pub fn print_report(report: &InstallReport) {
    for outcome in &report.outcomes {
        if outcome.result.success {
            println!(
                "  {} {} {}",
                "✓".green(),
                outcome.skill.bold(),
                format!("→ {}", outcome.result.path).dimmed()
            );
        } else {
            println!(
                "  {} {} ({}): {}",
                "✗".red(),
                outcome.skill.bold(),
                outcome.target,
                outcome.result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let succeeded = report.succeeded().count();
    let failed = report.failed().count();
    if failed == 0 {
        println!("\n{} {succeeded} install(s) completed", "Done!".green().bold());
    } else {
        println!(
            "\n{} {succeeded} succeeded, {failed} failed",
            "Installation incomplete:".red().bold()
        );
    }
}
