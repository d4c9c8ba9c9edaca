//! Install skills straight from a source.
//!
//! The source is normalized, retrieved at the requested version (or its
//! default branch) and searched for skills. Selected skills, or all of them
//! when none are selected, are installed into each agent's skills directory.
//! With `--save` the installed skills are appended to `skills.toml`.
//!
//! # Examples
//!
//! ```bash
//! skillpm add acme/tools                                   # every skill in the repo
//! skillpm add acme/tools --skill release-notes --save      # one skill, recorded
//! skillpm add https://github.com/acme/tools/tree/main/skills/release-notes --global
//! ```

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{AppContext, ProjectContext, check_version_arg, print_report};
use crate::config::InstallScope;
use crate::core::SkillpmError;
use crate::installer::install_all;
use crate::manifest::{Manifest, ManifestEntry};
use crate::resolver::{FetchedSource, ResolveWarning, RevisionRequest};
use crate::skills::Skill;
use crate::source::is_valid_source;

/// Arguments of `skillpm add`.
#[derive(Args, Debug, Default)]
pub struct AddCommand {
    /// Shorthand (`owner/repo[/path]`), web URL or git URL
    source: String,

    /// Skill to install (repeatable; defaults to every skill found)
    #[arg(short, long = "skill", value_name = "NAME")]
    skills: Vec<String>,

    /// Version to install; matched against `v<version>` and `<version>` tags
    #[arg(long)]
    version: Option<String>,

    /// Agent to install for (repeatable; defaults to the configured agents)
    #[arg(short, long = "agent", value_name = "ID")]
    agents: Vec<String>,

    /// Install into user-level skills directories instead of the project
    #[arg(short, long)]
    global: bool,

    /// Record the installed skills in skills.toml
    #[arg(long)]
    save: bool,
}

impl AddCommand {
    /// Runs the command.
    pub async fn execute(self, ctx: &AppContext, manifest_path: Option<PathBuf>) -> Result<()> {
        check_version_arg(self.version.as_deref())?;
        if self.save && !is_valid_source(&self.source) {
            return Err(SkillpmError::Other {
                message: format!(
                    "Cannot save '{}' to skills.toml: expected owner/repo or a repository URL",
                    self.source
                ),
            }
            .into());
        }

        let project = ProjectContext::locate(manifest_path, &ctx.runtime.cwd);
        let scope = if self.global { InstallScope::Global } else { InstallScope::Project };
        let targets = ctx.install_targets(&self.agents, scope)?;
        crate::git::ensure_git_available()?;

        let request = RevisionRequest::from_version(self.version.as_deref());
        let spinner = ctx.spinner();
        let resolver = ctx.resolver().with_progress(spinner.clone());
        let fetched = resolver.fetch_source(&self.source, &request).await;
        spinner.finish_and_clear();
        let fetched = fetched?;

        if let RevisionRequest::Version(requested) = &request
            && fetched.resolution.matched_ref.is_none()
        {
            let warning = ResolveWarning::VersionNotFound {
                source: self.source.clone(),
                requested: requested.clone(),
            };
            tracing::warn!("{warning}");
        }

        let selected = self.select(&fetched)?;
        println!(
            "{} {} skill(s) from {} at {}",
            "Installing".cyan().bold(),
            selected.len(),
            fetched.spec,
            short_revision(&fetched.resolution.resolved_revision)
        );
        let report = install_all(&selected, &targets).await;
        print_report(&report);

        let names: Vec<String> = selected.iter().map(|s| s.name.clone()).collect();
        if let Err(e) = fetched.resolution.checkout.cleanup() {
            tracing::warn!("Failed to remove checkout: {e:#}");
        }

        if !report.all_succeeded() {
            bail!("{} of {} install(s) failed", report.failed().count(), report.outcomes.len());
        }

        if self.save {
            self.save_entries(&project, &names)?;
        }
        Ok(())
    }

    /// The skills to install, in the order they were requested.
    fn select<'a>(&self, fetched: &'a FetchedSource) -> Result<Vec<&'a Skill>> {
        if fetched.skills.is_empty() {
            bail!("No skills found in {}", fetched.spec);
        }
        if self.skills.is_empty() {
            return Ok(fetched.skills.iter().collect());
        }

        let mut selected: Vec<&Skill> = Vec::with_capacity(self.skills.len());
        for name in &self.skills {
            let skill = fetched.find(name).ok_or_else(|| SkillpmError::SkillNotFound {
                name: name.clone(),
                source_url: self.source.clone(),
                available: fetched.skill_names(),
            })?;
            if !selected.iter().any(|s| s.name == skill.name) {
                selected.push(skill);
            }
        }
        Ok(selected)
    }

    fn save_entries(&self, project: &ProjectContext, names: &[String]) -> Result<()> {
        let mut manifest = if project.manifest_path.exists() {
            Manifest::load(&project.manifest_path)?
        } else {
            Manifest::new()
        };

        let version = self.version.as_ref().map(|v| v.trim().to_string());
        let mut added = 0;
        for name in names {
            if manifest.add_entry(ManifestEntry::new(self.source.trim(), name, version.clone())) {
                added += 1;
            } else {
                tracing::info!("'{name}' from {} is already in the manifest", self.source);
            }
        }

        manifest.validate()?;
        manifest.save(&project.manifest_path)?;
        println!("Added {added} skill(s) to {}", project.manifest_path.display());
        Ok(())
    }
}

fn short_revision(revision: &str) -> &str {
    revision.get(..7).unwrap_or(revision)
}
