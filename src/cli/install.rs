//! Install the skills declared in `skills.toml`.
//!
//! # Process
//!
//! 1. Locate and load `skills.toml`.
//! 2. Reconcile every entry against its source, or with `--frozen`, against
//!    the exact revisions recorded in `skills.lock`.
//! 3. Install each matched skill into each selected agent's skills directory.
//! 4. Write `skills.lock`, unless `--frozen` or `--no-lock` was given or any
//!    install failed.
//!
//! # Examples
//!
//! ```bash
//! skillpm install
//! skillpm install --frozen                        # CI: reproduce skills.lock
//! skillpm install --global --agent cursor         # into ~/.cursor/skills
//! ```

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::common::{AppContext, ProjectContext, print_report};
use crate::config::InstallScope;
use crate::installer::install_all;

/// Arguments of `skillpm install`.
#[derive(Args, Debug, Default)]
pub struct InstallCommand {
    /// Install exactly the revisions recorded in skills.lock
    #[arg(long)]
    frozen: bool,

    /// Do not write skills.lock
    #[arg(long)]
    no_lock: bool,

    /// Install into user-level skills directories instead of the project
    #[arg(short, long)]
    global: bool,

    /// Agent to install for (repeatable; defaults to the configured agents)
    #[arg(short, long = "agent", value_name = "ID")]
    agents: Vec<String>,
}

impl InstallCommand {
    /// Runs the command.
    pub async fn execute(self, ctx: &AppContext, manifest_path: Option<PathBuf>) -> Result<()> {
        let project = ProjectContext::locate(manifest_path, &ctx.runtime.cwd);
        let manifest = project.load_manifest()?;
        let ctx = ctx.in_project(&project.project_dir);

        let scope = if self.global { InstallScope::Global } else { InstallScope::Project };
        let targets = ctx.install_targets(&self.agents, scope)?;
        crate::git::ensure_git_available()?;

        let spinner = ctx.spinner();
        spinner.set_message(format!("Resolving {} skill(s)", manifest.skills.len()));
        let resolver = ctx.resolver().with_progress(spinner.clone());

        let reconciliation = if self.frozen {
            let lockfile = project.load_lockfile()?;
            resolver.reconcile_frozen(&manifest.skills, &lockfile).await
        } else {
            resolver.reconcile(&manifest.skills).await
        };
        let reconciliation = match reconciliation {
            Ok(r) => r,
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e);
            }
        };

        spinner.set_message("Installing skills");
        let resolved = reconciliation.skills();
        let skills: Vec<_> = resolved.iter().map(|r| &r.skill).collect();
        let report = install_all(&skills, &targets).await;
        spinner.finish_and_clear();

        println!(
            "{} {} skill(s) into {} target(s)",
            "Installed".cyan().bold(),
            skills.len(),
            targets.len()
        );
        print_report(&report);

        let lockfile = reconciliation.to_lockfile();
        reconciliation.cleanup();

        if !report.all_succeeded() {
            bail!(
                "{} of {} install(s) failed; skills.lock was not updated",
                report.failed().count(),
                report.outcomes.len()
            );
        }

        if self.frozen || self.no_lock {
            tracing::debug!("Leaving {} untouched", project.lockfile_path.display());
        } else {
            project.save_lockfile(&lockfile)?;
            tracing::info!("Wrote {}", project.lockfile_path.display());
        }

        Ok(())
    }
}
