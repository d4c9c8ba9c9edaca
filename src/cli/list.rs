//! Show the skills a source provides without installing them.
//!
//! # Examples
//!
//! ```bash
//! skillpm list acme/tools
//! skillpm list acme/tools --version 1.2.0
//! skillpm list acme/tools --json | jq '.[].name'
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{AppContext, check_version_arg};
use crate::resolver::{FetchedSource, ResolveWarning, RevisionRequest};

/// Arguments of `skillpm list`.
#[derive(Args, Debug, Default)]
pub struct ListCommand {
    /// Shorthand (`owner/repo[/path]`), web URL or git URL
    source: String,

    /// Version to inspect; matched against `v<version>` and `<version>` tags
    #[arg(long)]
    version: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// One row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ListItem {
    name: String,
    description: String,
    version: Option<String>,
    path: String,
}

impl ListCommand {
    /// Runs the command.
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        check_version_arg(self.version.as_deref())?;
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

        let items = list_items(&fetched, &request);
        if self.json {
            output_json(&items, &fetched.resolution.resolved_revision)?;
        } else {
            output_table(&items, &fetched);
        }
        Ok(())
    }
}

fn list_items(fetched: &FetchedSource, request: &RevisionRequest) -> Vec<ListItem> {
    let tag_version = match request {
        RevisionRequest::Version(v) if fetched.resolution.matched_ref.is_some() => Some(v.as_str()),
        _ => None,
    };
    let root = fetched.resolution.content_root();

    fetched
        .skills
        .iter()
        .map(|skill| ListItem {
            name: skill.name.clone(),
            description: skill.description.clone(),
            version: skill.descriptor_version().or(tag_version).map(str::to_string),
            path: skill
                .content_root
                .strip_prefix(root)
                .map_or_else(|_| skill.content_root.display().to_string(), |p| {
                    p.to_string_lossy().replace('\\', "/")
                }),
        })
        .collect()
}

fn output_table(items: &[ListItem], fetched: &FetchedSource) {
    println!(
        "{} {} ({})\n",
        "Skills in".cyan().bold(),
        fetched.spec,
        fetched.resolution.resolved_revision.get(..7).unwrap_or_default()
    );

    if items.is_empty() {
        println!("No skills found");
        return;
    }

    for item in items {
        let version = item.version.as_deref().unwrap_or("-");
        println!("  {} {}", item.name.bold(), version.dimmed());
        if !item.description.is_empty() {
            println!("    {}", item.description);
        }
    }
    println!("\n{}: {} skill(s)", "Total".green().bold(), items.len());
}

fn output_json(items: &[ListItem], revision: &str) -> Result<()> {
    let json_items: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            let mut obj = serde_json::json!({
                "name": item.name,
                "description": item.description,
                "path": item.path,
                "revision": revision,
            });
            if let Some(ref version) = item.version {
                obj["version"] = serde_json::Value::String(version.clone());
            }
            obj
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json_items)?);
    Ok(())
}
