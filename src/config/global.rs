//! Global configuration for skillpm.
//!
//! The optional user-wide file `~/.skillpm/config.toml` (or the path in
//! `SKILLPM_CONFIG` / `--config`) chooses default install targets and can add
//! or adjust agents in the registry.
//!
//! # File Format
//!
//! ```toml
//! # Agents used when --agent is not given
//! default-agents = ["claude-code", "cursor"]
//!
//! # Move an existing agent's project directory
//! [agents.cursor]
//! project = ".cursor/team-skills"
//!
//! # Register an agent skillpm does not know about
//! [agents.zed]
//! display-name = "Zed"
//! project = ".zed/skills"
//! global = ".config/zed/skills"
//! ```
//!
//! A missing file is equivalent to an empty one.

use super::agents::DEFAULT_AGENT;
use crate::utils::fs::get_global_config_path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Per-agent overrides from the `[agents.<id>]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AgentOverride {
    /// Replacement display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Skills directory relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Skills directory relative to the home directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,
}

/// Contents of the global config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Agents to install into when none are given on the command line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_agents: Vec<String>,

    /// Agent registry additions and overrides
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub agents: BTreeMap<String, AgentOverride>,
}

impl GlobalConfig {
    /// Loads from `path` when given, otherwise from `~/.skillpm/config.toml`
    /// under `home_dir`. A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>, home_dir: &Path) -> Result<Self> {
        let path = path.unwrap_or_else(|| get_global_config_path(home_dir));
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No global config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// The configured default agents, or [`DEFAULT_AGENT`] when none are set.
    #[must_use]
    pub fn default_agents(&self) -> Vec<String> {
        if self.default_agents.is_empty() {
            vec![DEFAULT_AGENT.to_string()]
        } else {
            self.default_agents.clone()
        }
    }
}
