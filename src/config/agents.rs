//! Registry of coding agents that consume skills.
//!
//! Each agent reads skills from one directory inside a project and one inside
//! the user's home directory. An installed skill `n` lands in
//! `<cwd>/<project_dir>/<n>` for project scope or `<home>/<global_dir>/<n>` for
//! user scope.
//!
//! The built-in table can be extended or overridden from the global config
//! file; see [`crate::config::GlobalConfig`].

use crate::config::RuntimeConfig;
use crate::config::global::AgentOverride;
use crate::core::SkillpmError;
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Agent used when neither the command line nor the global config names one.
pub const DEFAULT_AGENT: &str = "claude-code";

/// `(id, display name, project dir, global dir relative to home)`
const BUILTIN_AGENTS: &[(&str, &str, &str, &str)] = &[
    ("amp", "Amp", ".agents/skills", ".config/agents/skills"),
    ("antigravity", "Antigravity", ".agent/skills", ".gemini/antigravity/skills"),
    ("claude-code", "Claude Code", ".claude/skills", ".claude/skills"),
    ("codex", "Codex", ".codex/skills", ".codex/skills"),
    ("cursor", "Cursor", ".cursor/skills", ".cursor/skills"),
    ("droid", "Droid", ".factory/skills", ".factory/skills"),
    ("gemini-cli", "Gemini CLI", ".gemini/skills", ".gemini/skills"),
    ("github-copilot", "GitHub Copilot", ".github/skills", ".copilot/skills"),
    ("goose", "Goose", ".goose/skills", ".config/goose/skills"),
    ("kilo", "Kilo Code", ".kilocode/skills", ".kilocode/skills"),
    ("kiro-cli", "Kiro CLI", ".kiro/skills", ".kiro/skills"),
    ("opencode", "OpenCode", ".opencode/skill", ".config/opencode/skill"),
    ("roo", "Roo Code", ".roo/skills", ".roo/skills"),
    ("windsurf", "Windsurf", ".windsurf/skills", ".codeium/windsurf/skills"),
];

/// Whether skills are installed into the project or the user's home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallScope {
    /// `<cwd>/<project_dir>`
    #[default]
    Project,
    /// `<home>/<global_dir>`
    Global,
}

impl fmt::Display for InstallScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// Where one agent reads skills from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    /// Identifier used on the command line and in config
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Skills directory relative to the project root
    pub project_dir: PathBuf,
    /// Skills directory relative to the home directory
    pub global_dir: PathBuf,
}

impl AgentSpec {
    /// The directory skills are installed into for `scope`.
    #[must_use]
    pub fn skills_dir(&self, scope: InstallScope, config: &RuntimeConfig) -> PathBuf {
        match scope {
            InstallScope::Project => config.cwd.join(&self.project_dir),
            InstallScope::Global => config.home_dir.join(&self.global_dir),
        }
    }
}

/// Ordered lookup table of known agents.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<AgentSpec>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AgentRegistry {
    /// The built-in agents, in alphabetical order.
    #[must_use]
    pub fn builtin() -> Self {
        let agents = BUILTIN_AGENTS
            .iter()
            .map(|(id, display_name, project_dir, global_dir)| AgentSpec {
                id: (*id).to_string(),
                display_name: (*display_name).to_string(),
                project_dir: PathBuf::from(project_dir),
                global_dir: PathBuf::from(global_dir),
            })
            .collect();
        Self {
            agents,
        }
    }

    /// Applies overrides from the global config.
    ///
    /// Known agents get the provided fields replaced; unknown ids are appended
    /// and must set both `project` and `global`.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, AgentOverride>) -> Result<Self> {
        for (id, over) in overrides {
            if let Some(existing) = self.agents.iter_mut().find(|a| &a.id == id) {
                if let Some(name) = &over.display_name {
                    existing.display_name.clone_from(name);
                }
                if let Some(project) = &over.project {
                    existing.project_dir = PathBuf::from(project);
                }
                if let Some(global) = &over.global {
                    existing.global_dir = PathBuf::from(global);
                }
                continue;
            }

            let (Some(project), Some(global)) = (&over.project, &over.global) else {
                bail!("Agent '{id}' in global config must set both 'project' and 'global'");
            };
            self.agents.push(AgentSpec {
                id: id.clone(),
                display_name: over.display_name.clone().unwrap_or_else(|| id.clone()),
                project_dir: PathBuf::from(project),
                global_dir: PathBuf::from(global),
            });
        }
        Ok(self)
    }

    /// Looks up an agent by id.
    pub fn get(&self, id: &str) -> Result<&AgentSpec, SkillpmError> {
        self.agents.iter().find(|a| a.id == id).ok_or_else(|| SkillpmError::UnknownAgent {
            id: id.to_string(),
            known: self.ids().into_iter().map(str::to_string).collect(),
        })
    }

    /// Looks up several agents, failing on the first unknown id.
    pub fn select<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<&AgentSpec>, SkillpmError> {
        ids.iter().map(|id| self.get(id.as_ref())).collect()
    }

    /// All agent ids in registry order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.id.as_str()).collect()
    }

    /// Every agent's project skills directory, in registry order.
    pub fn project_dirs(&self) -> impl Iterator<Item = &Path> {
        self.agents.iter().map(|a| a.project_dir.as_path())
    }

    /// Iterates over all agents.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.agents.iter()
    }
}
