//! Configuration for skillpm
//!
//! Three layers feed a run:
//!
//! - [`RuntimeConfig`]: the process context (working directory, home directory,
//!   ephemeral root). It is built once at startup and passed explicitly to every
//!   component, so library code never consults the current directory or the
//!   system temp dir on its own.
//! - [`GlobalConfig`]: the optional user file `~/.skillpm/config.toml`.
//! - [`AgentRegistry`]: the table of agents and their skills directories,
//!   built-ins plus global config overrides.
//!
//! # Environment Variables
//!
//! - `SKILLPM_CONFIG` - path of the global config file
//! - `SKILLPM_HOME` - home directory used for user-scoped installs
//! - `SKILLPM_TMP` - root for ephemeral repository checkouts
//! - `SKILLPM_NO_PROGRESS` - disable spinners when set to anything but `0`

pub mod agents;
pub mod global;

pub use agents::{AgentRegistry, AgentSpec, DEFAULT_AGENT, InstallScope};
pub use global::{AgentOverride, GlobalConfig};

use crate::utils::platform::{get_home_dir, resolve_path};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Explicit process context threaded through every component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory project-scoped installs are relative to
    pub cwd: PathBuf,
    /// Directory user-scoped installs are relative to
    pub home_dir: PathBuf,
    /// Root under which each retrieval gets its own directory
    pub ephemeral_root: PathBuf,
    /// Suppress progress spinners
    pub no_progress: bool,
}

impl RuntimeConfig {
    /// Creates a configuration from explicit paths.
    pub fn new(
        cwd: impl Into<PathBuf>,
        home_dir: impl Into<PathBuf>,
        ephemeral_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cwd: cwd.into(),
            home_dir: home_dir.into(),
            ephemeral_root: ephemeral_root.into(),
            no_progress: false,
        }
    }

    /// Builds the configuration from the running process and its environment.
    ///
    /// # Errors
    ///
    /// Fails when the current or home directory cannot be determined, or when
    /// an override variable holds an unexpandable path.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        Self::from_vars(&cwd, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from `cwd` and a variable lookup.
    pub fn from_vars(cwd: &Path, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let home_dir = match non_empty("SKILLPM_HOME") {
            Some(home) => resolve_path(&home)?,
            None => get_home_dir()?,
        };
        let ephemeral_root = match non_empty("SKILLPM_TMP") {
            Some(tmp) => resolve_path(&tmp)?,
            None => std::env::temp_dir(),
        };
        let no_progress = non_empty("SKILLPM_NO_PROGRESS").is_some_and(|v| v.trim() != "0");

        Ok(Self {
            cwd: cwd.to_path_buf(),
            home_dir,
            ephemeral_root,
            no_progress,
        })
    }

    /// Replaces the working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Sets whether progress output is suppressed.
    #[must_use]
    pub const fn with_no_progress(mut self, no_progress: bool) -> Self {
        self.no_progress = no_progress;
        self
    }
}
