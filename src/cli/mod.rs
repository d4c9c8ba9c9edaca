//! Command-line interface for skillpm.
//!
//! # Commands
//!
//! - `install` - install every skill declared in `skills.toml` and write `skills.lock`
//! - `add` - install skills straight from a source, optionally recording them
//! - `list` - show the skills a source offers without installing anything
//!
//! # Global Options
//!
//! - `-v, --verbose` / `-q, --quiet` - log level (`RUST_LOG` wins when set)
//! - `--no-progress` - disable spinners
//! - `--config <path>` - global config file (also `SKILLPM_CONFIG`)
//! - `--manifest-path <path>` - use this `skills.toml` instead of searching for one
//!
//! # Examples
//!
//! ```bash
//! skillpm install
//! skillpm install --frozen --agent claude-code --agent cursor
//! skillpm add acme/tools --skill release-notes --version 1.2.0 --save
//! skillpm list https://github.com/acme/tools/tree/main/skills --json
//! ```

mod add;
mod common;
mod install;
mod list;

pub use common::{AppContext, ProjectContext};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Top-level parser for the `skillpm` binary.
#[derive(Parser)]
#[command(
    name = "skillpm",
    about = "Install agent skills from git repositories",
    version,
    long_about = "skillpm resolves the skills declared in skills.toml against their git \
                  repositories, installs them into each agent's skills directory and \
                  records exact revisions in skills.lock."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the global config file
    #[arg(short, long, global = true, env = "SKILLPM_CONFIG")]
    config: Option<PathBuf>,

    /// Path to skills.toml
    ///
    /// By default skillpm looks for skills.toml in the current directory and
    /// its parents.
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,

    /// Disable progress spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the skills declared in skills.toml.
    ///
    /// See [`install::InstallCommand`].
    Install(install::InstallCommand),

    /// Install skills from a source without editing skills.toml, unless
    /// `--save` is given.
    ///
    /// See [`add::AddCommand`].
    Add(add::AddCommand),

    /// List the skills a source provides.
    ///
    /// See [`list::ListCommand`].
    List(list::ListCommand),
}

/// Settings derived from the global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Default log filter, used when `RUST_LOG` is not set
    pub log_level: String,
    /// Disable spinners regardless of the environment
    pub no_progress: bool,
    /// Explicit global config file
    pub config_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            no_progress: false,
            config_path: None,
        }
    }
}

impl CliConfig {
    /// Installs the global tracing subscriber writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over [`CliConfig::log_level`]. Calling this
    /// more than once is harmless.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

impl Cli {
    /// Runs the parsed command with logging configured from the flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config).await
    }

    /// Translates the global flags into a [`CliConfig`].
    ///
    /// ```rust
    /// use clap::Parser;
    /// use skillpm_cli::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["skillpm", "--verbose", "install"]);
    /// assert_eq!(cli.build_config().log_level, "debug");
    /// ```
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    /// Runs the parsed command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let ctx = AppContext::load(&config).await?;

        match self.command {
            Commands::Install(cmd) => cmd.execute(&ctx, self.manifest_path).await,
            Commands::Add(cmd) => cmd.execute(&ctx, self.manifest_path).await,
            Commands::List(cmd) => cmd.execute(&ctx).await,
        }
    }
}
