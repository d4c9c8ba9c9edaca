//! Common test utilities for skillpm integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub use skillpm_cli::test_utils::{SkillRepoFixture, skill_md};

/// An isolated project with its own home and ephemeral directories.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
    home_dir: PathBuf,
    tmp_dir: PathBuf,
    config_path: PathBuf,
}

impl TestProject {
    /// Create a new test project with default structure
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let home_dir = temp_dir.path().join("home");
        let tmp_dir = temp_dir.path().join("tmp");

        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&home_dir)?;
        fs::create_dir_all(&tmp_dir)?;

        Ok(Self {
            config_path: home_dir.join(".skillpm/config.toml"),
            _temp_dir: temp_dir,
            project_dir,
            home_dir,
            tmp_dir,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn home_path(&self) -> &Path {
        &self.home_dir
    }

    /// Root of ephemeral checkouts; empty after every run
    pub fn tmp_path(&self) -> &Path {
        &self.tmp_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_dir.join("skills.toml")
    }

    pub fn lockfile_path(&self) -> PathBuf {
        self.project_dir.join("skills.lock")
    }

    /// Write skills.toml in the project directory
    pub fn write_manifest(&self, content: &str) -> Result<()> {
        let manifest_path = self.manifest_path();
        fs::write(&manifest_path, content)
            .with_context(|| format!("Failed to write manifest to {}", manifest_path.display()))
    }

    /// Write the global config read by every run
    pub fn write_global_config(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.config_path, content)?;
        Ok(())
    }

    pub fn read_lockfile(&self) -> Result<String> {
        fs::read_to_string(self.lockfile_path()).context("Failed to read skills.lock")
    }

    /// Number of entries left under the ephemeral root
    pub fn leftover_checkouts(&self) -> usize {
        fs::read_dir(&self.tmp_dir).map(|entries| entries.count()).unwrap_or(0)
    }

    /// A `std::process::Command` for the binary, isolated to this project
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_skillpm"));
        self.isolate(&mut cmd);
        cmd
    }

    /// An `assert_cmd` command for the binary, isolated to this project
    pub fn assert_command(&self) -> assert_cmd::Command {
        assert_cmd::Command::from_std(self.command())
    }

    fn isolate(&self, cmd: &mut Command) {
        cmd.current_dir(&self.project_dir)
            .env("SKILLPM_HOME", &self.home_dir)
            .env("SKILLPM_TMP", &self.tmp_dir)
            .env("SKILLPM_CONFIG", &self.config_path)
            .env("SKILLPM_NO_PROGRESS", "1")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
    }

    /// Run skillpm in the project directory
    pub fn run_skillpm(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self.command().args(args).output().context("Failed to run skillpm")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Renders one `[[skills]]` table
pub fn skill_entry(source: &str, name: &str, version: Option<&str>) -> String {
    let mut entry = format!("[[skills]]\nsource = \"{source}\"\nname = \"{name}\"\n");
    if let Some(version) = version {
        entry.push_str(&format!("version = \"{version}\"\n"));
    }
    entry.push('\n');
    entry
}

/// Command output helper
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStdout: {}\nStderr: {}",
            self.code, self.stdout, self.stderr
        );
        self
    }

    /// Assert the command failed
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{text}'\nActual stdout: {}",
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{text}'\nActual stderr: {}",
            self.stderr
        );
        self
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file exists
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file contains specific content
    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {e}", path.display()));
        assert!(
            content.contains(expected),
            "Expected file {} to contain '{expected}'\nActual content: {content}",
            path.display()
        );
    }
}
