//! Fixture repositories containing skills.

use super::TestGit;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Renders a `SKILL.md` with the given frontmatter fields.
#[must_use]
pub fn skill_md(name: &str, description: &str, version: Option<&str>) -> String {
    let mut content = format!("---\nname: {name}\ndescription: \"{description}\"\n");
    if let Some(version) = version {
        content.push_str(&format!("version: \"{version}\"\n"));
    }
    content.push_str(&format!("---\n# {name}\n\n{description}\n"));
    content
}

/// A local git repository of skills, reachable through a `file://` URL.
///
/// ```rust,no_run
/// use skillpm_cli::test_utils::SkillRepoFixture;
///
/// # fn example() -> anyhow::Result<()> {
/// let repo = SkillRepoFixture::new()?;
/// repo.add_skill("skills/release-notes", "release-notes", "Drafts release notes", None)?;
/// let sha = repo.commit("Add release-notes")?;
/// let url = repo.url();
/// # Ok(())
/// # }
/// ```
pub struct SkillRepoFixture {
    _temp: TempDir,
    path: PathBuf,
    git: TestGit,
}

impl SkillRepoFixture {
    /// Creates and initializes an empty repository on branch `main`.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create fixture directory")?;
        let path = temp.path().join("repo");
        std::fs::create_dir_all(&path)?;

        let git = TestGit::new(&path);
        git.init()?;
        git.config_user()?;

        Ok(Self {
            _temp: temp,
            path,
            git,
        })
    }

    /// Writes `<dir>/SKILL.md` plus a body file.
    pub fn add_skill(
        &self,
        dir: &str,
        name: &str,
        description: &str,
        version: Option<&str>,
    ) -> Result<PathBuf> {
        let skill_dir = self.path.join(dir);
        std::fs::create_dir_all(&skill_dir)?;
        std::fs::write(skill_dir.join("SKILL.md"), skill_md(name, description, version))?;
        Ok(skill_dir)
    }

    /// Writes an arbitrary file relative to the repository root.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.path.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Stages everything, commits, and returns the new HEAD SHA.
    pub fn commit(&self, message: &str) -> Result<String> {
        self.git.add_all()?;
        self.git.commit(message)?;
        self.git.rev_parse_head()
    }

    /// Tags HEAD.
    pub fn tag(&self, tag: &str) -> Result<()> {
        self.git.tag(tag)
    }

    /// `file://` URL of the repository.
    #[must_use]
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    /// Path of the working tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying git helper.
    #[must_use]
    pub fn git(&self) -> &TestGit {
        &self.git
    }
}
