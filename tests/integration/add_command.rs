use anyhow::Result;

use crate::common::{FileAssert, SkillRepoFixture, TestProject};

fn two_skill_repo() -> Result<SkillRepoFixture> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    repo.add_skill("skills/beta", "beta", "Second", Some("1.0.0"))?;
    repo.commit("release")?;
    repo.tag("v1.0.0")?;
    Ok(repo)
}

#[test]
fn test_add_installs_every_skill() -> Result<()> {
    let repo = two_skill_repo()?;
    let project = TestProject::new()?;

    project.run_skillpm(&["add", &repo.url()])?.assert_success().assert_stdout_contains("alpha");

    FileAssert::exists(project.project_path().join(".claude/skills/alpha/SKILL.md"));
    FileAssert::exists(project.project_path().join(".claude/skills/beta/SKILL.md"));
    FileAssert::not_exists(project.manifest_path());
    FileAssert::not_exists(project.lockfile_path());
    assert_eq!(project.leftover_checkouts(), 0);
    Ok(())
}

#[test]
fn test_add_save_then_install() -> Result<()> {
    let repo = two_skill_repo()?;
    let project = TestProject::new()?;
    let url = repo.url();

    project
        .run_skillpm(&["add", &url, "--skill", "beta", "--version", "1.0.0", "--save"])?
        .assert_success();

    FileAssert::exists(project.project_path().join(".claude/skills/beta/SKILL.md"));
    FileAssert::not_exists(project.project_path().join(".claude/skills/alpha"));
    FileAssert::contains(project.manifest_path(), "name = \"beta\"");
    FileAssert::contains(project.manifest_path(), "version = \"1.0.0\"");

    // Saving the same skill again does not duplicate it
    project.run_skillpm(&["add", &url, "--skill", "BETA", "--save"])?.assert_success();
    let manifest = std::fs::read_to_string(project.manifest_path())?;
    assert_eq!(manifest.matches("[[skills]]").count(), 1);

    project.run_skillpm(&["install"])?.assert_success();
    FileAssert::contains(project.lockfile_path(), "version = \"1.0.0\"");
    Ok(())
}

#[test]
fn test_add_unknown_skill_lists_available() -> Result<()> {
    let repo = two_skill_repo()?;
    let project = TestProject::new()?;

    project
        .run_skillpm(&["add", &repo.url(), "--skill", "gamma", "--save"])?
        .assert_failure()
        .assert_stderr_contains("Skill 'gamma' not found")
        .assert_stderr_contains("\"alpha\", \"beta\"");
    FileAssert::not_exists(project.manifest_path());
    assert_eq!(project.leftover_checkouts(), 0);
    Ok(())
}
