use anyhow::Result;
use predicates::prelude::*;

use crate::common::{FileAssert, SkillRepoFixture, TestProject, skill_entry};

#[test]
fn test_help_lists_commands() -> Result<()> {
    let project = TestProject::new()?;
    project
        .assert_command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"));
    Ok(())
}

#[test]
fn test_verbose_and_quiet_conflict() -> Result<()> {
    let project = TestProject::new()?;
    project
        .assert_command()
        .args(["--verbose", "--quiet", "install"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
    Ok(())
}

#[test]
fn test_missing_manifest() -> Result<()> {
    let project = TestProject::new()?;
    project
        .assert_command()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest file not found"))
        .stderr(predicate::str::contains("skills.toml"));
    Ok(())
}

#[test]
fn test_unknown_agent_suggests_closest() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&skill_entry("acme/tools", "alpha", None))?;
    project
        .assert_command()
        .args(["install", "--agent", "cursr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown agent 'cursr'"))
        .stderr(predicate::str::contains("Did you mean 'cursor'?"));
    Ok(())
}

#[test]
fn test_manifest_path_flag() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("alpha", "alpha", "First", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    let team_dir = project.project_path().join("team");
    std::fs::create_dir_all(&team_dir)?;
    std::fs::write(team_dir.join("skills.toml"), skill_entry(&repo.url(), "alpha", None))?;

    project
        .assert_command()
        .args(["--manifest-path", "team/skills.toml", "install"])
        .assert()
        .success();

    FileAssert::exists(team_dir.join(".claude/skills/alpha/SKILL.md"));
    FileAssert::exists(team_dir.join("skills.lock"));
    FileAssert::not_exists(project.project_path().join(".claude"));
    Ok(())
}

#[test]
fn test_global_config_agents() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    project.write_global_config(
        r#"
default-agents = ["team", "cursor"]

[agents.team]
display-name = "Team Agent"
project = ".team/skills"
global = ".team/skills"
"#,
    )?;
    project.write_manifest(&skill_entry(&repo.url(), "alpha", None))?;

    project.assert_command().arg("install").assert().success();

    FileAssert::exists(project.project_path().join(".team/skills/alpha/SKILL.md"));
    FileAssert::exists(project.project_path().join(".cursor/skills/alpha/SKILL.md"));
    FileAssert::not_exists(project.project_path().join(".claude"));
    Ok(())
}

#[test]
fn test_invalid_global_config() -> Result<()> {
    let project = TestProject::new()?;
    project.write_global_config("default-agents = 3")?;
    project.write_manifest(&skill_entry("acme/tools", "alpha", None))?;

    project
        .assert_command()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse global config"));
    Ok(())
}
