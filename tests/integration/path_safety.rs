use anyhow::Result;

use crate::common::{FileAssert, SkillRepoFixture, TestProject, skill_entry};

fn hostile_repo() -> Result<SkillRepoFixture> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/good", "good", "Harmless", None)?;
    repo.add_skill("skills/evil", "../escape", "Tries to leave the skills directory", None)?;
    repo.commit("init")?;
    Ok(repo)
}

#[test]
fn test_traversal_name_is_never_written() -> Result<()> {
    let repo = hostile_repo()?;
    let project = TestProject::new()?;
    let manifest =
        skill_entry(&repo.url(), "good", None) + &skill_entry(&repo.url(), "../escape", None);
    project.write_manifest(&manifest)?;

    project
        .run_skillpm(&["install"])?
        .assert_failure()
        .assert_stdout_contains("Path traversal")
        .assert_stderr_contains("1 of 2 install(s) failed");

    let skills_dir = project.project_path().join(".claude/skills");
    FileAssert::exists(skills_dir.join("good/SKILL.md"));
    FileAssert::not_exists(project.project_path().join(".claude/escape"));
    FileAssert::not_exists(skills_dir.join("escape"));
    FileAssert::not_exists(project.lockfile_path());
    assert_eq!(project.leftover_checkouts(), 0);
    Ok(())
}

#[test]
fn test_add_isolates_hostile_skill() -> Result<()> {
    let repo = hostile_repo()?;
    let project = TestProject::new()?;

    project.run_skillpm(&["add", &repo.url()])?.assert_failure();

    FileAssert::exists(project.project_path().join(".claude/skills/good/SKILL.md"));
    FileAssert::not_exists(project.project_path().join(".claude/escape"));
    Ok(())
}
