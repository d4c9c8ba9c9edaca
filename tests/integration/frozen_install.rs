use anyhow::Result;

use crate::common::{FileAssert, SkillRepoFixture, TestProject, skill_entry};

#[test]
fn test_frozen_install_reproduces_locked_revision() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "Original", None)?;
    repo.commit("first")?;

    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "alpha", None))?;
    project.run_skillpm(&["install"])?.assert_success();
    let locked = project.read_lockfile()?;

    repo.add_skill("skills/alpha", "alpha", "Rewritten", Some("2.0.0"))?;
    repo.commit("second")?;

    project.run_skillpm(&["install", "--frozen"])?.assert_success();

    let installed = project.project_path().join(".claude/skills/alpha/SKILL.md");
    FileAssert::contains(&installed, "Original");
    assert_eq!(project.read_lockfile()?, locked, "frozen installs never rewrite the lockfile");

    // A regular install moves to the new head
    project.run_skillpm(&["install"])?.assert_success();
    FileAssert::contains(&installed, "Rewritten");
    assert_ne!(project.read_lockfile()?, locked);
    Ok(())
}

#[test]
fn test_frozen_install_requires_every_entry_locked() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    repo.add_skill("skills/beta", "beta", "Second", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "alpha", None))?;
    project.run_skillpm(&["install"])?.assert_success();

    let manifest = skill_entry(&repo.url(), "alpha", None) + &skill_entry(&repo.url(), "beta", None);
    project.write_manifest(&manifest)?;

    project
        .run_skillpm(&["install", "--frozen"])?
        .assert_failure()
        .assert_stderr_contains("Skill 'beta'")
        .assert_stderr_contains("not recorded in the lockfile");
    FileAssert::not_exists(project.project_path().join(".claude/skills/beta"));
    Ok(())
}

#[test]
fn test_frozen_install_without_lockfile_fails() -> Result<()> {
    let project = TestProject::new()?;
    project.write_manifest(&skill_entry("acme/tools", "alpha", None))?;

    project
        .run_skillpm(&["install", "--frozen"])?
        .assert_failure()
        .assert_stderr_contains("not recorded in the lockfile");
    FileAssert::not_exists(project.lockfile_path());
    Ok(())
}

#[test]
fn test_no_lock_skips_lockfile() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "alpha", None))?;

    project.run_skillpm(&["install", "--no-lock"])?.assert_success();
    FileAssert::exists(project.project_path().join(".claude/skills/alpha/SKILL.md"));
    FileAssert::not_exists(project.lockfile_path());
    Ok(())
}

#[test]
fn test_frozen_install_rejects_tampered_lockfile() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "alpha", None))?;

    let marker = project.tmp_path().join("tampered-marker");
    let lockfile = format!(
        "lockVersion = 1\n\n[[skills]]\nsource = \"{}\"\nname = \"alpha\"\nversion = \"latest\"\n\
         resolvedRef = \"--upload-pack=touch {} ;git-upload-pack\"\n\
         installedAt = \"2026-10-17T09:30:00Z\"\n",
        repo.url(),
        marker.display()
    );
    std::fs::write(project.lockfile_path(), lockfile)?;

    project
        .run_skillpm(&["install", "--frozen"])?
        .assert_failure()
        .assert_stderr_contains("not a full commit SHA");
    assert!(!marker.exists(), "lockfile content must never reach git as an option");
    FileAssert::not_exists(project.project_path().join(".claude/skills/alpha"));
    Ok(())
}
