use anyhow::Result;

use crate::common::{FileAssert, SkillRepoFixture, TestProject, skill_entry};

fn release_notes_repo() -> Result<(SkillRepoFixture, String)> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/release-notes", "release-notes", "Drafts release notes", Some("1.2.0"))?;
    repo.write_file("skills/release-notes/references/style.md", "# Style guide")?;
    repo.write_file("skills/release-notes/README.md", "repository docs")?;
    repo.write_file("skills/release-notes/metadata.json", "{}")?;
    repo.write_file("skills/release-notes/_template.md", "partial")?;
    let head = repo.commit("Add release-notes")?;
    Ok((repo, head))
}

/// Lockfile lines that do not depend on the time of the run
fn stable_lines(lockfile: &str) -> Vec<&str> {
    lockfile.lines().filter(|line| !line.starts_with("installedAt")).collect()
}

#[test]
fn test_install_end_to_end() -> Result<()> {
    let (repo, head) = release_notes_repo()?;
    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "release-notes", None))?;

    project
        .run_skillpm(&["install"])?
        .assert_success()
        .assert_stdout_contains("release-notes");

    let installed = project.project_path().join(".claude/skills/release-notes");
    FileAssert::contains(installed.join("SKILL.md"), "name: release-notes");
    FileAssert::exists(installed.join("references/style.md"));
    FileAssert::not_exists(installed.join("README.md"));
    FileAssert::not_exists(installed.join("metadata.json"));
    FileAssert::not_exists(installed.join("_template.md"));

    let lockfile = project.read_lockfile()?;
    assert!(lockfile.starts_with("# Auto-generated lockfile"));
    assert!(lockfile.contains("lockVersion = 1"));
    assert!(lockfile.contains("name = \"release-notes\""));
    assert!(lockfile.contains("version = \"1.2.0\""));
    assert!(lockfile.contains(&format!("resolvedRef = \"{head}\"")));
    assert!(lockfile.contains("installedAt = "));

    assert_eq!(project.leftover_checkouts(), 0, "checkouts must be removed");
    Ok(())
}

#[test]
fn test_install_into_several_agents_and_global_scope() -> Result<()> {
    let (repo, _) = release_notes_repo()?;
    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "release-notes", None))?;

    project
        .run_skillpm(&["install", "--agent", "claude-code", "--agent", "cursor"])?
        .assert_success();
    FileAssert::exists(project.project_path().join(".claude/skills/release-notes/SKILL.md"));
    FileAssert::exists(project.project_path().join(".cursor/skills/release-notes/SKILL.md"));

    project.run_skillpm(&["install", "--global", "--agent", "goose"])?.assert_success();
    FileAssert::exists(project.home_path().join(".config/goose/skills/release-notes/SKILL.md"));
    Ok(())
}

#[test]
fn test_missing_skill_aborts_without_lockfile() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/beta", "beta", "Second", None)?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    let manifest =
        skill_entry(&repo.url(), "alpha", None) + &skill_entry(&repo.url(), "nonexistent", None);
    project.write_manifest(&manifest)?;

    project
        .run_skillpm(&["install"])?
        .assert_failure()
        .assert_stderr_contains("Skill 'nonexistent' not found")
        .assert_stderr_contains("[\"alpha\", \"beta\"]");

    FileAssert::not_exists(project.lockfile_path());
    FileAssert::not_exists(project.project_path().join(".claude/skills/alpha"));
    assert_eq!(project.leftover_checkouts(), 0);
    Ok(())
}

#[test]
fn test_version_mismatch_is_a_warning() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", Some("1.0.0"))?;
    let tagged = repo.commit("release")?;
    repo.tag("v2.0.0")?;
    repo.add_skill("skills/alpha", "alpha", "Unreleased", Some("3.0.0"))?;
    repo.commit("work in progress")?;

    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "alpha", Some("2.0.0")))?;

    project
        .run_skillpm(&["install"])?
        .assert_success()
        .assert_stderr_contains("WARN")
        .assert_stderr_contains("SKILL.md declares 1.0.0");

    FileAssert::contains(project.project_path().join(".claude/skills/alpha/SKILL.md"), "First");
    let lockfile = project.read_lockfile()?;
    assert!(lockfile.contains("version = \"2.0.0\""));
    assert!(lockfile.contains(&format!("resolvedRef = \"{tagged}\"")));
    Ok(())
}

#[test]
fn test_unknown_version_falls_back_to_default_branch() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    let head = repo.commit("init")?;

    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "alpha", Some("9.9.9")))?;

    project
        .run_skillpm(&["install"])?
        .assert_success()
        .assert_stderr_contains("requested version not found, using default branch");
    assert!(project.read_lockfile()?.contains(&format!("resolvedRef = \"{head}\"")));
    Ok(())
}

#[test]
fn test_lock_entries_follow_manifest_order() -> Result<()> {
    let tools = SkillRepoFixture::new()?;
    tools.add_skill("skills/alpha", "alpha", "First", None)?;
    tools.add_skill("skills/beta", "beta", "Second", None)?;
    tools.commit("init")?;
    let other = SkillRepoFixture::new()?;
    other.add_skill("gamma", "gamma", "Third", None)?;
    other.commit("init")?;

    let project = TestProject::new()?;
    let manifest = skill_entry(&tools.url(), "beta", None)
        + &skill_entry(&other.url(), "gamma", None)
        + &skill_entry(&tools.url(), "alpha", Some("latest"));
    project.write_manifest(&manifest)?;

    project.run_skillpm(&["install"])?.assert_success();

    let lockfile = project.read_lockfile()?;
    let names: Vec<&str> = lockfile
        .lines()
        .filter_map(|line| line.strip_prefix("name = "))
        .map(|name| name.trim_matches('"'))
        .collect();
    assert_eq!(names, vec!["beta", "gamma", "alpha"]);
    Ok(())
}

#[test]
fn test_reinstall_is_deterministic() -> Result<()> {
    let (repo, _) = release_notes_repo()?;
    let project = TestProject::new()?;
    project.write_manifest(&skill_entry(&repo.url(), "release-notes", None))?;

    project.run_skillpm(&["install"])?.assert_success();
    let first = project.read_lockfile()?;
    let skill_md = project.project_path().join(".claude/skills/release-notes/SKILL.md");
    let first_content = std::fs::read_to_string(&skill_md)?;

    project.run_skillpm(&["install"])?.assert_success();
    let second = project.read_lockfile()?;

    assert_eq!(stable_lines(&first), stable_lines(&second));
    assert_eq!(std::fs::read_to_string(&skill_md)?, first_content);
    Ok(())
}

#[test]
fn test_invalid_manifests_are_rejected() -> Result<()> {
    let project = TestProject::new()?;

    let duplicated = skill_entry("acme/tools", "alpha", None)
        + &skill_entry("ACME/tools", "Alpha", Some("1.0.0"));
    project.write_manifest(&duplicated)?;
    project
        .run_skillpm(&["install"])?
        .assert_failure()
        .assert_stderr_contains("listed twice")
        .assert_stderr_contains("#1 and #2");

    project.write_manifest(&skill_entry("acme/tools", "alpha", Some("main")))?;
    project
        .run_skillpm(&["install"])?
        .assert_failure()
        .assert_stderr_contains("Invalid manifest entry #1");

    project.write_manifest("")?;
    project.run_skillpm(&["install"])?.assert_failure().assert_stderr_contains("no skills");

    FileAssert::not_exists(project.lockfile_path());
    Ok(())
}
