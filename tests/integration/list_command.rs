use anyhow::Result;

use crate::common::{SkillRepoFixture, TestProject};

#[test]
fn test_list_prints_skills() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/release-notes", "release-notes", "Drafts release notes", Some("1.2.0"))?;
    repo.add_skill("skills/changelog", "changelog", "Keeps a changelog", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    project
        .run_skillpm(&["list", &repo.url()])?
        .assert_success()
        .assert_stdout_contains("release-notes")
        .assert_stdout_contains("1.2.0")
        .assert_stdout_contains("Keeps a changelog")
        .assert_stdout_contains("2 skill(s)");

    // Listing installs nothing
    assert!(!project.project_path().join(".claude").exists());
    assert_eq!(project.leftover_checkouts(), 0);
    Ok(())
}

#[test]
fn test_list_json() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("skills/alpha", "alpha", "First", None)?;
    let head = repo.commit("release")?;
    repo.tag("2.0.0")?;

    let project = TestProject::new()?;
    let output = project.run_skillpm(&["list", &repo.url(), "--version", "v2.0.0", "--json"])?;
    output.assert_success();

    let items: serde_json::Value = serde_json::from_str(&output.stdout)?;
    let items = items.as_array().expect("JSON array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "alpha");
    assert_eq!(items[0]["path"], "skills/alpha");
    assert_eq!(items[0]["version"], "v2.0.0");
    assert_eq!(items[0]["revision"], head.as_str());
    Ok(())
}

#[test]
fn test_list_finds_nested_skills() -> Result<()> {
    let repo = SkillRepoFixture::new()?;
    repo.add_skill("team/alpha", "alpha", "First", None)?;
    repo.add_skill("other/beta", "beta", "Second", None)?;
    repo.commit("init")?;

    let project = TestProject::new()?;
    let output = project.run_skillpm(&["list", &repo.url(), "--json"])?;
    output.assert_success();
    let items: serde_json::Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(items.as_array().map(Vec::len), Some(2));
    Ok(())
}
