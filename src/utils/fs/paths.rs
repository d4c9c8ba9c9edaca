//! Path normalization and project root discovery.

use anyhow::{Result, bail};
use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path by removing `.` and resolving `..` components.
///
/// The filesystem is never consulted, so the path does not need to exist and
/// symlinks are not followed. A `..` that would climb above the root is
/// dropped.
///
/// # Examples
///
/// ```rust
/// use skillpm_cli::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Finds the project root by walking up from `start` until a directory
/// containing `skills.toml` is found.
pub fn find_project_root(start: &Path) -> Result<PathBuf> {
    let mut current = start;
    loop {
        if current.join(crate::manifest::MANIFEST_FILE_NAME).is_file() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => bail!(
                "No {} found in {} or any parent directory",
                crate::manifest::MANIFEST_FILE_NAME,
                start.display()
            ),
        }
    }
}

/// Default location of the global config file under `home_dir`.
///
/// An explicit `--config` path (or `SKILLPM_CONFIG`, which the CLI binds to
/// it) replaces this location entirely.
#[must_use]
pub fn get_global_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".skillpm").join("config.toml")
}
