//! Directory creation, filtered copying and removal.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parents if needed.
///
/// # Errors
///
/// Fails when the directory cannot be created or when the path exists but is
/// not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).with_context(|| {
            format!(
                "Failed to create directory: {}\n\nCheck directory permissions and path validity",
                path.display()
            )
        })?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Recursively copies `src` into `dst`, skipping entries rejected by `include`.
///
/// `include` receives each entry's file name and whether it is a directory;
/// returning `false` skips the entry (and for directories, everything below
/// it). Existing files in `dst` are overwritten. Symlinks and other special
/// files are not copied.
///
/// # Examples
///
/// ```rust,no_run
/// use skillpm_cli::utils::fs::copy_dir_filtered;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// // Copy everything except hidden entries
/// let copied = copy_dir_filtered(Path::new("src"), Path::new("dst"), &|name, _| !name.starts_with('.'))?;
/// println!("{copied} files copied");
/// # Ok(())
/// # }
/// ```
pub fn copy_dir_filtered(
    src: &Path,
    dst: &Path,
    include: &dyn Fn(&str, bool) -> bool,
) -> Result<usize> {
    ensure_dir(dst)?;
    let mut copied = 0;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let name = entry.file_name();
        let name = name.to_string_lossy();

        if !include(&name, file_type.is_dir()) {
            tracing::trace!("Skipping {}", entry.path().display());
            continue;
        }

        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copied += copy_dir_filtered(&src_path, &dst_path, include)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!("Failed to copy file from {} to {}", src_path.display(), dst_path.display())
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Recursively removes a directory; a missing directory is not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}
