//! Ephemeral directory management with RAII cleanup.
//!
//! Every repository retrieval gets its own uniquely named directory under an
//! explicit ephemeral root. The directory is removed when the owning
//! [`EphemeralDir`] is dropped or explicitly cleaned up, but only after checking
//! that it still lies strictly inside that root.

use crate::utils::fs::dirs::ensure_dir;
use crate::utils::fs::paths::normalize_path;
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// A uniquely named directory under an ephemeral root that removes itself on drop.
///
/// # Examples
///
/// ```rust,no_run
/// use skillpm_cli::utils::fs::EphemeralDir;
///
/// # fn example() -> anyhow::Result<()> {
/// let root = std::env::temp_dir();
/// {
///     let dir = EphemeralDir::new_in(&root, "skillpm")?;
///     std::fs::write(dir.path().join("file.txt"), "temporary data")?;
///     assert!(dir.path().exists());
/// } // removed here
/// # Ok(())
/// # }
/// ```
///
/// # Cleanup Behavior
///
/// - The directory is removed recursively on drop, including during unwinding
/// - Removal is refused (and logged) when the path is not a strict descendant of
///   the root it was created under
/// - Removal failures during drop are logged at `warn` and otherwise ignored
#[derive(Debug)]
pub struct EphemeralDir {
    root: PathBuf,
    path: PathBuf,
    removed: bool,
}

impl EphemeralDir {
    /// Creates `<root>/<prefix>-<uuid>`, creating `root` as needed.
    pub fn new_in(root: &Path, prefix: &str) -> Result<Self> {
        ensure_dir(root)?;
        let path = root.join(format!("{prefix}-{}", uuid::Uuid::new_v4()));
        ensure_dir(&path)?;

        tracing::debug!("Created ephemeral directory {}", path.display());

        Ok(Self {
            root: root.to_path_buf(),
            path,
            removed: false,
        })
    }

    /// Path of the directory; it exists for as long as `self` does.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The root the directory was created under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Removes the directory now and reports failures to the caller.
    pub fn cleanup(mut self) -> Result<()> {
        self.removed = true;
        remove_guarded(&self.root, &self.path)
    }
}

impl Drop for EphemeralDir {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = remove_guarded(&self.root, &self.path) {
            tracing::warn!("Failed to remove ephemeral directory {}: {e:#}", self.path.display());
        }
    }
}

/// Remove `path` recursively if, after normalization, it is strictly inside `root`.
pub(crate) fn remove_guarded(root: &Path, path: &Path) -> Result<()> {
    let root = normalize_path(root);
    let target = normalize_path(path);

    if target == root || !target.starts_with(&root) {
        bail!(
            "Refusing to remove {}: not inside ephemeral root {}",
            target.display(),
            root.display()
        );
    }

    if target.exists() {
        std::fs::remove_dir_all(&target)?;
        tracing::debug!("Removed ephemeral directory {}", target.display());
    }
    Ok(())
}
