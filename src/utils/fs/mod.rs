//! File system utilities
//!
//! Atomic writes for the lock and manifest files, filtered directory copies for
//! skill installation, lexical path normalization for containment checks, and
//! guarded ephemeral directories for repository retrieval.
//!
//! # Examples
//!
//! ```rust,no_run
//! use skillpm_cli::utils::fs::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new(".claude/skills"))?;
//! atomic_write(Path::new("skills.lock"), b"lockVersion = 1\n")?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod paths;
pub mod temp;

pub use atomic::atomic_write;
pub use dirs::{copy_dir_filtered, ensure_dir, remove_dir_all};
pub use paths::{find_project_root, get_global_config_path, normalize_path};
pub use temp::EphemeralDir;
