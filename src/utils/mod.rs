//! Cross-platform utilities
//!
//! # Modules
//!
//! - [`fs`] - Atomic writes, filtered copies, path normalization and ephemeral directories
//! - [`platform`] - Home directory, git binary name and path expansion
//! - [`progress`] - Spinners for long-running steps
//! - [`security`] - Skill name sanitization and install path containment

pub mod fs;
pub mod platform;
pub mod progress;
pub mod security;

pub use fs::{atomic_write, ensure_dir, normalize_path};
pub use platform::{get_git_command, get_home_dir, is_windows, resolve_path};
pub use security::{resolve_install_path, sanitize_skill_name};
