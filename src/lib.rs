//! skillpm - a package manager for agent skills
//!
//! A skill is a directory containing a `SKILL.md` file whose YAML frontmatter
//! names and describes it. Skills live in git repositories; skillpm finds them,
//! resolves the requested versions and copies them into the skills directories
//! of coding agents (Claude Code, Cursor, Codex and others).
//!
//! # Architecture Overview
//!
//! skillpm follows a manifest/lockfile model:
//! - `skills.toml` declares which skills to install, from which sources, at
//!   which versions
//! - `skills.lock` records the exact commit every skill was installed from
//! - repositories are retrieved into short-lived checkouts with system git;
//!   nothing is cached between runs
//!
//! # Modules
//!
//! ## Pipeline
//! - [`source`] - shorthand, web URL and git URL normalization
//! - [`git`] - git subprocess wrapper
//! - [`resolver`] - revision resolution, grouping and manifest reconciliation
//! - [`skills`] - `SKILL.md` parsing and skill discovery in a checkout
//! - [`installer`] - copying skills into agent directories
//!
//! ## Project Files
//! - [`manifest`] - `skills.toml` parsing and validation
//! - [`lockfile`] - `skills.lock` reading and writing
//!
//! ## Support
//! - [`cli`] - the `skillpm` command line
//! - [`config`] - runtime context, global config and the agent registry
//! - [`core`] - error types and user-facing error formatting
//! - [`utils`] - filesystem, path safety, platform and progress helpers
//!
//! # Manifest Format (skills.toml)
//!
//! ```toml
//! [[skills]]
//! source = "acme/tools"
//! name = "release-notes"
//! version = "1.2.0"
//!
//! [[skills]]
//! source = "https://github.com/acme/tools/tree/main/skills/changelog"
//! name = "changelog"
//! ```
//!
//! # Lockfile Format (skills.lock)
//!
//! ```toml
//! # Auto-generated lockfile - DO NOT EDIT
//! lockVersion = 1
//!
//! [[skills]]
//! source = "acme/tools"
//! name = "release-notes"
//! version = "1.2.0"
//! resolvedRef = "0123456789abcdef0123456789abcdef01234567"
//! installedAt = "2026-10-17T09:30:00Z"
//! ```
//!
//! # Security
//!
//! Skill names come from third-party repositories. Every install path is
//! checked for traversal before anything is written, and only the
//! `<base>/<name>` directory is ever replaced.

pub mod cli;
pub mod config;
pub mod core;
pub mod git;
pub mod installer;
pub mod lockfile;
pub mod manifest;
pub mod resolver;
pub mod skills;
pub mod source;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
