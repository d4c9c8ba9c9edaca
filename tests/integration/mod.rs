//! Integration test suite for skillpm
//!
//! End-to-end tests that run the `skillpm` binary against local git
//! repositories reached through `file://` URLs. Every test gets its own
//! project, home and ephemeral directories, so the suite never touches the
//! user's real configuration.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **install_flow**: manifest install, lockfile contents, warnings, failures
//! - **frozen_install**: `--frozen` and `--no-lock`
//! - **add_command**: `add`, including `--save`
//! - **list_command**: `list`, including `--json`
//! - **path_safety**: skill names that try to escape the skills directory
//! - **cli_surface**: flags, agents, global config

#[path = "../common/mod.rs"]
mod common;

mod add_command;
mod cli_surface;
mod frozen_install;
mod install_flow;
mod list_command;
mod path_safety;
