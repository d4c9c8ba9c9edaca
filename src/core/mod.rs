//! Core types for skillpm
//!
//! Currently this is the error layer shared by every other module:
//! - [`SkillpmError`] - the typed failure taxonomy
//! - [`ErrorContext`] - an error plus the suggestion and details shown to users
//! - [`user_friendly_error`] - turns any `anyhow::Error` into an [`ErrorContext`]
//!
//! Library code returns `anyhow::Result` and raises [`SkillpmError`] values for
//! failures a caller may want to branch on; those callers recover the kind with
//! `downcast_ref::<SkillpmError>()`.

pub mod error;

pub use error::{ErrorContext, SkillpmError, user_friendly_error};
