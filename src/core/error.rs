//! Error handling for skillpm
//!
//! This module provides the error taxonomy and user-friendly error reporting for
//! skillpm. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Categories
//!
//! - **Specification**: [`SkillpmError::ManifestParseError`],
//!   [`SkillpmError::InvalidManifestEntry`], [`SkillpmError::DuplicateManifestEntry`]
//! - **Resolution**: [`SkillpmError::GitCloneFailed`], [`SkillpmError::SourceUnreachable`],
//!   [`SkillpmError::GitCommandError`], [`SkillpmError::GitNotFound`]
//! - **Matching**: [`SkillpmError::SkillNotFound`], [`SkillpmError::LockfileOutOfDate`]
//! - **Filesystem**: [`SkillpmError::PathTraversal`], [`SkillpmError::FileSystemError`]
//!
//! Validation warnings (version mismatch, unversioned skill) are not errors; they
//! are reported as [`crate::resolver::ResolveWarning`] values.
//!
//! # Examples
//!
//! ```rust,no_run
//! use skillpm_cli::core::{SkillpmError, user_friendly_error};
//!
//! let error = SkillpmError::GitNotFound;
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored error with suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for skillpm operations.
///
/// Each variant carries the context needed to explain the failure without
/// consulting logs: the offending manifest index, the URL that failed to clone,
/// the list of skills that *were* discovered, and so on.
#[derive(Error, Debug)]
pub enum SkillpmError {
    /// Git command returned a non-zero exit code
    #[error("Git operation failed: {operation}")]
    GitCommandError {
        /// The git operation that failed (e.g., "fetch", "checkout")
        operation: String,
        /// The error output from the git command
        stderr: String,
    },

    /// Git executable not found in PATH
    #[error("Git is not installed or not found in PATH")]
    GitNotFound,

    /// Repository clone failed
    #[error("Failed to clone repository: {url}")]
    GitCloneFailed {
        /// The repository URL that failed to clone (credentials stripped)
        url: String,
        /// The reason for the clone failure
        reason: String,
    },

    /// Every retrieval strategy for a repository failed, including the default branch
    #[error("Cannot retrieve repository {url}")]
    SourceUnreachable {
        /// The repository URL (credentials stripped)
        url: String,
        /// Description of the last failure
        reason: String,
    },

    /// Manifest file does not exist
    #[error("Manifest file not found: {path}")]
    ManifestNotFound {
        /// Expected manifest location
        path: String,
    },

    /// Manifest file is not valid TOML or has the wrong shape
    #[error("Invalid manifest file syntax in {file}")]
    ManifestParseError {
        /// Path to the manifest file
        file: String,
        /// Parser error message
        reason: String,
    },

    /// Manifest as a whole failed validation
    #[error("Manifest validation failed: {reason}")]
    ManifestValidationError {
        /// Why validation failed
        reason: String,
    },

    /// A single manifest entry failed validation
    #[error("Invalid manifest entry #{index}: {reason}")]
    InvalidManifestEntry {
        /// Position of the entry in the manifest, starting at 1
        index: usize,
        /// Why the entry is invalid
        reason: String,
    },

    /// Two manifest entries request the same skill from the same source
    #[error(
        "Skill '{name}' from '{source_url}' is listed twice in the manifest (entries #{first} and #{second})"
    )]
    DuplicateManifestEntry {
        /// Skill name as written in the later entry
        name: String,
        /// Source string shared by both entries
        source_url: String,
        /// Index of the first occurrence
        first: usize,
        /// Index of the duplicate
        second: usize,
    },

    /// A requested skill is absent from a source's discovery results
    #[error("Skill '{name}' not found in source '{source_url}'. Available skills: {available:?}")]
    SkillNotFound {
        /// Requested skill name
        name: String,
        /// Source the skill was requested from
        source_url: String,
        /// Every skill name discovered in that source
        available: Vec<String>,
    },

    /// Lock file is not valid TOML, has the wrong shape, or records a
    /// revision that is not a commit id
    #[error("Invalid lockfile {file}: {reason}")]
    LockfileParseError {
        /// Path to the lock file
        file: String,
        /// Parser error message
        reason: String,
    },

    /// Frozen install found a manifest entry with no lock record
    #[error("Skill '{name}' from '{source_url}' is not recorded in the lockfile")]
    LockfileOutOfDate {
        /// Skill name from the manifest
        name: String,
        /// Source string from the manifest
        source_url: String,
    },

    /// Computed install path escapes its base directory
    #[error("Path traversal detected for skill '{name}': {path}")]
    PathTraversal {
        /// Raw skill name that produced the path
        name: String,
        /// The offending path or base directory
        path: String,
    },

    /// A filesystem operation on an install or checkout path failed
    #[error("Failed to {operation}: {path}")]
    FileSystemError {
        /// The operation that failed
        operation: String,
        /// The path involved
        path: String,
    },

    /// An install target references an agent that is not in the registry
    #[error("Unknown agent '{id}'")]
    UnknownAgent {
        /// The unknown agent identifier
        id: String,
        /// All known agent identifiers
        known: Vec<String>,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for SkillpmError {
    fn clone(&self) -> Self {
        match self {
            Self::GitCommandError {
                operation,
                stderr,
            } => Self::GitCommandError {
                operation: operation.clone(),
                stderr: stderr.clone(),
            },
            Self::GitNotFound => Self::GitNotFound,
            Self::GitCloneFailed {
                url,
                reason,
            } => Self::GitCloneFailed {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::SourceUnreachable {
                url,
                reason,
            } => Self::SourceUnreachable {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::ManifestNotFound {
                path,
            } => Self::ManifestNotFound {
                path: path.clone(),
            },
            Self::ManifestParseError {
                file,
                reason,
            } => Self::ManifestParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ManifestValidationError {
                reason,
            } => Self::ManifestValidationError {
                reason: reason.clone(),
            },
            Self::InvalidManifestEntry {
                index,
                reason,
            } => Self::InvalidManifestEntry {
                index: *index,
                reason: reason.clone(),
            },
            Self::DuplicateManifestEntry {
                name,
                source_url,
                first,
                second,
            } => Self::DuplicateManifestEntry {
                name: name.clone(),
                source_url: source_url.clone(),
                first: *first,
                second: *second,
            },
            Self::SkillNotFound {
                name,
                source_url,
                available,
            } => Self::SkillNotFound {
                name: name.clone(),
                source_url: source_url.clone(),
                available: available.clone(),
            },
            Self::LockfileParseError {
                file,
                reason,
            } => Self::LockfileParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::LockfileOutOfDate {
                name,
                source_url,
            } => Self::LockfileOutOfDate {
                name: name.clone(),
                source_url: source_url.clone(),
            },
            Self::PathTraversal {
                name,
                path,
            } => Self::PathTraversal {
                name: name.clone(),
                path: path.clone(),
            },
            Self::FileSystemError {
                operation,
                path,
            } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            Self::UnknownAgent {
                id,
                known,
            } => Self::UnknownAgent {
                id: id.clone(),
                known: known.clone(),
            },
            // Wrapped library errors are not Clone; keep their message
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::TomlSerError(e) => Self::Other {
                message: format!("TOML serialization error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information.
///
/// When displayed, errors show the main message in red, optional details in
/// yellow and an optional suggestion in green.
///
/// ```rust,no_run
/// use skillpm_cli::core::{SkillpmError, ErrorContext};
///
/// let context = ErrorContext::new(SkillpmError::GitNotFound)
///     .with_suggestion("Install git from https://git-scm.com/")
///     .with_details("skillpm requires git to retrieve skill repositories");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SkillpmError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SkillpmError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Typed [`SkillpmError`]s anywhere in the chain get tailored suggestions;
/// everything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(skillpm_error) = cause.downcast_ref::<SkillpmError>() {
            let mut ctx = create_error_context(skillpm_error.clone());
            // Keep outer context messages, they usually name the file or skill
            let outer: Vec<String> = error
                .chain()
                .take_while(|c| c.downcast_ref::<SkillpmError>().is_none())
                .map(ToString::to_string)
                .collect();
            if !outer.is_empty() && ctx.details.is_none() {
                ctx.details = Some(outer.join(": "));
            }
            return ctx;
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(SkillpmError::FileSystemError {
            operation: "access file".to_string(),
            path: "permission denied".to_string(),
        })
        .with_suggestion("Check file ownership and permissions of the target directory")
        .with_details(io_error.to_string());
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(SkillpmError::Other {
        message,
    })
}

fn create_error_context(error: SkillpmError) -> ErrorContext {
    match &error {
        SkillpmError::GitNotFound => ErrorContext::new(error)
            .with_suggestion("Install git from https://git-scm.com/ or your package manager (e.g., 'brew install git', 'apt install git')")
            .with_details("skillpm uses the system git binary to retrieve skill repositories"),

        SkillpmError::GitCommandError { stderr, .. } => {
            let details = stderr.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Check your git configuration and repository access. Run with --verbose to see the git command")
                .with_details(details)
        }

        SkillpmError::GitCloneFailed { url, reason } => {
            let suggestion = format!(
                "Verify the repository exists and is accessible: {url}. Private repositories need git credentials configured"
            );
            let details = reason.trim().to_string();
            ErrorContext::new(error).with_suggestion(suggestion).with_details(details)
        }

        SkillpmError::SourceUnreachable { reason, .. } => {
            let details = reason.trim().to_string();
            ErrorContext::new(error)
                .with_suggestion("Check your network connection and that the repository URL is correct")
                .with_details(details)
        }

        SkillpmError::ManifestNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Create a skills.toml with [[skills]] entries, or use 'skillpm add <source> --save'"),

        SkillpmError::ManifestParseError { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_suggestion("Each [[skills]] entry needs string fields 'source' and 'name', and optionally 'version'")
                .with_details(details)
        }

        SkillpmError::InvalidManifestEntry { .. } => ErrorContext::new(error)
            .with_suggestion("Sources are 'owner/repo[/path]' shorthands or repository URLs; versions are semantic versions (1.2.3) or 'latest'"),

        SkillpmError::DuplicateManifestEntry { .. } => ErrorContext::new(error)
            .with_suggestion("Keep a single entry per skill and source; pick the version you want installed"),

        SkillpmError::SkillNotFound { name, available, .. } => {
            let mut ctx = ErrorContext::new(error.clone());
            if let Some(closest) = closest_name(name, available) {
                ctx = ctx.with_suggestion(format!("Did you mean '{closest}'?"));
            } else if available.is_empty() {
                ctx = ctx.with_suggestion("The source contains no SKILL.md files with 'name' and 'description' frontmatter");
            }
            ctx
        }

        SkillpmError::LockfileParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Delete skills.lock and run 'skillpm install' to regenerate it"),

        SkillpmError::LockfileOutOfDate { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'skillpm install' without --frozen to update skills.lock"),

        SkillpmError::PathTraversal { .. } => ErrorContext::new(error)
            .with_details("Skill names must not contain path separators, '..' segments or NUL bytes")
            .with_suggestion("Report the skill to its maintainer; it was not installed"),

        SkillpmError::UnknownAgent { id, known } => {
            let mut ctx = ErrorContext::new(error.clone()).with_details(format!("Known agents: {}", known.join(", ")));
            if let Some(closest) = closest_name(id, known) {
                ctx = ctx.with_suggestion(format!("Did you mean '{closest}'?"));
            }
            ctx
        }

        _ => ErrorContext::new(error),
    }
}

/// Pick the most similar candidate for "did you mean" hints.
fn closest_name<'a>(wanted: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(&wanted.to_lowercase(), &c.to_lowercase()), c))
        .filter(|(score, _)| *score > 0.8)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.as_str())
}
