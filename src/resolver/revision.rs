//! Revision resolution: turning a repository URL and an optional version into
//! a checkout at one concrete commit.
//!
//! # Strategy
//!
//! - **No version**: shallow clone of the default branch.
//! - **Version `X`**: shallow clone at tag `vX`, then at tag `X`. A leading `v`
//!   on the request is ignored when building the candidates, so `v1.2.0` and
//!   `1.2.0` try the same tags. If neither tag exists the default branch is
//!   used and [`Resolution::matched_ref`] is `None`; callers report that.
//! - **Commit**: fetch exactly that commit (frozen installs).
//!
//! In every case the resolved revision is the full SHA of the checked-out
//! commit, never the tag or branch name used to find it.
//!
//! Every attempt clones into its own fresh directory under the ephemeral root;
//! failed attempts are removed immediately.

use crate::core::SkillpmError;
use crate::git::{GitRepo, strip_auth_from_url};
use crate::utils::fs::EphemeralDir;
use anyhow::{Context, Result};
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Prefix of every checkout directory name.
pub const CHECKOUT_PREFIX: &str = "skillpm";

/// Which revision of a repository to retrieve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RevisionRequest {
    /// The remote's default branch
    Default,
    /// A version, looked up as a tag
    Version(String),
    /// An exact commit SHA
    Commit(String),
}

impl RevisionRequest {
    /// `None`, blank and `latest` map to [`RevisionRequest::Default`].
    #[must_use]
    pub fn from_version(version: Option<&str>) -> Self {
        match version.map(str::trim) {
            Some(v) if !v.is_empty() && !v.eq_ignore_ascii_case(crate::manifest::LATEST) => {
                Self::Version(v.to_string())
            }
            _ => Self::Default,
        }
    }
}

impl fmt::Display for RevisionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default branch"),
            Self::Version(v) => write!(f, "version {v}"),
            Self::Commit(c) => write!(f, "commit {c}"),
        }
    }
}

/// Tag names tried for a version, in order.
///
/// ```
/// use skillpm_cli::resolver::revision::tag_candidates;
///
/// assert_eq!(tag_candidates("1.2.0"), vec!["v1.2.0", "1.2.0"]);
/// assert_eq!(tag_candidates("v1.2.0"), vec!["v1.2.0", "1.2.0"]);
/// ```
#[must_use]
pub fn tag_candidates(version: &str) -> Vec<String> {
    let bare = version.trim().strip_prefix(['v', 'V']).unwrap_or(version.trim());
    vec![format!("v{bare}"), bare.to_string()]
}

/// An ephemeral working copy; removed on drop.
#[derive(Debug)]
pub struct Checkout {
    dir: EphemeralDir,
}

impl Checkout {
    /// Creates an empty, uniquely named directory under `ephemeral_root`.
    pub fn new(ephemeral_root: &Path) -> Result<Self> {
        let dir = EphemeralDir::new_in(ephemeral_root, CHECKOUT_PREFIX).with_context(|| {
            format!("Failed to create checkout directory in {}", ephemeral_root.display())
        })?;
        Ok(Self {
            dir,
        })
    }

    /// Root of the checked-out tree.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the checkout now, reporting failures.
    pub fn cleanup(self) -> Result<()> {
        self.dir.cleanup()
    }
}

/// Outcome of a successful resolution.
#[derive(Debug)]
pub struct Resolution {
    /// The checked-out tree
    pub checkout: Checkout,
    /// Full SHA of the checked-out commit
    pub resolved_revision: String,
    /// Tag that satisfied a version request; `None` for default-branch and
    /// commit retrievals, and when a requested version fell back
    pub matched_ref: Option<String>,
}

impl Resolution {
    /// Root of the checked-out tree.
    #[must_use]
    pub fn content_root(&self) -> &Path {
        self.checkout.path()
    }
}

/// Retrieval capability used by [`RevisionResolver`].
///
/// Both methods populate an existing empty `target` and return the full SHA of
/// what was checked out.
pub trait RepositoryFetcher {
    /// Shallow clone at `reference` (branch or tag), or the default branch.
    fn clone_at(
        &self,
        url: &str,
        target: &Path,
        reference: Option<&str>,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Check out exactly `commit`.
    fn checkout_commit(
        &self,
        url: &str,
        target: &Path,
        commit: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// [`RepositoryFetcher`] backed by the system git binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitFetcher;

impl RepositoryFetcher for GitFetcher {
    async fn clone_at(&self, url: &str, target: &Path, reference: Option<&str>) -> Result<String> {
        let repo = GitRepo::clone_shallow(url, target, reference, "resolve").await?;
        repo.get_current_commit().await
    }

    async fn checkout_commit(&self, url: &str, target: &Path, commit: &str) -> Result<String> {
        let repo = GitRepo::fetch_commit(url, target, commit, "frozen").await?;
        repo.get_current_commit().await
    }
}

/// Resolves revision requests into checkouts under one ephemeral root.
#[derive(Debug, Clone)]
pub struct RevisionResolver<F = GitFetcher> {
    fetcher: F,
    ephemeral_root: PathBuf,
}

impl RevisionResolver<GitFetcher> {
    /// Resolver using system git.
    pub fn new(ephemeral_root: impl Into<PathBuf>) -> Self {
        Self::with_fetcher(GitFetcher, ephemeral_root)
    }
}

impl<F: RepositoryFetcher> RevisionResolver<F> {
    /// Resolver using a custom fetcher.
    pub fn with_fetcher(fetcher: F, ephemeral_root: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            ephemeral_root: ephemeral_root.into(),
        }
    }

    /// The fetcher in use.
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Retrieves `url` at `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SkillpmError::SourceUnreachable`] when the repository cannot be
    /// retrieved at all: the default branch clone failed (after any tag
    /// candidates), or the requested commit could not be checked out.
    pub async fn resolve(&self, url: &str, request: &RevisionRequest) -> Result<Resolution> {
        let display_url = strip_auth_from_url(url);

        match request {
            RevisionRequest::Default => self.resolve_default(url, &display_url).await,
            RevisionRequest::Version(version) => {
                for candidate in tag_candidates(version) {
                    let checkout = Checkout::new(&self.ephemeral_root)?;
                    match self.fetcher.clone_at(url, checkout.path(), Some(&candidate)).await {
                        Ok(revision) => {
                            tracing::debug!("Resolved {display_url} tag {candidate} to {revision}");
                            return Ok(Resolution {
                                checkout,
                                resolved_revision: revision,
                                matched_ref: Some(candidate),
                            });
                        }
                        Err(e) => {
                            tracing::debug!("Tag {candidate} not usable for {display_url}: {e:#}");
                        }
                    }
                }

                tracing::debug!(
                    "No tag for version {version} in {display_url}, falling back to the default branch"
                );
                self.resolve_default(url, &display_url).await
            }
            RevisionRequest::Commit(commit) => {
                let checkout = Checkout::new(&self.ephemeral_root)?;
                let revision = self
                    .fetcher
                    .checkout_commit(url, checkout.path(), commit)
                    .await
                    .map_err(|e| unreachable_error(&display_url, &e))?;
                tracing::debug!("Checked out {display_url} at locked commit {revision}");
                Ok(Resolution {
                    checkout,
                    resolved_revision: revision,
                    matched_ref: None,
                })
            }
        }
    }

    async fn resolve_default(&self, url: &str, display_url: &str) -> Result<Resolution> {
        let checkout = Checkout::new(&self.ephemeral_root)?;
        let revision = self
            .fetcher
            .clone_at(url, checkout.path(), None)
            .await
            .map_err(|e| unreachable_error(display_url, &e))?;
        tracing::debug!("Resolved {display_url} default branch to {revision}");
        Ok(Resolution {
            checkout,
            resolved_revision: revision,
            matched_ref: None,
        })
    }
}

fn unreachable_error(display_url: &str, error: &anyhow::Error) -> anyhow::Error {
    let reason = match error.downcast_ref::<SkillpmError>() {
        Some(
            SkillpmError::GitCloneFailed {
                reason,
                ..
            }
            | SkillpmError::GitCommandError {
                stderr: reason,
                ..
            },
        ) => reason.trim().to_string(),
        _ => format!("{error:#}"),
    };
    SkillpmError::SourceUnreachable {
        url: display_url.to_string(),
        reason,
    }
    .into()
}
