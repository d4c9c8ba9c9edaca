//! Source string normalization.
//!
//! Users name skill repositories in several ways. This module turns each of them
//! into a [`SourceSpec`]: a clonable repository URL plus an optional subpath
//! inside the repository.
//!
//! Recognized forms, checked in order:
//!
//! | Input | Repository URL | Subpath |
//! |---|---|---|
//! | `https://github.com/o/r/tree/main/skills/x` | `https://github.com/o/r.git` | `skills/x` |
//! | `https://gitlab.com/o/r/-/tree/main/skills/x` | `https://gitlab.com/o/r.git` | `skills/x` |
//! | `https://github.com/o/r` | `https://github.com/o/r.git` | none |
//! | `o/r` or `o/r/skills/x` | `https://github.com/o/r.git` | none or `skills/x` |
//! | anything else (`git@host:o/r.git`, `file:///srv/repo`) | verbatim | none |
//!
//! The branch segment of a "browse" URL is not used for retrieval; the version
//! requested alongside the source decides which revision is fetched.
//!
//! Shorthand is only considered when the input has no `:` at all, so scp-style
//! and scheme URLs are never mistaken for `owner/name`.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Host used for `owner/name` shorthand.
pub const DEFAULT_HOST: &str = "github.com";

/// Web hosts whose browse URLs we understand, with the marker that precedes the
/// ref in a "tree" URL.
const WEB_HOSTS: &[(&str, &str)] = &[("github.com", "tree"), ("gitlab.com", "-/tree")];

static SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)(?:/(.+))?$").expect("valid regex")
});

static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?:https?|ssh|git|file)://\S+|[\w.-]+@[\w.-]+:\S+)$").expect("valid regex")
});

/// A normalized source: where to clone from and where to look inside.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpec {
    /// URL handed to `git clone`
    pub repository_url: String,
    /// Directory inside the repository to search for skills
    pub subpath: Option<String>,
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subpath {
            Some(subpath) => write!(f, "{} ({})", self.repository_url, subpath),
            None => write!(f, "{}", self.repository_url),
        }
    }
}

/// Parses a user-supplied source string. Never fails: unrecognized input is
/// used verbatim as the repository locator.
///
/// # Examples
///
/// ```
/// use skillpm_cli::source::normalize;
///
/// let spec = normalize("acme/tools/skills/release-notes");
/// assert_eq!(spec.repository_url, "https://github.com/acme/tools.git");
/// assert_eq!(spec.subpath.as_deref(), Some("skills/release-notes"));
///
/// let spec = normalize("git@example.com:acme/tools.git");
/// assert_eq!(spec.repository_url, "git@example.com:acme/tools.git");
/// assert!(spec.subpath.is_none());
/// ```
#[must_use]
pub fn normalize(input: &str) -> SourceSpec {
    let input = input.trim();

    if let Some(spec) = parse_web_url(input) {
        return spec;
    }

    if !input.contains(':')
        && let Some(caps) = SHORTHAND.captures(input)
    {
        return SourceSpec {
            repository_url: repository_url(DEFAULT_HOST, &caps[1], &caps[2]),
            subpath: caps.get(3).and_then(|m| clean_subpath(m.as_str())),
        };
    }

    SourceSpec {
        repository_url: input.to_string(),
        subpath: None,
    }
}

/// Returns `true` when `source` has the shape of a shorthand or a repository URL.
///
/// This is the shape check applied to manifest entries; [`normalize`] itself
/// accepts anything.
#[must_use]
pub fn is_valid_source(source: &str) -> bool {
    let source = source.trim();
    if source.is_empty() {
        return false;
    }
    (!source.contains(':') && SHORTHAND.is_match(source)) || URL_SHAPE.is_match(source)
}

fn parse_web_url(input: &str) -> Option<SourceSpec> {
    let rest = input.strip_prefix("https://").or_else(|| input.strip_prefix("http://"))?;

    for (host, tree_marker) in WEB_HOSTS {
        let Some(path) = rest.strip_prefix(host).and_then(|p| p.strip_prefix('/')) else {
            continue;
        };

        let mut segments = path.splitn(3, '/');
        let (Some(owner), Some(repo)) = (segments.next(), segments.next()) else {
            continue;
        };
        if owner.is_empty() || repo.is_empty() {
            continue;
        }
        let remainder = segments.next().unwrap_or("");

        // "<marker>/<ref>/<subpath>"; the ref is dropped
        let subpath = remainder
            .strip_prefix(tree_marker)
            .and_then(|r| r.strip_prefix('/'))
            .and_then(|r| r.split_once('/'))
            .and_then(|(_, sub)| clean_subpath(sub));

        return Some(SourceSpec {
            repository_url: repository_url(host, owner, repo),
            subpath,
        });
    }

    None
}

fn repository_url(host: &str, owner: &str, repo: &str) -> String {
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    format!("https://{host}/{owner}/{repo}.git")
}

fn clean_subpath(raw: &str) -> Option<String> {
    let trimmed = raw.trim_matches('/');
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
