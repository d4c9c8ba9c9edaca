//! Grouping manifest entries into retrieval units.
//!
//! Entries that share a source and a requested version are satisfied by one
//! retrieval, so the number of fetches equals the number of groups, not the
//! number of entries. Groups keep first-appearance order and each group keeps
//! its entries in manifest order.

use super::revision::RevisionRequest;
use crate::core::SkillpmError;
use crate::lockfile::{LockEntry, LockFile};
use crate::manifest::ManifestEntry;

/// Manifest entries satisfied by one retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalGroup<'a> {
    /// Source string shared by all entries
    pub source: String,
    /// What to retrieve
    pub request: RevisionRequest,
    /// Entries in manifest order
    pub members: Vec<GroupMember<'a>>,
}

/// One entry of a [`RetrievalGroup`].
#[derive(Debug, Clone, Copy)]
pub struct GroupMember<'a> {
    /// Zero-based position in the manifest
    pub position: usize,
    /// The manifest entry
    pub entry: &'a ManifestEntry,
    /// Its lock record, for frozen groups
    pub locked: Option<&'a LockEntry>,
}

impl RetrievalGroup<'_> {
    /// Number of entries in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Groups entries by `(source, version)`, treating `latest` as no version.
#[must_use]
pub fn group_by_version(entries: &[ManifestEntry]) -> Vec<RetrievalGroup<'_>> {
    let mut groups: Vec<RetrievalGroup<'_>> = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        let source = entry.source.trim();
        let request = RevisionRequest::from_version(entry.pinned_version());
        let member = GroupMember {
            position,
            entry,
            locked: None,
        };

        match groups.iter_mut().find(|g| g.source == source && g.request == request) {
            Some(group) => group.members.push(member),
            None => groups.push(RetrievalGroup {
                source: source.to_string(),
                request,
                members: vec![member],
            }),
        }
    }

    groups
}

/// Groups entries by `(source, locked commit)` for frozen installs.
///
/// # Errors
///
/// Returns [`SkillpmError::LockfileOutOfDate`] for the first entry without a
/// lock record.
pub fn group_by_lock<'a>(
    entries: &'a [ManifestEntry],
    lockfile: &'a LockFile,
) -> Result<Vec<RetrievalGroup<'a>>, SkillpmError> {
    let mut groups: Vec<RetrievalGroup<'a>> = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        let locked = lockfile.find(&entry.source, &entry.name).ok_or_else(|| {
            SkillpmError::LockfileOutOfDate {
                name: entry.name.clone(),
                source_url: entry.source.clone(),
            }
        })?;

        let source = entry.source.trim();
        let request = RevisionRequest::Commit(locked.resolved_ref.clone());
        let member = GroupMember {
            position,
            entry,
            locked: Some(locked),
        };

        match groups.iter_mut().find(|g| g.source == source && g.request == request) {
            Some(group) => group.members.push(member),
            None => groups.push(RetrievalGroup {
                source: source.to_string(),
                request,
                members: vec![member],
            }),
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(source: &str, name: &str, version: Option<&str>) -> ManifestEntry {
        ManifestEntry::new(source, name, version.map(str::to_string))
    }

    #[test]
    fn test_group_by_version() {
        let entries = vec![
            entry("acme/tools", "alpha", None),
            entry("other/skills", "gamma", None),
            entry("acme/tools", "beta", Some("latest")),
            entry("acme/tools", "delta", Some("1.0.0")),
            entry("acme/tools", "epsilon", Some("1.0.0")),
        ];

        let groups = group_by_version(&entries);
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].source, "acme/tools");
        assert_eq!(groups[0].request, RevisionRequest::Default);
        let names: Vec<_> = groups[0].members.iter().map(|m| m.entry.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);

        assert_eq!(groups[1].source, "other/skills");
        assert_eq!(groups[2].request, RevisionRequest::Version("1.0.0".to_string()));
        assert_eq!(groups[2].len(), 2);
        assert_eq!(groups[2].members[1].position, 4);
    }

    #[test]
    fn test_group_by_lock() {
        let entries = vec![
            entry("acme/tools", "alpha", Some("1.0.0")),
            entry("acme/tools", "beta", None),
            entry("acme/tools", "gamma", None),
        ];
        let lock = |name: &str, sha: &str| LockEntry {
            source: "acme/tools".to_string(),
            name: name.to_string(),
            version: "latest".to_string(),
            resolved_ref: sha.to_string(),
            installed_at: Utc::now(),
        };
        let lockfile = LockFile::with_entries(vec![
            lock("alpha", "aaa"),
            lock("beta", "bbb"),
            lock("GAMMA", "bbb"),
        ]);

        let groups = group_by_lock(&entries, &lockfile).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].request, RevisionRequest::Commit("aaa".to_string()));
        assert_eq!(groups[1].len(), 2);
        assert_eq!(groups[1].members[1].locked.map(|l| l.name.as_str()), Some("GAMMA"));
    }

    #[test]
    fn test_group_by_lock_missing_entry() {
        let entries = vec![entry("acme/tools", "alpha", None)];
        let err = group_by_lock(&entries, &LockFile::new()).unwrap_err();
        assert!(matches!(err, SkillpmError::LockfileOutOfDate { .. }));
    }
}
