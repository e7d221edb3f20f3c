//! Bump level calculation from commits.

use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit::CommitRecord;

/// Semantic-versioning magnitude implied by a range of history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Patch,
    Minor,
    Major,
}

impl std::fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Patch => write!(f, "patch"),
            Self::Minor => write!(f, "minor"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// The header field and value that mark a feature commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinorSignal {
    pub key: String,
    pub value: String,
}

impl Default for MinorSignal {
    fn default() -> Self {
        Self {
            key: "type".to_string(),
            value: "feat".to_string(),
        }
    }
}

/// Determine the bump level from commits in oldest-first order.
///
/// Starts at patch; a commit matching the minor signal raises it to minor,
/// and any commit carrying a note is a major change. Commits that failed the
/// header grammar are skipped unless they are reverts or merges.
pub fn determine_bump_level(commits: &[&CommitRecord], signal: &MinorSignal) -> BumpLevel {
    let mut level = BumpLevel::Patch;

    for commit in commits {
        // Reverts and merges have no header fields but their notes still count.
        if !commit.is_valid() && !commit.is_revert() && !commit.is_merge() {
            continue;
        }

        if commit.is_breaking() {
            debug!(hash = %commit.short_hash(), "Breaking change found");
            return BumpLevel::Major;
        }

        if level < BumpLevel::Minor && commit.field(&signal.key) == Some(signal.value.as_str()) {
            debug!(hash = %commit.short_hash(), "Feature commit found");
            level = BumpLevel::Minor;
        }
    }

    level
}

/// Bump a version, dropping any pre-release and build metadata.
pub fn apply_bump(base: &Version, level: BumpLevel) -> Version {
    let mut next = match level {
        BumpLevel::Major => Version::new(base.major + 1, 0, 0),
        BumpLevel::Minor => Version::new(base.major, base.minor + 1, 0),
        BumpLevel::Patch => Version::new(base.major, base.minor, base.patch + 1),
    };
    next.pre = Prerelease::EMPTY;
    next.build = BuildMetadata::EMPTY;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::{CommitGrammar, ParserOptions};

    fn commits(messages: &[&str]) -> Vec<CommitRecord> {
        let grammar = CommitGrammar::compile(&ParserOptions {
            include_invalid: true,
            ..ParserOptions::default()
        })
        .unwrap();
        messages
            .iter()
            .map(|m| grammar.parse_message(m).into_record())
            .collect()
    }

    fn level(messages: &[&str]) -> BumpLevel {
        let records = commits(messages);
        let refs: Vec<&CommitRecord> = records.iter().collect();
        determine_bump_level(&refs, &MinorSignal::default())
    }

    #[test]
    fn test_patch_by_default() {
        assert_eq!(level(&["fix: a", "docs: b"]), BumpLevel::Patch);
        assert_eq!(level(&[]), BumpLevel::Patch);
    }

    #[test]
    fn test_feat_is_minor() {
        assert_eq!(level(&["fix: a", "feat: b", "fix: c"]), BumpLevel::Minor);
    }

    #[test]
    fn test_note_is_major() {
        assert_eq!(
            level(&["feat: a", "fix: b\n\nBREAKING CHANGE: gone"]),
            BumpLevel::Major
        );
    }

    #[test]
    fn test_invalid_commits_never_count() {
        assert_eq!(level(&["oops\n\nBREAKING CHANGE: not parsed"]), BumpLevel::Patch);
    }

    #[test]
    fn test_revert_with_note_is_major() {
        let revert =
            "Revert \"feat: a\"\n\nThis reverts commit 0000001.\n\nBREAKING CHANGE: api restored";
        assert_eq!(level(&["fix: a", revert]), BumpLevel::Major);
    }

    #[test]
    fn test_revert_without_note_adds_nothing() {
        let revert = "Revert \"feat: a\"\n\nThis reverts commit 0000001.";
        assert_eq!(level(&["fix: a", revert]), BumpLevel::Patch);
    }

    #[test]
    fn test_custom_minor_signal() {
        let records = commits(&["feature: shiny"]);
        let refs: Vec<&CommitRecord> = records.iter().collect();
        let signal = MinorSignal {
            key: "Type".to_string(),
            value: "feature".to_string(),
        };
        assert_eq!(determine_bump_level(&refs, &signal), BumpLevel::Minor);
    }

    #[test]
    fn test_apply_bump_resets_lower_parts() {
        let base = Version::parse("1.5.3-rc.1").unwrap();
        assert_eq!(apply_bump(&base, BumpLevel::Major), Version::new(2, 0, 0));
        assert_eq!(apply_bump(&base, BumpLevel::Minor), Version::new(1, 6, 0));
        assert_eq!(apply_bump(&base, BumpLevel::Patch), Version::new(1, 5, 4));
    }
}
