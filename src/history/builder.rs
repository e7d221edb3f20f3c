//! Building a navigable history from parsed commits and version tags.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::commit::{CommitGrammar, CommitRecord, ParseOutcome, RawCommit};

use super::tag::{RawTag, Tag, TagOptions, hashes_match};

/// The range a history was queried for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundaries {
    /// Exclusive start; `None` means the start of the repository.
    pub from: Option<String>,
    /// Inclusive end.
    pub to: String,
}

impl Default for Boundaries {
    fn default() -> Self {
        Self {
            from: None,
            to: "HEAD".to_string(),
        }
    }
}

/// Commits introduced by one tagged version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub version: Version,
    pub tag: Tag,
    /// When the tagged commit was made, if known.
    pub date: Option<DateTime<Utc>>,
    /// Indices into [`HistoryLog::commits`], newest first.
    indices: Vec<usize>,
}

/// Identifies a bucket for rendering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum BucketKey {
    Unreleased,
    Version(Version),
}

/// Parsed commits between two boundaries, partitioned by version tag.
///
/// Built once per range by [`HistoryBuilder`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    commits: Vec<CommitRecord>,
    /// Position of each kept commit in the raw (newest-first) sequence.
    positions: Vec<usize>,
    raw_hashes: Vec<String>,
    tags: Vec<Tag>,
    buckets: BTreeMap<Version, Bucket>,
    unreleased: Vec<usize>,
    unreleased_date: Option<DateTime<Utc>>,
    boundaries: Boundaries,
}

impl HistoryLog {
    /// Commits newest first.
    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Versions that own a bucket, ascending.
    pub fn versions(&self) -> impl DoubleEndedIterator<Item = &Version> {
        self.buckets.keys()
    }

    pub fn bucket(&self, version: &Version) -> Option<&Bucket> {
        self.buckets.get(version)
    }

    /// Buckets in ascending version order.
    pub fn buckets(&self) -> impl DoubleEndedIterator<Item = &Bucket> {
        self.buckets.values()
    }

    /// Commits of a bucket, newest first.
    pub fn bucket_commits(&self, bucket: &Bucket) -> Vec<&CommitRecord> {
        bucket.indices.iter().map(|&i| &self.commits[i]).collect()
    }

    /// Commits newer than the most recent version tag, newest first.
    pub fn unreleased(&self) -> Vec<&CommitRecord> {
        self.unreleased.iter().map(|&i| &self.commits[i]).collect()
    }

    /// Timestamp of the newest unreleased commit.
    pub fn unreleased_date(&self) -> Option<DateTime<Utc>> {
        self.unreleased_date
    }

    /// Commits of the bucket named by `key`, newest first.
    pub fn commits_for(&self, key: &BucketKey) -> Option<Vec<&CommitRecord>> {
        match key {
            BucketKey::Unreleased => Some(self.unreleased()),
            BucketKey::Version(version) => {
                self.bucket(version).map(|bucket| self.bucket_commits(bucket))
            }
        }
    }

    /// The tag with the highest version.
    pub fn latest_tag(&self) -> Option<&Tag> {
        self.tags
            .iter()
            .filter(|t| t.version.is_some())
            .max_by(|a, b| a.version.cmp(&b.version))
    }

    /// The tag with the highest version that carries no pre-release label.
    pub fn latest_final_tag(&self) -> Option<&Tag> {
        self.tags
            .iter()
            .filter(|t| t.is_final())
            .max_by(|a, b| a.version.cmp(&b.version))
    }

    /// Commits strictly newer than `hash`, oldest first.
    ///
    /// Returns the whole history when `hash` is `None` or outside the range.
    pub fn commits_after(&self, hash: Option<&str>) -> Vec<&CommitRecord> {
        let cutoff = hash.and_then(|h| self.raw_hashes.iter().position(|r| hashes_match(r, h)));

        self.commits
            .iter()
            .zip(&self.positions)
            .rev()
            .filter(|(_, pos)| cutoff.is_none_or(|c| **pos < c))
            .map(|(commit, _)| commit)
            .collect()
    }
}

/// Parses raw commits and partitions them by version tag.
pub struct HistoryBuilder<'a> {
    grammar: &'a CommitGrammar,
    tag_options: &'a TagOptions,
}

impl<'a> HistoryBuilder<'a> {
    pub fn new(grammar: &'a CommitGrammar, tag_options: &'a TagOptions) -> Self {
        Self {
            grammar,
            tag_options,
        }
    }

    /// Build a history from commits in natural log order (newest first).
    pub fn build(
        &self,
        boundaries: Boundaries,
        commits: Vec<RawCommit>,
        tags: Vec<RawTag>,
    ) -> HistoryLog {
        let raws = unique_commits(commits);
        let tags = self.collect_tags(tags, &raws);

        let mut records = Vec::new();
        let mut positions = Vec::new();
        let mut record_at: Vec<Option<usize>> = Vec::with_capacity(raws.len());
        let mut dropped = 0usize;

        for (pos, raw) in raws.iter().enumerate() {
            let record = match self.grammar.parse(raw) {
                ParseOutcome::Parsed(record) => Some(record),
                ParseOutcome::Invalid(record) if self.grammar.include_invalid() => Some(record),
                ParseOutcome::Invalid(_) => {
                    debug!(
                        hash = %raw.hash,
                        "Dropping commit that does not match the header grammar"
                    );
                    dropped += 1;
                    None
                }
            };
            record_at.push(record.map(|record| {
                records.push(record);
                positions.push(pos);
                records.len() - 1
            }));
        }

        // Walk oldest to newest, closing a bucket at every tagged commit.
        let mut buckets = BTreeMap::new();
        let mut current: Vec<usize> = Vec::new();
        for (pos, raw) in raws.iter().enumerate().rev() {
            if let Some(index) = record_at[pos] {
                current.push(index);
            }

            let Some(tag) = tag_for_commit(&tags, &raw.hash, &buckets) else {
                continue;
            };
            let Some(version) = tag.version.clone() else {
                continue;
            };

            current.reverse();
            debug!(version = %version, commits = current.len(), "Closing version bucket");
            buckets.insert(
                version.clone(),
                Bucket {
                    version,
                    tag: tag.clone(),
                    date: raw.timestamp,
                    indices: std::mem::take(&mut current),
                },
            );
        }
        current.reverse();

        let unreleased_date = current
            .first()
            .and_then(|&i| raws[positions[i]].timestamp);

        info!(
            commits = records.len(),
            dropped,
            versions = buckets.len(),
            unreleased = current.len(),
            "Built commit history"
        );

        HistoryLog {
            commits: records,
            positions,
            raw_hashes: raws.into_iter().map(|raw| raw.hash).collect(),
            tags,
            buckets,
            unreleased: current,
            unreleased_date,
            boundaries,
        }
    }

    /// Deduplicate tags by name, parse versions, and add tags that only
    /// appear as commit decorations.
    fn collect_tags(&self, tags: Vec<RawTag>, commits: &[RawCommit]) -> Vec<Tag> {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();

        for raw in tags {
            if !seen.insert(raw.name.clone()) {
                warn!(tag = %raw.name, "Duplicate tag name, keeping the first");
                continue;
            }
            let tag = Tag::from_raw(raw, self.tag_options);
            if tag.version.is_none() {
                debug!(tag = %tag.name, "Tag is not a semantic version");
            }
            collected.push(tag);
        }

        for commit in commits {
            for decoration in &commit.decorations {
                let Some(name) = decoration.trim().strip_prefix("tag: ") else {
                    continue;
                };
                let name = name.trim();
                if seen.insert(name.to_string()) {
                    collected.push(Tag::from_raw(
                        RawTag::new(name, commit.hash.clone()),
                        self.tag_options,
                    ));
                }
            }
        }

        collected
    }
}

fn unique_commits(commits: Vec<RawCommit>) -> Vec<RawCommit> {
    let mut seen = HashSet::new();
    commits
        .into_iter()
        .filter(|commit| {
            let fresh = commit.hash.is_empty() || seen.insert(commit.hash.clone());
            if !fresh {
                warn!(hash = %commit.hash, "Duplicate commit in log, keeping the first");
            }
            fresh
        })
        .collect()
}

/// The highest-versioned tag on `hash` whose version does not own a bucket yet.
fn tag_for_commit<'t>(
    tags: &'t [Tag],
    hash: &str,
    buckets: &BTreeMap<Version, Bucket>,
) -> Option<&'t Tag> {
    let mut candidates: Vec<&Tag> = tags
        .iter()
        .filter(|t| t.version.is_some() && hashes_match(&t.hash, hash))
        .collect();
    candidates.sort_by(|a, b| b.version.cmp(&a.version));

    let mut chosen = None;
    for tag in candidates {
        let taken = tag.version.as_ref().is_some_and(|v| buckets.contains_key(v));
        if taken {
            warn!(tag = %tag.name, "Version already tagged on an older commit, ignoring");
        } else if chosen.is_none() {
            chosen = Some(tag);
        } else {
            debug!(
                tag = %tag.name,
                "Commit carries a higher version tag, keeping this one as decoration"
            );
        }
    }
    chosen
}
