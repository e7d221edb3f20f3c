//! Structured commit records produced by the grammar parser.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the abbreviated hash shown in changelogs.
pub const SHORT_HASH_LEN: usize = 7;

/// A raw commit entry as supplied by a version-control query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommit {
    pub hash: String,
    pub message: String,
    /// Ref names pointing at the commit, e.g. `HEAD -> main` or `tag: v1.0.0`.
    #[serde(default)]
    pub decorations: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawCommit {
    pub fn new(hash: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_decorations<I, S>(mut self, decorations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decorations = decorations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// A footer paragraph introduced by a note keyword such as `BREAKING CHANGE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub text: String,
}

/// An issue reference like `Closes #12` or `owner/repo#7`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// The action keyword as written, `None` for a bare reference.
    pub action: Option<String>,
    pub repository: Option<String>,
    pub prefix: String,
    pub issue: String,
    pub raw: String,
}

/// A parsed commit.
///
/// Records are immutable once built; read them through the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    hash: String,
    short_hash: String,
    header: String,
    body: Option<String>,
    footer: Option<String>,
    raw: String,
    header_fields: BTreeMap<String, String>,
    merge_fields: BTreeMap<String, String>,
    revert_fields: BTreeMap<String, String>,
    fields: BTreeMap<String, String>,
    notes: Vec<Note>,
    references: Vec<Reference>,
    mentions: Vec<String>,
    branches: Vec<String>,
    tags: Vec<String>,
    is_merge: bool,
    is_revert: bool,
    reverted_hash: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl CommitRecord {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn short_hash(&self) -> &str {
        &self.short_hash
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn footer(&self) -> Option<&str> {
        self.footer.as_deref()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn header_fields(&self) -> &BTreeMap<String, String> {
        &self.header_fields
    }

    pub fn merge_fields(&self) -> &BTreeMap<String, String> {
        &self.merge_fields
    }

    pub fn revert_fields(&self) -> &BTreeMap<String, String> {
        &self.revert_fields
    }

    /// Legacy `-name-` footer fields.
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn mentions(&self) -> &[String] {
        &self.mentions
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_merge(&self) -> bool {
        self.is_merge
    }

    pub fn is_revert(&self) -> bool {
        self.is_revert
    }

    pub fn reverted_hash(&self) -> Option<&str> {
        self.reverted_hash.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Look up a header field, ignoring the case of `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.header_fields
            .get(&name.to_lowercase())
            .map(String::as_str)
    }

    /// Whether the header matched the grammar.
    pub fn is_valid(&self) -> bool {
        !self.header_fields.is_empty()
    }

    pub fn is_breaking(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// Accumulates the parts of a [`CommitRecord`] while the parser walks a message.
#[derive(Debug, Default)]
pub(crate) struct CommitRecordBuilder {
    pub hash: String,
    pub header: String,
    pub body: Option<String>,
    pub footer: Option<String>,
    pub raw: String,
    pub header_fields: BTreeMap<String, String>,
    pub merge_fields: BTreeMap<String, String>,
    pub revert_fields: BTreeMap<String, String>,
    pub fields: BTreeMap<String, String>,
    pub notes: Vec<Note>,
    pub references: Vec<Reference>,
    pub mentions: Vec<String>,
    pub branches: Vec<String>,
    pub tags: Vec<String>,
    pub is_merge: bool,
    pub is_revert: bool,
    pub reverted_hash: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl CommitRecordBuilder {
    pub fn build(self) -> CommitRecord {
        let short_hash = self.hash.chars().take(SHORT_HASH_LEN).collect();
        CommitRecord {
            hash: self.hash,
            short_hash,
            header: self.header,
            body: self.body,
            footer: self.footer,
            raw: self.raw,
            header_fields: self.header_fields,
            merge_fields: self.merge_fields,
            revert_fields: self.revert_fields,
            fields: self.fields,
            notes: self.notes,
            references: self.references,
            mentions: self.mentions,
            branches: self.branches,
            tags: self.tags,
            is_merge: self.is_merge,
            is_revert: self.is_revert,
            reverted_hash: self.reverted_hash,
            timestamp: self.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hash_truncates() {
        let record = CommitRecordBuilder {
            hash: "0123456789abcdef".to_string(),
            ..CommitRecordBuilder::default()
        }
        .build();
        assert_eq!(record.short_hash(), "0123456");
    }

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        let mut header_fields = BTreeMap::new();
        header_fields.insert("type".to_string(), "feat".to_string());
        let record = CommitRecordBuilder {
            header_fields,
            ..CommitRecordBuilder::default()
        }
        .build();

        assert_eq!(record.field("Type"), Some("feat"));
        assert_eq!(record.field("type"), Some("feat"));
        assert!(record.is_valid());
        assert!(!record.is_breaking());
    }
}
