//! Grouping, sorting and rendering a history into a changelog document.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit::CommitRecord;
use crate::history::{BucketKey, HistoryLog};

use super::template::{Context, TemplateSet, fill};

/// A commit type shown in the changelog and its section title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTitle {
    #[serde(rename = "type")]
    pub commit_type: String,
    pub title: String,
}

impl TypeTitle {
    pub fn new(commit_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            title: title.into(),
        }
    }
}

fn default_types() -> Vec<TypeTitle> {
    vec![
        TypeTitle::new("feat", "Features"),
        TypeTitle::new("fix", "Bug Fixes"),
        TypeTitle::new("perf", "Performance Improvements"),
        TypeTitle::new("revert", "Reverts"),
    ]
}

/// How commits are selected, grouped and ordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogOptions {
    /// Header field holding the commit type.
    pub type_key: String,
    pub group_by: String,
    /// Sort keys, primary first.
    pub sort_by: Vec<String>,
    /// Types to include, in section order.
    pub types: Vec<TypeTitle>,
    pub include_unreleased: bool,
    pub unreleased_title: String,
}

impl Default for ChangelogOptions {
    fn default() -> Self {
        Self {
            type_key: "type".to_string(),
            group_by: "type".to_string(),
            sort_by: vec!["scope".to_string(), "subject".to_string()],
            types: default_types(),
            include_unreleased: true,
            unreleased_title: "Unreleased".to_string(),
        }
    }
}

impl ChangelogOptions {
    fn title_for(&self, value: &str) -> Option<&str> {
        self.types
            .iter()
            .find(|t| t.commit_type == value)
            .map(|t| t.title.as_str())
    }

    fn type_rank(&self, value: &str) -> Option<usize> {
        self.types.iter().position(|t| t.commit_type == value)
    }
}

/// A non-empty group of commits under one heading.
#[derive(Debug)]
pub struct Group<'a> {
    pub key: String,
    pub title: String,
    pub commits: Vec<&'a CommitRecord>,
}

/// Filter, group and sort the commits of one bucket.
///
/// Commits whose type is missing or not listed are dropped, as are commits
/// without a value for the group-by field. Groups follow the type list order
/// (unlisted group values after, by first appearance), and each group is
/// stably sorted by the sort keys.
pub fn group_commits<'a>(
    commits: &[&'a CommitRecord],
    options: &ChangelogOptions,
) -> Vec<Group<'a>> {
    let mut groups: Vec<Group<'a>> = Vec::new();

    for &commit in commits {
        let listed = commit
            .field(&options.type_key)
            .is_some_and(|t| options.title_for(t).is_some());
        if !listed {
            continue;
        }

        let Some(key) = commit.field(&options.group_by).filter(|k| !k.is_empty()) else {
            debug!(
                hash = %commit.short_hash(),
                group_by = %options.group_by,
                "Commit has no group value, skipping"
            );
            continue;
        };
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.commits.push(commit),
            None => groups.push(Group {
                key: key.to_string(),
                title: options.title_for(key).unwrap_or(key).to_string(),
                commits: vec![commit],
            }),
        }
    }

    // Stable: unlisted values keep first-appearance order.
    groups.sort_by_key(|g| options.type_rank(&g.key).unwrap_or(usize::MAX));
    groups.retain(|g| !g.commits.is_empty());

    for group in &mut groups {
        group.commits.sort_by(|a, b| {
            options
                .sort_by
                .iter()
                .map(|key| {
                    a.field(key)
                        .unwrap_or_default()
                        .cmp(b.field(key).unwrap_or_default())
                })
                .find(|ord| ord.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    groups
}

/// Render the whole history: header, buckets newest first, footer.
pub fn render(log: &HistoryLog, templates: &TemplateSet, options: &ChangelogOptions) -> String {
    let mut keys = Vec::new();
    if options.include_unreleased && !log.unreleased().is_empty() {
        keys.push(BucketKey::Unreleased);
    }
    keys.extend(log.versions().rev().cloned().map(BucketKey::Version));

    let document_context = document_context(log);
    let mut out = fill(&templates.header, &document_context);
    for key in &keys {
        if let Some(section) = render_bucket(log, key, templates, options) {
            out.push_str(&section);
        }
    }
    out.push_str(&fill(&templates.footer, &document_context));

    debug!(sections = keys.len(), bytes = out.len(), "Rendered changelog");
    out
}

/// Render a single bucket with the main template, or `None` if it does not exist.
pub fn render_bucket(
    log: &HistoryLog,
    key: &BucketKey,
    templates: &TemplateSet,
    options: &ChangelogOptions,
) -> Option<String> {
    let commits = log.commits_for(key)?;

    let mut groups_text = String::new();
    for group in group_commits(&commits, options) {
        groups_text.push_str(&format!("### {}\n\n", group.title));
        for commit in &group.commits {
            groups_text.push_str(&fill(&templates.entry, &entry_context(commit)));
        }
        groups_text.push('\n');
    }

    let mut ctx = Context::new();
    let (version, title, date, previous) = match key {
        BucketKey::Unreleased => (
            String::new(),
            options.unreleased_title.clone(),
            log.unreleased_date(),
            log.versions().next_back().map(ToString::to_string),
        ),
        BucketKey::Version(version) => {
            let bucket = log.bucket(version)?;
            (
                version.to_string(),
                version.to_string(),
                bucket.date,
                log.versions()
                    .take_while(|v| *v < version)
                    .last()
                    .map(ToString::to_string),
            )
        }
    };
    let date = date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let heading = if date.is_empty() {
        format!("[{title}]")
    } else {
        format!("[{title}] - {date}")
    };

    ctx.set("version", version)
        .set("title", title)
        .set("date", date)
        .set("heading", heading)
        .set("previous_version", previous.unwrap_or_default())
        .set("groups", groups_text);

    Some(fill(&templates.main, &ctx))
}

fn document_context(log: &HistoryLog) -> Context {
    let latest = log
        .latest_tag()
        .and_then(|t| t.version.as_ref())
        .map(ToString::to_string)
        .unwrap_or_default();
    let boundaries = log.boundaries();

    let mut ctx = Context::new();
    ctx.set("current_version", latest.clone())
        .set("latest_version", latest)
        .set("from", boundaries.from.clone().unwrap_or_default())
        .set("to", boundaries.to.clone());
    ctx
}

fn entry_context(commit: &CommitRecord) -> Context {
    let mut ctx = Context::new();
    for (name, value) in commit.header_fields() {
        ctx.set(name.clone(), value.clone());
    }

    let scope_prefix = commit
        .field("scope")
        .filter(|s| !s.is_empty())
        .map(|s| format!("**{s}:** "))
        .unwrap_or_default();
    let references = commit
        .references()
        .iter()
        .map(|r| match &r.repository {
            Some(repo) => format!("{repo}{}{}", r.prefix, r.issue),
            None => format!("{}{}", r.prefix, r.issue),
        })
        .collect::<Vec<_>>()
        .join(", ");
    let breaking = commit
        .notes()
        .iter()
        .map(|n| n.text.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    ctx.set("hash", commit.hash())
        .set("short_hash", commit.short_hash())
        .set("header", commit.header())
        .set("scope_prefix", scope_prefix)
        .set("references", references)
        .set("breaking", breaking);
    ctx
}
