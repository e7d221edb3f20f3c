//! Conventional commit parsing against a compiled [`CommitGrammar`].

use tracing::debug;

use super::grammar::CommitGrammar;
use super::record::{CommitRecord, CommitRecordBuilder, Note, RawCommit, Reference};

/// Result of parsing one commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Parsed(CommitRecord),
    /// The header did not match and the message is neither a revert nor a merge.
    /// The record keeps the body and raw text but has no header fields.
    Invalid(CommitRecord),
}

impl ParseOutcome {
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    pub fn into_record(self) -> CommitRecord {
        match self {
            Self::Parsed(record) | Self::Invalid(record) => record,
        }
    }
}

impl CommitGrammar {
    /// Parse a bare commit message with no hash or decorations.
    pub fn parse_message(&self, message: &str) -> ParseOutcome {
        self.parse(&RawCommit::new("", message))
    }

    /// Parse one raw commit entry.
    pub fn parse(&self, raw: &RawCommit) -> ParseOutcome {
        let mut builder = CommitRecordBuilder {
            hash: raw.hash.clone(),
            raw: raw.message.clone(),
            timestamp: raw.timestamp,
            ..CommitRecordBuilder::default()
        };
        split_decorations(&raw.decorations, &mut builder);

        let normalized = raw.message.replace("\r\n", "\n");
        let text = normalized.trim_end();
        let lines: Vec<&str> = text
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .collect();

        if lines.is_empty() {
            return ParseOutcome::Invalid(builder.build());
        }

        let mut header_idx = 0;
        if let Some(merge) = &self.merge {
            if let Some(fields) = merge.bind(lines[0]) {
                builder.is_merge = true;
                builder.merge_fields = fields.into_iter().collect();
                header_idx = lines
                    .iter()
                    .skip(1)
                    .position(|line| !line.trim().is_empty())
                    .map_or(0, |i| i + 1);
            }
        }

        let header = lines[header_idx];
        builder.header = header.to_string();
        if let Some(fields) = self.header.bind(header) {
            builder.header_fields = fields.into_iter().collect();
        }

        let full = lines.join("\n");
        if let Some(fields) = self.revert.bind(&full) {
            builder.is_revert = true;
            builder.reverted_hash = fields
                .iter()
                .find(|(name, _)| name == "hash")
                .or_else(|| fields.last())
                .map(|(_, value)| value.clone());
            builder.revert_fields = fields.into_iter().collect();
        }

        let rest = if header_idx == 0 && builder.is_merge {
            &lines[1..]
        } else {
            &lines[header_idx + 1..]
        };
        self.parse_sections(rest, &mut builder);

        if builder.notes.is_empty() {
            self.apply_breaking_header(header, &mut builder);
        }

        let mut references = self.extract_references(header, false);
        for line in rest {
            references.extend(self.extract_references(line, true));
        }
        builder.references = dedup(references);
        builder.mentions = self.extract_mentions(&full);

        let valid = !builder.header_fields.is_empty();
        let kept = valid || builder.is_revert || builder.is_merge;
        let record = builder.build();

        if kept {
            ParseOutcome::Parsed(record)
        } else {
            ParseOutcome::Invalid(record)
        }
    }

    /// Parse a batch of commits, dropping invalid ones unless the grammar
    /// was configured to include them.
    pub fn parse_all<'a, I>(&self, commits: I) -> Vec<CommitRecord>
    where
        I: IntoIterator<Item = &'a RawCommit>,
    {
        let mut dropped = 0usize;
        let records: Vec<CommitRecord> = commits
            .into_iter()
            .filter_map(|raw| match self.parse(raw) {
                ParseOutcome::Parsed(record) => Some(record),
                ParseOutcome::Invalid(record) if self.include_invalid => Some(record),
                ParseOutcome::Invalid(_) => {
                    debug!(
                        hash = %raw.hash,
                        "Dropping commit that does not match the header grammar"
                    );
                    dropped += 1;
                    None
                }
            })
            .collect();

        if dropped > 0 {
            debug!(dropped, "Invalid commits dropped");
        }

        records
    }

    /// Split the lines after the header into body, footer, notes and fields.
    fn parse_sections(&self, lines: &[&str], builder: &mut CommitRecordBuilder) {
        let mut body = Vec::new();
        let mut footer = Vec::new();
        let mut in_footer = false;
        let mut current_note: Option<usize> = None;
        let mut current_field: Option<String> = None;

        for &line in lines {
            if let Some(name) = self
                .field
                .captures(line.trim())
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
            {
                builder.fields.insert(name.clone(), String::new());
                current_field = Some(name);
                current_note = None;
                continue;
            }

            let note = self.match_note(line);
            if note.is_some() {
                current_field = None;
            }

            if let Some(name) = &current_field {
                if let Some(value) = builder.fields.get_mut(name) {
                    push_line(value, line);
                }
                continue;
            }

            if let Some(note) = note {
                in_footer = true;
                builder.notes.push(note);
                current_note = Some(builder.notes.len() - 1);
                footer.push(line);
                continue;
            }

            if self.is_action_line(line) {
                in_footer = true;
                current_note = None;
                footer.push(line);
                continue;
            }

            if in_footer {
                footer.push(line);
                if let Some(i) = current_note {
                    push_line(&mut builder.notes[i].text, line);
                }
            } else {
                body.push(line);
            }
        }

        for note in &mut builder.notes {
            note.text = note.text.trim().to_string();
        }
        for value in builder.fields.values_mut() {
            *value = value.trim().to_string();
        }
        if builder.hash.is_empty() {
            if let Some(hash) = builder.fields.get("hash") {
                builder.hash = hash.clone();
            }
        }

        builder.body = join_section(&body);
        builder.footer = join_section(&footer);
    }

    /// Recognize a note: leading `*`, `|` or whitespace, a note keyword, then
    /// `:` or whitespace.
    fn match_note(&self, line: &str) -> Option<Note> {
        let lead = line.len()
            - line
                .trim_start_matches(|c: char| c.is_whitespace() || c == '*' || c == '|')
                .len();
        let rest = &line[lead..];
        let hit = self.notes.match_prefix(rest)?;
        let after = &rest[hit.end..];
        if !(after.starts_with(':') || after.starts_with(char::is_whitespace)) {
            return None;
        }

        Some(Note {
            title: hit.keyword.to_string(),
            text: after
                .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
                .to_string(),
        })
    }

    /// A line where an action keyword is followed by at least one reference.
    fn is_action_line(&self, line: &str) -> bool {
        self.extract_references(line, true)
            .iter()
            .any(|r| r.action.is_some())
    }

    fn apply_breaking_header(&self, header: &str, builder: &mut CommitRecordBuilder) {
        let Some(regex) = &self.breaking_header else {
            return;
        };
        let Some(caps) = regex.captures(header) else {
            return;
        };
        let subject = (1..caps.len())
            .rev()
            .find_map(|i| caps.get(i))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let title = self.notes.first().unwrap_or("BREAKING CHANGE").to_string();
        builder.notes.push(Note {
            title,
            text: subject,
        });
    }

    /// Extract references from one line. With `with_actions`, each reference
    /// is attributed to the nearest preceding action keyword on the line.
    pub(crate) fn extract_references(&self, line: &str, with_actions: bool) -> Vec<Reference> {
        let actions = if with_actions {
            self.actions.find_all(line)
        } else {
            Vec::new()
        };

        let bytes = line.as_bytes();
        let mut references = Vec::new();

        for caps in self.references.captures_iter(line) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let repository = caps.get(1).map(|m| m.as_str().to_string());
            if repository.is_none()
                && whole.start() > 0
                && bytes[whole.start() - 1].is_ascii_alphanumeric()
            {
                continue;
            }

            let (Some(prefix), Some(issue)) = (caps.get(2), caps.get(3)) else {
                continue;
            };

            let action = actions
                .iter()
                .filter(|a| a.end <= whole.start())
                .last()
                .map(|a| a.text.to_string());

            references.push(Reference {
                action,
                repository,
                prefix: prefix.as_str().to_string(),
                issue: issue.as_str().to_string(),
                raw: whole.as_str().to_string(),
            });
        }

        references
    }

    fn extract_mentions(&self, text: &str) -> Vec<String> {
        let Some(regex) = &self.mentions else {
            return Vec::new();
        };
        let mut mentions: Vec<String> = Vec::new();
        for caps in regex.captures_iter(text) {
            if let Some(name) = caps.get(2) {
                let name = name.as_str().to_string();
                if !mentions.contains(&name) {
                    mentions.push(name);
                }
            }
        }
        mentions
    }
}

fn split_decorations(decorations: &[String], builder: &mut CommitRecordBuilder) {
    for decoration in decorations {
        let decoration = decoration.trim();
        if let Some(tag) = decoration.strip_prefix("tag: ") {
            builder.tags.push(tag.trim().to_string());
        } else if let Some(branch) = decoration.strip_prefix("HEAD -> ") {
            builder.branches.push(branch.trim().to_string());
        } else if !decoration.is_empty() && decoration != "HEAD" {
            builder.branches.push(decoration.to_string());
        }
    }
}

fn push_line(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push('\n');
    }
    target.push_str(line);
}

fn join_section(lines: &[&str]) -> Option<String> {
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn dedup(references: Vec<Reference>) -> Vec<Reference> {
    let mut unique: Vec<Reference> = Vec::with_capacity(references.len());
    for reference in references {
        let seen = unique.iter().any(|r| {
            r.action == reference.action
                && r.repository == reference.repository
                && r.prefix == reference.prefix
                && r.issue == reference.issue
        });
        if !seen {
            unique.push(reference);
        }
    }
    unique
}
