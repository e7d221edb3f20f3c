//! Commit grammar configuration and its compiled form.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::keywords::KeywordMatcher;

fn default_header_pattern() -> String {
    r"^(\w*)(?:\((.*)\))?!?: (.*)$".to_string()
}

fn default_breaking_header_pattern() -> Option<String> {
    Some(r"^(\w*)(?:\((.*)\))?!: (.*)$".to_string())
}

fn default_header_correspondence() -> Vec<String> {
    vec!["type".to_string(), "scope".to_string(), "subject".to_string()]
}

fn default_field_pattern() -> String {
    r"^-(.*?)-$".to_string()
}

fn default_revert_pattern() -> String {
    r#"^(?:Revert|revert:)\s"?([\s\S]+?)"?\s*This reverts commit (\w*)\."#.to_string()
}

fn default_revert_correspondence() -> Vec<String> {
    vec!["header".to_string(), "hash".to_string()]
}

fn default_note_keywords() -> Vec<String> {
    vec!["BREAKING CHANGE".to_string(), "BREAKING-CHANGE".to_string()]
}

fn default_reference_actions() -> Vec<String> {
    [
        "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves", "resolved",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_issue_prefixes() -> Vec<String> {
    vec!["#".to_string()]
}

fn default_mention_prefixes() -> Vec<String> {
    vec!["@".to_string()]
}

/// String-configured commit grammar.
///
/// Compile it with [`CommitGrammar::compile`] before parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub header_pattern: String,
    pub header_correspondence: Vec<String>,
    /// Header form that marks a breaking change with `!`.
    pub breaking_header_pattern: Option<String>,
    pub field_pattern: String,
    pub revert_pattern: String,
    pub revert_correspondence: Vec<String>,
    pub merge_pattern: Option<String>,
    pub merge_correspondence: Vec<String>,
    pub note_keywords: Vec<String>,
    pub reference_actions: Vec<String>,
    pub issue_prefixes: Vec<String>,
    pub mention_prefixes: Vec<String>,
    pub include_invalid: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            header_pattern: default_header_pattern(),
            header_correspondence: default_header_correspondence(),
            breaking_header_pattern: default_breaking_header_pattern(),
            field_pattern: default_field_pattern(),
            revert_pattern: default_revert_pattern(),
            revert_correspondence: default_revert_correspondence(),
            merge_pattern: None,
            merge_correspondence: Vec::new(),
            note_keywords: default_note_keywords(),
            reference_actions: default_reference_actions(),
            issue_prefixes: default_issue_prefixes(),
            mention_prefixes: default_mention_prefixes(),
            include_invalid: false,
        }
    }
}

/// A pattern with the names bound to its capture groups, in order.
#[derive(Debug, Clone)]
pub(crate) struct BoundPattern {
    pub regex: Regex,
    pub names: Vec<String>,
}

impl BoundPattern {
    fn compile(
        name: &'static str,
        pattern: &str,
        names: &[String],
    ) -> Result<Self, ConfigError> {
        let regex = compile(name, pattern)?;
        let expected = regex.captures_len() - 1;
        if expected != names.len() {
            return Err(ConfigError::CorrespondenceMismatch {
                name,
                expected,
                actual: names.len(),
            });
        }
        Ok(Self {
            regex,
            names: names.iter().map(|n| n.trim().to_lowercase()).collect(),
        })
    }

    /// Bind the capture groups of the first match to their names.
    ///
    /// Groups that did not participate in the match are left out.
    pub fn bind(&self, text: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(text)?;
        Some(
            self.names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (name.clone(), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

/// The compiled, validated grammar used by the parser.
#[derive(Debug, Clone)]
pub struct CommitGrammar {
    pub(crate) header: BoundPattern,
    pub(crate) breaking_header: Option<Regex>,
    pub(crate) field: Regex,
    pub(crate) revert: BoundPattern,
    pub(crate) merge: Option<BoundPattern>,
    pub(crate) notes: KeywordMatcher,
    pub(crate) actions: KeywordMatcher,
    pub(crate) references: Regex,
    pub(crate) mentions: Option<Regex>,
    pub(crate) include_invalid: bool,
}

impl CommitGrammar {
    /// Compile every pattern once and check that each correspondence list
    /// lines up with its pattern's capture groups.
    pub fn compile(options: &ParserOptions) -> Result<Self, ConfigError> {
        let header = BoundPattern::compile(
            "header",
            &options.header_pattern,
            &options.header_correspondence,
        )?;

        let breaking_header = match &options.breaking_header_pattern {
            Some(pattern) => {
                let regex = compile("breaking header", pattern)?;
                let expected = regex.captures_len() - 1;
                if expected != header.names.len() {
                    return Err(ConfigError::CorrespondenceMismatch {
                        name: "breaking header",
                        expected,
                        actual: header.names.len(),
                    });
                }
                Some(regex)
            }
            None => None,
        };

        let field = compile("field", &options.field_pattern)?;
        let revert = BoundPattern::compile(
            "revert",
            &options.revert_pattern,
            &options.revert_correspondence,
        )?;
        let merge = options
            .merge_pattern
            .as_deref()
            .map(|pattern| BoundPattern::compile("merge", pattern, &options.merge_correspondence))
            .transpose()?;

        check_entries("note keywords", &options.note_keywords)?;
        check_entries("reference actions", &options.reference_actions)?;
        check_entries("issue prefixes", &options.issue_prefixes)?;
        check_entries("mention prefixes", &options.mention_prefixes)?;

        if options.issue_prefixes.is_empty() {
            return Err(ConfigError::EmptyKeyword {
                list: "issue prefixes",
            });
        }

        let references = compile("reference", &reference_pattern(&options.issue_prefixes))?;
        let mentions = if options.mention_prefixes.is_empty() {
            None
        } else {
            Some(compile(
                "mention",
                &mention_pattern(&options.mention_prefixes),
            )?)
        };

        Ok(Self {
            header,
            breaking_header,
            field,
            revert,
            merge,
            notes: KeywordMatcher::new(options.note_keywords.iter().cloned()),
            actions: KeywordMatcher::new(options.reference_actions.iter().cloned()),
            references,
            mentions,
            include_invalid: options.include_invalid,
        })
    }

    pub fn include_invalid(&self) -> bool {
        self.include_invalid
    }
}

fn compile(name: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        name,
        pattern: pattern.to_string(),
        source,
    })
}

fn check_entries(list: &'static str, entries: &[String]) -> Result<(), ConfigError> {
    if entries.iter().any(|e| e.trim().is_empty()) {
        return Err(ConfigError::EmptyKeyword { list });
    }
    Ok(())
}

/// `[owner/repo]<prefix><token>`, with the prefix alternatives longest first.
fn reference_pattern(prefixes: &[String]) -> String {
    format!(
        r"(?i)(?:\b([\w.-]+/[\w.-]+))?({})([\w-]+)",
        alternation(prefixes)
    )
}

fn mention_pattern(prefixes: &[String]) -> String {
    format!(r"(?:^|[^\w])({})([\w-]+)", alternation(prefixes))
}

fn alternation(prefixes: &[String]) -> String {
    let mut sorted: Vec<&String> = prefixes.iter().collect();
    sorted.sort_by_key(|p| std::cmp::Reverse(p.len()));
    sorted
        .iter()
        .map(|p| regex_lite::escape(p))
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_compile() {
        let grammar = CommitGrammar::compile(&ParserOptions::default()).unwrap();
        assert_eq!(grammar.header.names, ["type", "scope", "subject"]);
        assert!(!grammar.include_invalid());
    }

    #[test]
    fn test_header_correspondence_too_short() {
        let options = ParserOptions {
            header_correspondence: vec!["type".to_string(), "subject".to_string()],
            ..ParserOptions::default()
        };
        let err = CommitGrammar::compile(&options).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CorrespondenceMismatch {
                name: "header",
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_merge_correspondence_checked_when_pattern_set() {
        let options = ParserOptions {
            merge_pattern: Some(r"^Merge pull request #(\d+) from (.*)$".to_string()),
            merge_correspondence: vec!["id".to_string()],
            ..ParserOptions::default()
        };
        let err = CommitGrammar::compile(&options).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::CorrespondenceMismatch { name: "merge", .. }
        ));
    }

    #[test]
    fn test_malformed_pattern_is_reported() {
        let options = ParserOptions {
            field_pattern: "^-(.*-$".to_string(),
            ..ParserOptions::default()
        };
        let err = CommitGrammar::compile(&options).unwrap_err();
        assert!(err.to_string().contains("^-(.*-$"));
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let options = ParserOptions {
            note_keywords: vec!["BREAKING CHANGE".to_string(), " ".to_string()],
            ..ParserOptions::default()
        };
        assert!(matches!(
            CommitGrammar::compile(&options),
            Err(ConfigError::EmptyKeyword {
                list: "note keywords"
            })
        ));
    }

    #[test]
    fn test_bind_skips_missing_optional_groups() {
        let grammar = CommitGrammar::compile(&ParserOptions::default()).unwrap();
        let fields = grammar.header.bind("docs: update readme").unwrap();
        assert_eq!(
            fields,
            vec![
                ("type".to_string(), "docs".to_string()),
                ("subject".to_string(), "update readme".to_string()),
            ]
        );
    }
}
