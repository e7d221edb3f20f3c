//! Changelog templates and `{{name}}` placeholder substitution.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([\w.]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Document header for new changelogs.
pub const DEFAULT_HEADER: &str = "# Changelog

All notable changes to this project will be documented in this file.

";

/// One section per version.
pub const DEFAULT_MAIN: &str = "## {{heading}}

{{groups}}";

/// One line per commit.
pub const DEFAULT_ENTRY: &str = "- {{scope_prefix}}{{subject}} ({{short_hash}})\n";

pub const DEFAULT_FOOTER: &str = "";

/// The main template plus the header, footer and entry partials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSet {
    pub main: String,
    pub header: String,
    pub footer: String,
    pub entry: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            main: DEFAULT_MAIN.to_string(),
            header: DEFAULT_HEADER.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
            entry: DEFAULT_ENTRY.to_string(),
        }
    }
}

/// Files to load templates from. Unset entries fall back to the built-in
/// defaults; set entries must exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePaths {
    pub main: Option<PathBuf>,
    pub header: Option<PathBuf>,
    pub footer: Option<PathBuf>,
    pub entry: Option<PathBuf>,
}

impl TemplateSet {
    /// Load templates, resolving relative paths against `base`.
    pub fn load(paths: &TemplatePaths, base: &Path) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            main: read_or(paths.main.as_deref(), base, defaults.main)?,
            header: read_or(paths.header.as_deref(), base, defaults.header)?,
            footer: read_or(paths.footer.as_deref(), base, defaults.footer)?,
            entry: read_or(paths.entry.as_deref(), base, defaults.entry)?,
        })
    }
}

fn read_or(path: Option<&Path>, base: &Path, default: String) -> Result<String, ConfigError> {
    let Some(path) = path else {
        return Ok(default);
    };
    let path = base.join(path);
    std::fs::read_to_string(&path).map_err(|source| ConfigError::MissingTemplate { path, source })
}

/// Values available to a template.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Vec<(String, String)>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any earlier one with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Replace every `{{name}}` in `template`. Unknown names render empty.
pub fn fill(template: &str, context: &Context) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            caps.get(1)
                .and_then(|name| context.get(name.as_str()))
                .unwrap_or_default()
                .to_string()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_known_and_unknown() {
        let mut ctx = Context::new();
        ctx.set("version", "1.2.0").set("date", "2026-01-01");
        assert_eq!(
            fill("## {{version}} - {{ date }}{{missing}}", &ctx),
            "## 1.2.0 - 2026-01-01"
        );
    }

    #[test]
    fn test_set_replaces_value() {
        let mut ctx = Context::new();
        ctx.set("a", "1").set("a", "2");
        assert_eq!(ctx.get("a"), Some("2"));
    }

    #[test]
    fn test_load_missing_template_names_path() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let paths = TemplatePaths {
            entry: Some(PathBuf::from("entry.hbs")),
            ..TemplatePaths::default()
        };
        let err = TemplateSet::load(&paths, dir.path()).unwrap_err();
        assert!(err.to_string().contains("entry.hbs"));
    }

    #[test]
    fn test_load_reads_given_files() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("header.md"), "# History\n").unwrap();
        let paths = TemplatePaths {
            header: Some(PathBuf::from("header.md")),
            ..TemplatePaths::default()
        };
        let set = TemplateSet::load(&paths, dir.path()).unwrap();
        assert_eq!(set.header, "# History\n");
        assert_eq!(set.entry, DEFAULT_ENTRY);
    }
}
