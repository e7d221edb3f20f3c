//! Tag metadata and semver detection.

use semver::Version;
use serde::{Deserialize, Serialize};

/// A tag as listed by the version-control collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTag {
    pub name: String,
    pub hash: String,
}

impl RawTag {
    pub fn new(name: impl Into<String>, hash: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: hash.into(),
        }
    }
}

fn default_prefix() -> Option<String> {
    Some("v".to_string())
}

/// How tag names map to versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagOptions {
    /// Optional prefix stripped before parsing, e.g. `v` in `v1.2.3`.
    pub prefix: Option<String>,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

/// A git tag with optional semver version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub hash: String,
    pub version: Option<Version>,
}

impl Tag {
    pub fn from_raw(raw: RawTag, options: &TagOptions) -> Self {
        let version = get_version_from_tag(&raw.name, options.prefix.as_deref());
        Self {
            name: raw.name,
            hash: raw.hash,
            version,
        }
    }

    /// A tagged version without a pre-release label.
    pub fn is_final(&self) -> bool {
        self.version.as_ref().is_some_and(|v| v.pre.is_empty())
    }
}

/// Extract a semver version from a tag name.
///
/// The prefix is optional: with prefix `v` both "v1.2.3" and "1.2.3" parse.
pub fn get_version_from_tag(tag_name: &str, prefix: Option<&str>) -> Option<Version> {
    let version_str = prefix
        .filter(|p| !p.is_empty())
        .and_then(|p| tag_name.strip_prefix(p))
        .unwrap_or(tag_name);
    Version::parse(version_str).ok()
}

/// Whether two commit hashes name the same commit.
///
/// Abbreviated hashes of at least seven characters match their full form.
pub fn hashes_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.len() == long.len() {
        return short.eq_ignore_ascii_case(long);
    }
    short.len() >= 7
        && long
            .get(..short.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(short))
}
