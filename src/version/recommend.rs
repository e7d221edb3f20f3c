//! Next-release recommendation from a built history.

use chrono::{DateTime, Utc};
use semver::{Prerelease, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::VersionError;
use crate::history::HistoryLog;

use super::bump::{BumpLevel, MinorSignal, apply_bump, determine_bump_level};

/// Pre-release channel label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildQuality {
    #[default]
    None,
    Alpha,
    Beta,
    Rc,
    Servicing,
    Hotfix,
    Custom(String),
}

impl BuildQuality {
    /// The pre-release label, `None` for a final release.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Alpha => Some("alpha"),
            Self::Beta => Some("beta"),
            Self::Rc => Some("rc"),
            Self::Servicing => Some("servicing"),
            Self::Hotfix => Some("hotfix"),
            Self::Custom(label) => Some(label.as_str()),
        }
    }
}

impl From<String> for BuildQuality {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Self::None,
            "alpha" => Self::Alpha,
            "beta" => Self::Beta,
            "rc" => Self::Rc,
            "servicing" => Self::Servicing,
            "hotfix" => Self::Hotfix,
            _ => Self::Custom(s.trim().to_string()),
        }
    }
}

impl From<BuildQuality> for String {
    fn from(quality: BuildQuality) -> Self {
        quality.label().unwrap_or("none").to_string()
    }
}

impl std::str::FromStr for BuildQuality {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// Inputs to [`recommend`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendOptions {
    pub minor_signal: MinorSignal,
    pub build_quality: BuildQuality,
    pub build_id: Option<String>,
    /// Interactive (non-CI) builds get a timestamp so two pre-releases of the
    /// same level and quality never collide.
    pub interactive: bool,
    /// Commit of the latest final release; defaults to the latest final tag.
    pub release_hash: Option<String>,
}

/// The four versions reported for a release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecommendation {
    pub current_version: Version,
    pub current_release: Version,
    pub next_release: Version,
    pub recommended_release: Version,
    pub level: BumpLevel,
}

impl std::fmt::Display for VersionRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "CurrentVersion: {}", self.current_version)?;
        writeln!(f, "CurrentRelease: {}", self.current_release)?;
        writeln!(f, "NextRelease: {}", self.next_release)?;
        write!(f, "RecommendedRelease: {}", self.recommended_release)
    }
}

/// Recommend the next release using the current time for interactive builds.
pub fn recommend(
    log: &HistoryLog,
    options: &RecommendOptions,
) -> Result<VersionRecommendation, VersionError> {
    recommend_at(log, options, Utc::now())
}

/// Recommend the next release as of `now`.
///
/// Below 1.0.0 a major change only bumps the minor version. The first
/// release of a labelled build with a major change targets 1.0.0 as its next
/// release, while the recommended pre-release stays on the 0.x line.
pub fn recommend_at(
    log: &HistoryLog,
    options: &RecommendOptions,
    now: DateTime<Utc>,
) -> Result<VersionRecommendation, VersionError> {
    let current_version = log
        .latest_tag()
        .and_then(|t| t.version.clone())
        .unwrap_or_else(|| Version::new(0, 0, 0));

    let final_tag = log.latest_final_tag();
    let current_release = final_tag
        .and_then(|t| t.version.as_ref())
        .map(|v| Version::new(v.major, v.minor, v.patch))
        .unwrap_or_else(|| Version::new(0, 0, 0));

    let release_hash = options
        .release_hash
        .as_deref()
        .or(final_tag.map(|t| t.hash.as_str()));
    let scanned = log.commits_after(release_hash);
    let computed = determine_bump_level(&scanned, &options.minor_signal);

    let level = if current_release.major == 0 && computed == BumpLevel::Major {
        BumpLevel::Minor
    } else {
        computed
    };

    let label = options.build_quality.label().filter(|l| !l.is_empty());
    let next_level = if final_tag.is_none() && label.is_some() && computed == BumpLevel::Major {
        BumpLevel::Major
    } else {
        level
    };

    debug!(
        scanned = scanned.len(),
        computed = %computed,
        level = %level,
        next_level = %next_level,
        "Computed bump level"
    );

    let next_release = apply_bump(&current_release, next_level);
    let mut recommended_release = apply_bump(&current_release, level);

    if let Some(label) = label {
        let mut parts = vec![label.to_string()];
        if let Some(build_id) = options.build_id.as_deref().filter(|id| !id.is_empty()) {
            parts.push(build_id.to_string());
        }
        if options.interactive {
            parts.push(now.format("%Y%m%d%H%M%S").to_string());
        }
        let text = parts.join("-");
        recommended_release.pre =
            Prerelease::new(&text).map_err(|source| VersionError::InvalidPrerelease {
                label: text.clone(),
                source,
            })?;
    }

    Ok(VersionRecommendation {
        current_version,
        current_release,
        next_release,
        recommended_release,
        level,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::commit::{CommitGrammar, ParserOptions, RawCommit};
    use crate::history::{Boundaries, HistoryBuilder, RawTag, TagOptions};

    fn log(commits: Vec<RawCommit>, tags: Vec<RawTag>) -> HistoryLog {
        let grammar = CommitGrammar::compile(&ParserOptions::default()).unwrap();
        let options = TagOptions::default();
        HistoryBuilder::new(&grammar, &options).build(Boundaries::default(), commits, tags)
    }

    fn quality(label: &str) -> RecommendOptions {
        RecommendOptions {
            build_quality: BuildQuality::from(label.to_string()),
            ..RecommendOptions::default()
        }
    }

    #[test]
    fn test_build_quality_parsing() {
        assert_eq!(BuildQuality::from("".to_string()), BuildQuality::None);
        assert_eq!(BuildQuality::from("Beta".to_string()), BuildQuality::Beta);
        assert_eq!(
            BuildQuality::from("nightly".to_string()).label(),
            Some("nightly")
        );
    }

    #[test]
    fn test_scans_only_after_release_commit() {
        let history = log(
            vec![
                RawCommit::new("c3", "fix: after"),
                RawCommit::new("b2", "feat: tagged"),
                RawCommit::new("a1", "feat!: before"),
            ],
            vec![RawTag::new("v2.0.0", "b2")],
        );
        let rec = recommend(&history, &RecommendOptions::default()).unwrap();
        assert_eq!(rec.level, BumpLevel::Patch);
        assert_eq!(rec.recommended_release, Version::new(2, 0, 1));
    }

    #[test]
    fn test_current_version_includes_prereleases() {
        let history = log(
            vec![
                RawCommit::new("c3", "feat: more"),
                RawCommit::new("b2", "fix: rc"),
                RawCommit::new("a1", "feat: base"),
            ],
            vec![RawTag::new("v1.0.0", "a1"), RawTag::new("v1.1.0-rc.1", "b2")],
        );
        let rec = recommend(&history, &RecommendOptions::default()).unwrap();
        assert_eq!(rec.current_version, Version::parse("1.1.0-rc.1").unwrap());
        assert_eq!(rec.current_release, Version::new(1, 0, 0));
        assert_eq!(rec.next_release, Version::new(1, 1, 0));
    }

    #[test]
    fn test_major_downgraded_below_one() {
        let history = log(
            vec![
                RawCommit::new("b2", "feat: x\n\nBREAKING CHANGE: y"),
                RawCommit::new("a1", "feat: base"),
            ],
            vec![RawTag::new("v0.3.0", "a1")],
        );
        let rec = recommend(&history, &quality("beta")).unwrap();
        assert_eq!(rec.level, BumpLevel::Minor);
        assert_eq!(rec.next_release, Version::new(0, 4, 0));
        assert_eq!(rec.recommended_release, Version::parse("0.4.0-beta").unwrap());
    }

    #[test]
    fn test_interactive_builds_get_timestamp() {
        let history = log(vec![RawCommit::new("a1", "fix: x")], Vec::new());
        let options = RecommendOptions {
            build_quality: BuildQuality::Rc,
            build_id: Some("17".to_string()),
            interactive: true,
            ..RecommendOptions::default()
        };
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 9).unwrap();
        let rec = recommend_at(&history, &options, now).unwrap();
        assert_eq!(rec.recommended_release.to_string(), "0.0.1-rc-17-20261019080509");
    }

    #[test]
    fn test_invalid_build_id_is_rejected() {
        let history = log(Vec::new(), Vec::new());
        let options = RecommendOptions {
            build_quality: BuildQuality::Alpha,
            build_id: Some("build_7".to_string()),
            ..RecommendOptions::default()
        };
        assert!(matches!(
            recommend(&history, &options),
            Err(VersionError::InvalidPrerelease { .. })
        ));
    }

    #[test]
    fn test_display_lists_four_values() {
        let history = log(Vec::new(), Vec::new());
        let text = recommend(&history, &RecommendOptions::default())
            .unwrap()
            .to_string();
        assert!(text.contains("CurrentVersion: 0.0.0"));
        assert!(text.contains("RecommendedRelease: 0.0.1"));
    }
}
