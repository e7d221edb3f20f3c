//! semlog - conventional-commit history parsing, semantic-version
//! recommendation and templated changelogs.
//!
//! # Overview
//!
//! Raw commit text is parsed into [`CommitRecord`]s by a configurable
//! [`CommitGrammar`], partitioned by version tag into a [`HistoryLog`], and
//! then either turned into a [`VersionRecommendation`] or rendered into a
//! changelog document. A [`Session`] threads the built history between steps.

pub mod changelog;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod history;
pub mod session;
pub mod version;

// Re-export commonly used types
pub use changelog::{ChangelogOptions, TemplateSet};
pub use commit::{CommitGrammar, CommitRecord, Note, ParserOptions, RawCommit, Reference};
pub use config::Config;
pub use error::{
    ChangelogError, ConfigError, GitError, PreconditionError, SessionError, VersionError,
};
pub use history::{Boundaries, HistoryBuilder, HistoryLog, RawTag, Tag};
pub use session::Session;
pub use version::{BuildQuality, BumpLevel, RecommendOptions, VersionRecommendation};
