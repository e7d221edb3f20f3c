//! Error types for semlog modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors detected while compiling or loading configuration.
///
/// These are raised before any commit is processed and abort the whole
/// operation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {name} pattern '{pattern}': {source}")]
    InvalidPattern {
        name: &'static str,
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error(
        "{name} correspondence lists {actual} name(s) but its pattern has {expected} capture group(s)"
    )]
    CorrespondenceMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Empty entry in {list}")]
    EmptyKeyword { list: &'static str },

    #[error("Template not found or unreadable: {}", path.display())]
    MissingTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read config {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A component was used before the history it reads was built.
///
/// This is a contract failure of the calling pipeline, not a user error.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("{operation} requires a built history, but none has been built yet")]
    HistoryNotBuilt { operation: &'static str },
}

/// Errors from a [`crate::session::Session`] pipeline step.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Changelog(#[from] ChangelogError),
}

/// Errors from version operations.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Invalid pre-release label '{label}': {source}")]
    InvalidPrerelease {
        label: String,
        #[source]
        source: semver::Error,
    },
}

/// Errors from changelog operations.
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to read changelog {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write changelog {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stage changelog: {0}")]
    StageFailed(#[source] GitError),
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to parse commit: {0}")]
    ParseCommit(#[source] git2::Error),

    #[error("Failed to walk commit history: {0}")]
    RevwalkError(#[source] git2::Error),

    #[error("Failed to stage {}: {source}", path.display())]
    StageFailed {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_names_both_counts() {
        let err = ConfigError::CorrespondenceMismatch {
            name: "header",
            expected: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("header"));
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_write_failure_reports_path() {
        let err = ChangelogError::WriteFailed {
            path: PathBuf::from("docs/CHANGELOG.md"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("docs/CHANGELOG.md"));
    }

    #[test]
    fn test_precondition_names_operation() {
        let err = PreconditionError::HistoryNotBuilt {
            operation: "version recommendation",
        };
        assert!(err.to_string().starts_with("version recommendation requires"));
    }
}
