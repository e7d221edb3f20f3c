//! Raw commit fetching with ref decorations.

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use git2::{Commit, Oid, Repository};
use tracing::warn;

use crate::commit::RawCommit;
use crate::error::GitError;

use super::range::CommitRange;

/// Build a [`RawCommit`] from a git2 commit.
pub fn raw_commit(commit: &Commit, decorations: Vec<String>) -> RawCommit {
    let time = commit.time();
    RawCommit {
        hash: commit.id().to_string(),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        decorations,
        timestamp: Utc.timestamp_opt(time.seconds(), 0).single(),
    }
}

/// Fetch commits in `range`, newest first.
///
/// The start of the range is exclusive; without one the walk runs to the
/// repository root.
pub fn fetch_raw_commits(
    repo: &Repository,
    range: &CommitRange,
) -> Result<Vec<RawCommit>, GitError> {
    let mut decorations = collect_decorations(repo)?;

    let mut revwalk = repo.revwalk().map_err(GitError::RevwalkError)?;
    revwalk
        .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)
        .map_err(GitError::RevwalkError)?;
    revwalk.push(range.to).map_err(GitError::RevwalkError)?;
    if let Some(from) = range.from {
        revwalk.hide(from).map_err(GitError::RevwalkError)?;
    }

    let mut commits = Vec::new();
    for oid_result in revwalk {
        let oid = oid_result.map_err(GitError::RevwalkError)?;
        let commit = repo.find_commit(oid).map_err(GitError::ParseCommit)?;
        let labels = decorations.remove(&oid).unwrap_or_default();
        commits.push(raw_commit(&commit, labels));
    }

    Ok(commits)
}

/// Map each commit to the refs pointing at it, in `git log --decorate` style.
fn collect_decorations(repo: &Repository) -> Result<HashMap<Oid, Vec<String>>, GitError> {
    let head_branch = repo
        .head()
        .ok()
        .filter(|head| head.is_branch())
        .and_then(|head| head.shorthand().map(String::from));

    let mut map: HashMap<Oid, Vec<String>> = HashMap::new();
    for reference in repo.references().map_err(GitError::RevwalkError)? {
        let reference = match reference {
            Ok(reference) => reference,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable reference");
                continue;
            }
        };
        let Some(name) = reference.shorthand() else {
            continue;
        };
        let Ok(commit) = reference.peel_to_commit() else {
            continue;
        };

        let label = if reference.is_tag() {
            format!("tag: {name}")
        } else if reference.is_branch() && head_branch.as_deref() == Some(name) {
            format!("HEAD -> {name}")
        } else if reference.is_branch() || reference.is_remote() {
            name.to_string()
        } else {
            continue;
        };
        map.entry(commit.id()).or_default().push(label);
    }

    for labels in map.values_mut() {
        labels.sort();
    }
    Ok(map)
}
