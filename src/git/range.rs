//! Commit range resolution.

use git2::{Oid, Repository};

use crate::error::GitError;
use crate::history::Boundaries;

/// Resolved commit range. `from` is exclusive, `to` inclusive.
#[derive(Debug, Clone)]
pub struct CommitRange {
    pub from: Option<Oid>,
    pub to: Oid,
    pub from_ref: Option<String>,
    pub to_ref: String,
}

impl CommitRange {
    pub fn boundaries(&self) -> Boundaries {
        Boundaries {
            from: self.from_ref.clone(),
            to: self.to_ref.clone(),
        }
    }
}

/// Resolve a commit range from user-provided references.
///
/// If `from` is None, the range starts at the repository root.
/// If `to` is None, uses HEAD.
pub fn resolve_range(
    repo: &Repository,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<CommitRange, GitError> {
    let to_ref = to.unwrap_or("HEAD");
    let to_oid = resolve_reference(repo, to_ref)?;

    let from_oid = from
        .map(|reference| resolve_reference(repo, reference))
        .transpose()?;

    Ok(CommitRange {
        from: from_oid,
        to: to_oid,
        from_ref: from.map(String::from),
        to_ref: to_ref.to_string(),
    })
}

/// Resolve a reference (tag, branch, commit hash) to an OID.
fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    if let Ok(oid) = Oid::from_str(reference) {
        if repo.find_commit(oid).is_ok() {
            return Ok(oid);
        }
    }

    match repo.revparse_single(reference) {
        Ok(obj) => Ok(obj.peel_to_commit().map_err(GitError::ParseCommit)?.id()),
        Err(e) => Err(GitError::ReferenceNotFound(reference.to_string(), e)),
    }
}
