//! Staging generated files in the git index.

use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

use crate::changelog::Stager;
use crate::error::GitError;

/// Stages files through git2's index.
pub struct GitStager<'r> {
    repo: &'r Repository,
}

impl<'r> GitStager<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }

    fn relative_path(&self, path: &Path) -> Result<PathBuf, GitError> {
        let failed = |message: String| GitError::StageFailed {
            path: path.to_path_buf(),
            source: git2::Error::from_str(&message),
        };

        let workdir = self
            .repo
            .workdir()
            .ok_or_else(|| failed("repository has no working directory".to_string()))?;
        let workdir = workdir
            .canonicalize()
            .map_err(|e| failed(e.to_string()))?;
        let absolute = path.canonicalize().map_err(|e| failed(e.to_string()))?;

        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| failed("path is outside the working directory".to_string()))
    }
}

impl Stager for GitStager<'_> {
    fn stage(&self, path: &Path) -> Result<(), GitError> {
        let relative = self.relative_path(path)?;
        let stage_failed = |source: git2::Error| GitError::StageFailed {
            path: path.to_path_buf(),
            source,
        };

        let mut index = self.repo.index().map_err(stage_failed)?;
        index.add_path(&relative).map_err(stage_failed)?;
        index.write().map_err(stage_failed)?;

        debug!(path = %relative.display(), "Staged file");
        Ok(())
    }
}
