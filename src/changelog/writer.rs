//! Write the rendered changelog below a preserved preamble.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{ChangelogError, GitError};

/// Marks where generated content starts. Anything above it is hand-written
/// and kept verbatim on every regeneration.
pub const PREAMBLE: &str = "<!-- semlog:changelog -->";

/// Stages a written file with version control.
#[cfg_attr(test, mockall::automock)]
pub trait Stager {
    fn stage(&self, path: &Path) -> Result<(), GitError>;
}

/// Combine existing document content with freshly rendered content.
pub fn compose(existing: Option<&str>, rendered: &str) -> String {
    let kept = match existing {
        Some(content) => match content.find(PREAMBLE) {
            Some(pos) => &content[..pos],
            None => {
                if !content.trim().is_empty() {
                    warn!("Existing changelog has no preamble marker, replacing it entirely");
                }
                ""
            }
        },
        None => "",
    };

    let mut out = String::with_capacity(kept.len() + PREAMBLE.len() + rendered.len() + 1);
    out.push_str(kept);
    out.push_str(PREAMBLE);
    out.push('\n');
    out.push_str(rendered);
    out
}

/// Write `rendered` to `path`, keeping any content above the preamble.
///
/// The file is replaced atomically through a temporary file in the same
/// directory.
pub fn write_changelog(path: &Path, rendered: &str) -> Result<(), ChangelogError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => {
            return Err(ChangelogError::ReadFailed {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let content = compose(existing.as_deref(), rendered);
    let write_failed = |source: std::io::Error| ChangelogError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_failed)?;
    file.write_all(content.as_bytes()).map_err(write_failed)?;
    file.persist(path).map_err(|e| write_failed(e.error))?;

    info!(path = %path.display(), bytes = content.len(), "Wrote changelog");
    Ok(())
}

/// Write the changelog and, when a stager is given, stage it.
pub fn write_and_stage(
    path: &Path,
    rendered: &str,
    stager: Option<&dyn Stager>,
) -> Result<(), ChangelogError> {
    write_changelog(path, rendered)?;
    if let Some(stager) = stager {
        stager.stage(path).map_err(ChangelogError::StageFailed)?;
    }
    Ok(())
}
