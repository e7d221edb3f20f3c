//! Tag enumeration.

use git2::Repository;
use tracing::{debug, warn};

use crate::error::GitError;
use crate::history::RawTag;

/// List every tag with the commit it points at.
pub fn list_tags(repo: &Repository) -> Result<Vec<RawTag>, GitError> {
    let mut tags = Vec::new();

    repo.tag_foreach(|oid, name_bytes| {
        if let Ok(name_str) = std::str::from_utf8(name_bytes) {
            let name = name_str
                .strip_prefix("refs/tags/")
                .unwrap_or(name_str)
                .to_string();

            // Annotated tags point at a tag object, lightweight ones at the commit.
            let resolved_oid = match repo.find_tag(oid) {
                Ok(tag_obj) => tag_obj.target_id(),
                Err(e) => {
                    debug!(
                        tag = %name,
                        error = %e,
                        "Could not resolve annotated tag, using raw OID. \
                         This is normal for lightweight tags."
                    );
                    oid
                }
            };

            tags.push(RawTag::new(name, resolved_oid.to_string()));
        } else {
            warn!("Skipping tag with OID {} - name is not valid UTF-8", oid);
        }
        true
    })
    .map_err(GitError::RevwalkError)?;

    Ok(tags)
}
