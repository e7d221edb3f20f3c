//! Git operations using git2-rs.

pub mod commits;
pub mod range;
pub mod stage;
pub mod tags;

pub use commits::fetch_raw_commits;
pub use range::{CommitRange, resolve_range};
pub use stage::GitStager;
pub use tags::list_tags;
