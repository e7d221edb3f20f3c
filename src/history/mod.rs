//! Commit history partitioned into version buckets.

pub mod builder;
pub mod tag;

pub use builder::{Boundaries, Bucket, BucketKey, HistoryBuilder, HistoryLog};
pub use tag::{RawTag, Tag, TagOptions, get_version_from_tag};
