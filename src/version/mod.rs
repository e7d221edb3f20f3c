//! Version management and semver bumping.

pub mod bump;
pub mod recommend;

pub use bump::{BumpLevel, MinorSignal, apply_bump, determine_bump_level};
pub use recommend::{BuildQuality, RecommendOptions, VersionRecommendation, recommend, recommend_at};
