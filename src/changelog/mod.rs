//! Changelog grouping, templated rendering and writing.

pub mod render;
pub mod template;
pub mod writer;

pub use render::{ChangelogOptions, Group, TypeTitle, group_commits, render, render_bucket};
pub use template::{TemplatePaths, TemplateSet};
pub use writer::{PREAMBLE, Stager, compose, write_and_stage, write_changelog};
