//! A release pipeline that carries the last built history between steps.

use std::path::Path;

use tracing::info;

use crate::changelog::{self, Stager, TemplateSet};
use crate::commit::{CommitGrammar, CommitRecord, RawCommit};
use crate::config::Config;
use crate::error::{ConfigError, PreconditionError, SessionError};
use crate::history::{Boundaries, HistoryBuilder, HistoryLog, RawTag};
use crate::version::{self, VersionRecommendation};

/// Compiled configuration plus the history built from it.
///
/// Everything that can fail on configuration fails in [`Session::new`],
/// before any commit is read.
#[derive(Debug)]
pub struct Session {
    config: Config,
    grammar: CommitGrammar,
    templates: TemplateSet,
    history: Option<HistoryLog>,
}

impl Session {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let grammar = CommitGrammar::compile(&config.parser)?;
        let templates = config.load_templates()?;
        Ok(Self {
            config,
            grammar,
            templates,
            history: None,
        })
    }

    /// Parse commits without building a history, honoring `include_invalid`.
    pub fn parse_commits(&self, commits: &[RawCommit]) -> Vec<CommitRecord> {
        self.grammar.parse_all(commits)
    }

    /// Build the history for a range, replacing any previous one.
    pub fn build_history(
        &mut self,
        boundaries: Boundaries,
        commits: Vec<RawCommit>,
        tags: Vec<RawTag>,
    ) -> &HistoryLog {
        let log =
            HistoryBuilder::new(&self.grammar, &self.config.tags).build(boundaries, commits, tags);
        self.history.insert(log)
    }

    /// The last built history.
    pub fn history(&self) -> Result<&HistoryLog, PreconditionError> {
        self.require("history access")
    }

    pub fn recommend_version(&self) -> Result<VersionRecommendation, SessionError> {
        let log = self.require("version recommendation")?;
        Ok(version::recommend(log, &self.config.recommend)?)
    }

    pub fn render_changelog(&self) -> Result<String, PreconditionError> {
        let log = self.require("changelog rendering")?;
        Ok(changelog::render(log, &self.templates, &self.config.changelog))
    }

    /// Render the changelog into `path`, then stage it if a stager is given.
    pub fn write_changelog(
        &self,
        path: &Path,
        stager: Option<&dyn Stager>,
    ) -> Result<(), SessionError> {
        let rendered = self.render_changelog()?;
        changelog::write_and_stage(path, &rendered, stager)?;
        info!(path = %path.display(), "Changelog updated");
        Ok(())
    }

    fn require(&self, operation: &'static str) -> Result<&HistoryLog, PreconditionError> {
        self.history
            .as_ref()
            .ok_or(PreconditionError::HistoryNotBuilt { operation })
    }
}
