//! Configuration file loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::changelog::{ChangelogOptions, TemplatePaths, TemplateSet};
use crate::commit::ParserOptions;
use crate::error::ConfigError;
use crate::history::TagOptions;
use crate::version::RecommendOptions;

/// Config file looked up in the current directory when no path is given.
pub const CONFIG_FILE: &str = ".semlog.json";

/// The complete configuration, one section per component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserOptions,
    pub tags: TagOptions,
    pub recommend: RecommendOptions,
    pub changelog: ChangelogOptions,
    pub templates: TemplatePaths,
    /// Directory relative template paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `.semlog.json` in the current
    /// directory is used if present, and the defaults if not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.exists() {
                    debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&text).map_err(|source| ConfigError::Invalid {
                path: path.clone(),
                source,
            })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load the configured templates, falling back to the built-in ones.
    pub fn load_templates(&self) -> Result<TemplateSet, ConfigError> {
        TemplateSet::load(&self.templates, &self.base_dir)
    }
}
