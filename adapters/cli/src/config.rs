//! Optional TOML configuration for a chase session.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cat_chase_system_pursuit::PursuitConfig;
use serde::Deserialize;

/// Settings read from the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    /// Tuning handed to the pursuit engine.
    pub(crate) pursuit: PursuitConfig,
}

impl SessionConfig {
    /// Loads the file at `path`, or the defaults when no path was given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        log::info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse config toml contents")?;
        config
            .pursuit
            .validate()
            .context("pursuit tuning rejected")?;
        Ok(config)
    }
}
