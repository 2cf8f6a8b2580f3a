//! Layered configuration available to modules and commands.
//!
//! Layers, lowest to highest precedence:
//! 1. YAML files named by `--config`, merged in the order given;
//! 2. environment variables `<prefix>SECTION__KEY` (default prefix `APP__`).
//!
//! Two ways to read a typed section:
//!
//! 1. **Strict**: [`ConfigSource::section`] requires the section to be present and valid.
//! 2. **Lenient**: [`ConfigSource::section_or_default`] falls back to `T::default()` when the
//!    section is absent, but still fails when it is present and invalid.

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::de::DeserializeOwned;

use crate::arguments::Arguments;

/// Default environment prefix.
pub const DEFAULT_ENV_PREFIX: &str = "APP__";

/// Environment prefix used to build the [`ConfigSource`]. Bound by the core module;
/// override it from an application module to change the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvPrefix(pub String);

impl Default for EnvPrefix {
    fn default() -> Self {
        Self(DEFAULT_ENV_PREFIX.to_owned())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("option '--config' requires a file path")]
    MissingValue,
    #[error("config file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },
    #[error("missing config section '{section}'")]
    MissingSection { section: String },
    #[error("invalid config section '{section}': {source}")]
    Invalid {
        section: String,
        #[source]
        source: Box<figment::Error>,
    },
}

/// Merged configuration tree.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    figment: Figment,
}

impl ConfigSource {
    /// Build from `--config` files and the environment.
    ///
    /// # Errors
    /// `ConfigError::MissingValue` if a `--config` option has no path,
    /// `ConfigError::MissingFile` if a `--config` path is not a file.
    pub fn load(args: &Arguments, env_prefix: &str) -> Result<Self, ConfigError> {
        if args.config_value_missing() {
            return Err(ConfigError::MissingValue);
        }
        let mut figment = Figment::new();
        for path in args.config_paths() {
            if !path.is_file() {
                return Err(ConfigError::MissingFile { path: path.clone() });
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(env_prefix).split("__"));
        Ok(Self { figment })
    }

    /// Wrap an existing figment (tests, embedding applications).
    #[must_use]
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    #[must_use]
    pub fn figment(&self) -> &Figment {
        &self.figment
    }

    #[must_use]
    pub fn contains(&self, section: &str) -> bool {
        self.figment.contains(section)
    }

    /// Strict typed section.
    ///
    /// # Errors
    /// `MissingSection` if absent, `Invalid` if it cannot be deserialized into `T`.
    pub fn section<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
        if !self.contains(section) {
            return Err(ConfigError::MissingSection {
                section: section.to_owned(),
            });
        }
        self.extract(section)
    }

    /// Lenient typed section.
    ///
    /// # Errors
    /// `Invalid` if the section exists but cannot be deserialized into `T`.
    pub fn section_or_default<T: DeserializeOwned + Default>(
        &self,
        section: &str,
    ) -> Result<T, ConfigError> {
        if !self.contains(section) {
            return Ok(T::default());
        }
        self.extract(section)
    }

    fn extract<T: DeserializeOwned>(&self, section: &str) -> Result<T, ConfigError> {
        self.figment
            .extract_inner(section)
            .map_err(|e| ConfigError::Invalid {
                section: section.to_owned(),
                source: Box::new(e),
            })
    }
}
