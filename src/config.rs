//! Configuration for the `sdosource` binary.
//!
//! [`Config::load`] reads an optional user TOML file. Every key is optional;
//! anything left out keeps the value [`Config::defaults`] returns, which for
//! the `[defaults]` section is [`BaseMapDefaults::default`].
//!
//! ```toml
//! [defaults]
//! colormap = "gray"
//!
//! [defaults.normalization]
//! vmin = 5.0
//! vmax = 1024.0
//! clip = true
//!
//! [output]
//! format = "table"   # or "json"
//! ```

use crate::properties::{BaseMapDefaults, Normalization};
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[defaults]` section: values every map starts from before a data source
/// overlays its own.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub colormap: String,
    pub normalization: Normalization,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let base = BaseMapDefaults::default();
        Self {
            colormap: base.colormap,
            normalization: base.normalization,
        }
    }
}

impl From<&DefaultsConfig> for BaseMapDefaults {
    fn from(cfg: &DefaultsConfig) -> Self {
        BaseMapDefaults {
            colormap: cfg.colormap.clone(),
            normalization: cfg.normalization,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load `path` over the defaults, or just the defaults when `None`.
    /// A missing user file is an error; a missing key falls back to its default.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        builder.build()?.try_deserialize().map_err(Into::into)
    }

    /// The built-in defaults, without touching the filesystem.
    pub fn defaults() -> Self {
        Self::default()
    }
}
