//! evigraph configuration loading from `.evigraphrc.toml`.
//!
//! The engine sections map one-to-one onto [`EngineConfig`]; the CLI adds an
//! `[output]` section for display preferences. Every section is optional.
//!
//! # Example Configuration
//!
//! ```toml
//! [endpoint]
//! url = "http://localhost:9999/bigdata/sparql"
//! timeout_secs = 60
//!
//! [fetch]
//! concurrency = 5
//! max_results = 1000
//!
//! [graph]
//! edge_mode = "multigraph"
//!
//! [batch]
//! flush_interval = 500
//! output_dir = "outputs"
//!
//! [output]
//! format = "json"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use evigraph_engine::EngineConfig;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".evigraphrc.toml";

/// Root configuration loaded from `.evigraphrc.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Engine sections (`[endpoint]`, `[fetch]`, `[filter]`, `[graph]`,
    /// `[batch]`, `[prefixes]`).
    #[serde(flatten)]
    pub engine: EngineConfig,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Output formatting preferences. `--format` overrides these.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputSettings {
    /// Valid values: `table`, `json`
    #[serde(default)]
    pub format: Option<String>,
}

impl CliConfig {
    /// Parse TOML text.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load `path`, or `.evigraphrc.toml` in `root` when no path is given.
    ///
    /// A missing default file yields defaults. An unreadable or invalid file
    /// is logged and replaced by defaults, unless `strict` is set, in which
    /// case it is an error. An explicit `path` that does not exist is always
    /// an error.
    pub fn load(root: &Path, path: Option<&Path>, strict: bool) -> anyhow::Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (root.join(CONFIG_FILE), false),
        };

        if !config_path.exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", config_path.display());
            }
            return Ok(Self::default());
        }

        match Self::read(&config_path) {
            Ok(config) => {
                tracing::debug!(path = %config_path.display(), "Loaded config");
                Ok(config)
            }
            Err(e) if strict => Err(e),
            Err(e) => {
                tracing::warn!("{:#}; using defaults", e);
                Ok(Self::default())
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }
}
