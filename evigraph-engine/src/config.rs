//! Engine configuration.
//!
//! Every section is optional when deserialized; missing values fall back to
//! the defaults documented on each field. Call [`EngineConfig::validate`] once
//! after loading and overriding, before constructing any engine component.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use evigraph_core::{EdgeMode, PredicateBlocklist, DEFAULT_EXCLUDED_PREDICATES};

use crate::error::ConfigError;

/// Root engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Remote SPARQL endpoint.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Fetch concurrency and result caps.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Predicate blocklist.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Graph construction.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Batch driver and checkpoint output.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Namespace prefixes.
    #[serde(default)]
    pub prefixes: PrefixConfig,
}

/// Remote endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// SPARQL query URL.
    ///
    /// Default: `http://localhost:9999/bigdata/sparql`
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Per-request timeout in seconds. Hung calls end here.
    ///
    /// Default: `60`
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint_url() -> String {
    "http://localhost:9999/bigdata/sparql".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Neighborhood fetches in flight, per record and process-wide.
    ///
    /// Default: `5`
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Identifier lookups in flight per record.
    ///
    /// Default: `5`
    #[serde(default = "default_concurrency")]
    pub resolve_concurrency: usize,

    /// Maximum triples requested per entity (`LIMIT` of the neighborhood query).
    ///
    /// Default: `1000`
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_concurrency() -> usize {
    5
}

fn default_max_results() -> usize {
    1000
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            resolve_concurrency: default_concurrency(),
            max_results: default_max_results(),
        }
    }
}

/// Predicate exclusion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Case-insensitive substrings; a predicate containing any is dropped.
    ///
    /// Default: the built-in exclusion list.
    #[serde(default = "default_exclude_predicates")]
    pub exclude_predicates: Vec<String>,
}

fn default_exclude_predicates() -> Vec<String> {
    DEFAULT_EXCLUDED_PREDICATES
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_predicates: default_exclude_predicates(),
        }
    }
}

/// Graph construction settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// How repeated `(subject, object)` pairs are stored.
    ///
    /// Default: `multigraph`
    #[serde(default)]
    pub edge_mode: EdgeMode,
}

/// Batch driver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Attempted records between intermediate checkpoints.
    ///
    /// Default: `500`
    #[serde(default = "default_flush_interval")]
    pub flush_interval: usize,

    /// Records processed concurrently.
    ///
    /// Default: `1`
    #[serde(default = "default_record_concurrency")]
    pub record_concurrency: usize,

    /// Directory for `final_results.json`.
    ///
    /// Default: `outputs`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory for `intermediate_results_batch_<n>.json`.
    ///
    /// Default: `outputs/intermediate`
    #[serde(default = "default_intermediate_dir")]
    pub intermediate_dir: PathBuf,

    /// Process only the first N records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn default_flush_interval() -> usize {
    500
}

fn default_record_concurrency() -> usize {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_intermediate_dir() -> PathBuf {
    PathBuf::from("outputs/intermediate")
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            flush_interval: default_flush_interval(),
            record_concurrency: default_record_concurrency(),
            output_dir: default_output_dir(),
            intermediate_dir: default_intermediate_dir(),
            limit: None,
        }
    }
}

/// Prefix declarations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefixConfig {
    /// Optional prefix file (`name: <namespace>` per line) merged over the
    /// built-in prefixes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl EngineConfig {
    /// Check every setting once; components assume a validated config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("endpoint.timeout_secs", self.endpoint.timeout_secs as usize),
            ("fetch.concurrency", self.fetch.concurrency),
            ("fetch.resolve_concurrency", self.fetch.resolve_concurrency),
            ("fetch.max_results", self.fetch.max_results),
            ("batch.flush_interval", self.batch.flush_interval),
            ("batch.record_concurrency", self.batch.record_concurrency),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }
        if self.batch.limit == Some(0) {
            return Err(ConfigError::Zero {
                field: "batch.limit",
            });
        }

        validate_endpoint(&self.endpoint.url)?;
        self.blocklist()?;
        Ok(())
    }

    /// Build the predicate blocklist from `[filter]`.
    pub fn blocklist(&self) -> Result<PredicateBlocklist, ConfigError> {
        Ok(PredicateBlocklist::new(&self.filter.exclude_predicates)?)
    }
}

fn validate_endpoint(url: &str) -> Result<(), ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: "URL is empty".to_string(),
        });
    }
    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: "missing scheme".to_string(),
        });
    };
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        });
    }
    if rest.is_empty() {
        return Err(ConfigError::InvalidEndpoint {
            url: url.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(())
}
