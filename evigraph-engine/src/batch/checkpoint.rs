//! Durable JSON checkpoint artifacts.
//!
//! Every artifact is a compact JSON object keyed by record key. Files are
//! written to a `.tmp` sibling first and renamed into place.
//!
//! Artifact names carry no run id, so a run first clears whatever an earlier
//! run left under those names in its directories.

use std::path::{Path, PathBuf};

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CheckpointError, EngineError};
use crate::pipeline::RecordResult;

/// File name of the artifact written after the last record.
pub const FINAL_ARTIFACT: &str = "final_results.json";

const INTERMEDIATE_PREFIX: &str = "intermediate_results_batch_";

fn is_intermediate_artifact(name: &str) -> bool {
    name.strip_prefix(INTERMEDIATE_PREFIX)
        .and_then(|rest| rest.strip_suffix(".json").or_else(|| rest.strip_suffix(".json.tmp")))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// Batch accumulator: record results in completion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResults {
    entries: Vec<(String, RecordResult)>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, result: RecordResult) {
        self.entries.push((key, result));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecordResult)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }
}

impl Serialize for BatchResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, result) in &self.entries {
            map.serialize_entry(key, result)?;
        }
        map.end()
    }
}

/// Read an artifact back, keeping file order.
pub fn read_artifact(path: &Path) -> Result<BatchResults, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_err = |source| EngineError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&text).map_err(parse_err)?;

    let mut results = BatchResults::new();
    for (key, value) in map {
        let result: RecordResult = serde_json::from_value(value).map_err(parse_err)?;
        results.insert(key, result);
    }
    Ok(results)
}

/// Writes intermediate and final artifacts for one run.
#[derive(Debug)]
pub struct CheckpointWriter {
    output_dir: PathBuf,
    intermediate_dir: PathBuf,
    run_id: Uuid,
    next_batch: usize,
}

impl CheckpointWriter {
    pub fn new(output_dir: impl Into<PathBuf>, intermediate_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            intermediate_dir: intermediate_dir.into(),
            run_id: Uuid::new_v4(),
            next_batch: 0,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Number of intermediate artifacts written so far.
    pub fn batches_written(&self) -> usize {
        self.next_batch
    }

    /// Path of the `n`th intermediate artifact.
    pub fn intermediate_path(&self, n: usize) -> PathBuf {
        self.intermediate_dir
            .join(format!("{}{}.json", INTERMEDIATE_PREFIX, n))
    }

    pub fn final_path(&self) -> PathBuf {
        self.output_dir.join(FINAL_ARTIFACT)
    }

    /// Remove artifacts left by an earlier run in the same directories.
    ///
    /// Returns how many files were removed. Missing directories are fine.
    pub async fn clear_stale(&self) -> Result<usize, CheckpointError> {
        let mut removed = 0;

        match tokio::fs::read_dir(&self.intermediate_dir).await {
            Ok(mut entries) => {
                let dir_err = |source| CheckpointError::Io {
                    path: self.intermediate_dir.clone(),
                    source,
                };
                while let Some(entry) = entries.next_entry().await.map_err(dir_err)? {
                    let name = entry.file_name();
                    if name.to_str().is_some_and(is_intermediate_artifact) {
                        remove_file(&entry.path()).await?;
                        removed += 1;
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CheckpointError::Io {
                    path: self.intermediate_dir.clone(),
                    source,
                })
            }
        }

        let final_path = self.final_path();
        if tokio::fs::try_exists(&final_path).await.unwrap_or(false) {
            remove_file(&final_path).await?;
            removed += 1;
        }

        if removed > 0 {
            warn!(run_id = %self.run_id, removed, "Removed artifacts from an earlier run");
        }
        Ok(removed)
    }

    /// Write the next numbered intermediate artifact.
    pub async fn write_intermediate(&mut self, results: &BatchResults) -> Result<PathBuf, CheckpointError> {
        let path = self.intermediate_path(self.next_batch);
        write_atomic(&path, results).await?;
        self.next_batch += 1;
        info!(run_id = %self.run_id, path = %path.display(), records = results.len(), "Saved intermediate results");
        Ok(path)
    }

    /// Write the final artifact. Always called, even with no results.
    pub async fn write_final(&self, results: &BatchResults) -> Result<PathBuf, CheckpointError> {
        let path = self.final_path();
        write_atomic(&path, results).await?;
        info!(run_id = %self.run_id, path = %path.display(), records = results.len(), "Final results saved");
        Ok(path)
    }
}

async fn remove_file(path: &Path) -> Result<(), CheckpointError> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_atomic(path: &Path, results: &BatchResults) -> Result<(), CheckpointError> {
    let io_err = |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    };

    let bytes = serde_json::to_vec(results).map_err(|source| CheckpointError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;
    Ok(())
}
