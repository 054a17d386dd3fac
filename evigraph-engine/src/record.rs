//! Input records and their interesting external identifiers.
//!
//! The input file is a JSON object keyed by record key (a Wikidata QID such
//! as `Q42`), each value carrying the entities mentioned for that record:
//!
//! ```json
//! { "Q42": { "entities": [ { "id": 5, "name": "human" }, { "id": 145 } ] } }
//! ```
//!
//! Key order is preserved, so `limit` and checkpoint cadence follow the file.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

use crate::error::{EngineError, Result};

/// Entity identifier as it appears in the input: any JSON scalar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(serde_json::Number),
    Text(String),
    Flag(bool),
}

impl EntityId {
    /// External identifier for this entity.
    ///
    /// Numbers, flags and bare digit strings get a `Q` prefix; any other
    /// text is already an identifier and is kept.
    pub fn to_qid(&self) -> String {
        match self {
            EntityId::Number(n) => format!("Q{}", n),
            EntityId::Flag(b) => format!("Q{}", b),
            EntityId::Text(s) => {
                let s = s.trim();
                if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                    format!("Q{}", s)
                } else {
                    s.to_string()
                }
            }
        }
    }
}

/// One entity mention. Fields other than `id` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RecordBody {
    #[serde(default)]
    entities: Vec<Entity>,
}

/// A unit of work: one key and the entities mentioned for it.
///
/// A record whose body could not be decoded keeps the decode error in
/// `malformed`; the pipeline fails it without touching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub entities: Vec<Entity>,
    pub malformed: Option<String>,
}

impl Record {
    pub fn new(key: impl Into<String>, entities: Vec<Entity>) -> Self {
        Self {
            key: key.into(),
            entities,
            malformed: None,
        }
    }

    /// A record whose body did not have the expected shape.
    pub fn malformed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entities: Vec::new(),
            malformed: Some(reason.into()),
        }
    }

    /// Build a record from raw external IDs, for ad-hoc runs.
    pub fn from_ids(key: impl Into<String>, ids: &[String]) -> Self {
        Self::new(
            key,
            ids.iter()
                .map(|id| Entity {
                    id: Some(EntityId::Text(id.clone())),
                })
                .collect(),
        )
    }

    /// External identifiers to resolve: every entity with an id, then the
    /// record key, deduplicated keeping first occurrence.
    pub fn interesting_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.entities
            .iter()
            .filter_map(|e| e.id.as_ref().map(EntityId::to_qid))
            .chain(std::iter::once(self.key.clone()))
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect()
    }
}

/// Parse the record file format.
///
/// Only the top level must be a JSON object. Each body is decoded on its
/// own; a body of the wrong shape becomes a `Record::malformed` entry so
/// the rest of the file still runs.
pub fn parse_records(text: &str) -> serde_json::Result<Vec<Record>> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(text)?;
    Ok(map
        .into_iter()
        .map(|(key, value)| match serde_json::from_value::<RecordBody>(value) {
            Ok(body) => Record::new(key, body.entities),
            Err(e) => {
                warn!(key = %key, error = %e, "Malformed record body");
                Record::malformed(key, e.to_string())
            }
        })
        .collect())
}

/// Read and parse a record file.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&text).map_err(|source| EngineError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
