//! External identifier (Wikidata QID) to graph-native identifier resolution.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::error::{EngineError, ResolveError};
use crate::sparql::queries::{same_as_query, ENTITY_VAR};
use crate::sparql::response::value;
use crate::sparql::SparqlClient;

/// Outcome of a lookup that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The graph-native identifier.
    Found(String),
    /// No unique match.
    NotFound,
}

impl Resolution {
    pub fn into_found(self) -> Option<String> {
        match self {
            Resolution::Found(id) => Some(id),
            Resolution::NotFound => None,
        }
    }
}

/// Boxed future returned by [`IdentifierResolver::resolve`].
pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<Resolution, ResolveError>> + Send + 'a>>;

/// Maps external identifiers to graph-native ones. Safe to call concurrently.
pub trait IdentifierResolver: Send + Sync {
    fn resolve<'a>(&'a self, external_id: &'a str) -> ResolveFuture<'a>;
}

/// Only `Q<digits>` is ever interpolated into a query.
fn is_qid(id: &str) -> bool {
    id.len() > 1 && id.starts_with('Q') && id[1..].chars().all(|c| c.is_ascii_digit())
}

/// Resolves QIDs through `owl:sameAs wd:<QID>` links on the endpoint.
///
/// Exactly one binding is a match; zero or several are [`Resolution::NotFound`].
pub struct SparqlResolver {
    client: Arc<SparqlClient>,
}

impl SparqlResolver {
    pub fn new(client: Arc<SparqlClient>) -> Self {
        Self { client }
    }
}

impl IdentifierResolver for SparqlResolver {
    fn resolve<'a>(&'a self, external_id: &'a str) -> ResolveFuture<'a> {
        Box::pin(async move {
            if !is_qid(external_id) {
                debug!(id = external_id, "Not a QID, skipping lookup");
                return Ok(Resolution::NotFound);
            }

            let lookup = |source| ResolveError::Lookup {
                id: external_id.to_string(),
                source,
            };
            let results = self
                .client
                .query(&same_as_query(external_id))
                .await
                .map_err(lookup)?;
            let rows = results.bindings().map_err(lookup)?;

            match rows {
                [row] => Ok(value(row, ENTITY_VAR)
                    .map(|v| Resolution::Found(v.to_string()))
                    .unwrap_or(Resolution::NotFound)),
                _ => {
                    debug!(id = external_id, matches = rows.len(), "No unique sameAs match");
                    Ok(Resolution::NotFound)
                }
            }
        })
    }
}

/// In-memory resolver for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    map: HashMap<String, String>,
    identity: bool,
}

impl MapResolver {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self {
            map,
            identity: false,
        }
    }

    /// Resolve every identifier to itself (unless explicitly mapped).
    pub fn identity() -> Self {
        Self {
            map: HashMap::new(),
            identity: true,
        }
    }

    /// Load a JSON object `{ "<QID>": "<native id>", ... }`.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = serde_json::from_str(&text).map_err(|source| EngineError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(map))
    }

    pub fn insert(&mut self, external_id: impl Into<String>, native_id: impl Into<String>) {
        self.map.insert(external_id.into(), native_id.into());
    }
}

impl FromIterator<(String, String)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IdentifierResolver for MapResolver {
    fn resolve<'a>(&'a self, external_id: &'a str) -> ResolveFuture<'a> {
        let resolution = match self.map.get(external_id) {
            Some(native) => Resolution::Found(native.clone()),
            None if self.identity => Resolution::Found(external_id.to_string()),
            None => Resolution::NotFound,
        };
        Box::pin(async move { Ok(resolution) })
    }
}
