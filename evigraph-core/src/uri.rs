//! Namespace prefixes and URI shortening.

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::triple::Triple;

const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("yago", "http://yago-knowledge.org/resource/"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("schema", "http://schema.org/"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("wd", "http://www.wikidata.org/entity/"),
];

/// Ordered `prefix -> namespace` table.
///
/// Later declarations of the same prefix replace earlier ones but keep the
/// original position, so rendered `PREFIX` headers are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMap {
    entries: Vec<(String, String)>,
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PREFIXES
                .iter()
                .map(|(p, ns)| (p.to_string(), ns.to_string()))
                .collect(),
        }
    }
}

impl PrefixMap {
    /// A map with no prefixes at all.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declare or replace a prefix.
    pub fn insert(&mut self, prefix: &str, namespace: &str) -> Result<()> {
        let prefix = prefix.trim().trim_end_matches(':');
        let namespace = namespace.trim();
        let namespace = namespace
            .strip_prefix('<')
            .and_then(|ns| ns.strip_suffix('>'))
            .unwrap_or(namespace);

        if prefix.is_empty() || prefix.contains(char::is_whitespace) {
            return Err(GraphError::InvalidPrefix {
                message: format!("bad prefix name '{}'", prefix),
            });
        }
        if namespace.is_empty() {
            return Err(GraphError::InvalidPrefix {
                message: format!("prefix '{}' has an empty namespace", prefix),
            });
        }

        match self.entries.iter_mut().find(|(p, _)| p == prefix) {
            Some(entry) => entry.1 = namespace.to_string(),
            None => self
                .entries
                .push((prefix.to_string(), namespace.to_string())),
        }
        Ok(())
    }

    /// Merge declarations from prefix-file text on top of this map.
    ///
    /// Each line is `name: <namespace>`; lines that do not split into exactly
    /// two whitespace-separated tokens, or that fail validation, are skipped.
    /// Returns the number of declarations applied.
    pub fn merge_declarations(&mut self, text: &str) -> usize {
        let mut applied = 0;
        for (lineno, line) in text.lines().enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 2 {
                if !line.trim().is_empty() {
                    debug!(line = lineno + 1, "Skipping malformed prefix line");
                }
                continue;
            }
            match self.insert(parts[0], parts[1]) {
                Ok(()) => applied += 1,
                Err(e) => debug!(line = lineno + 1, error = %e, "Skipping prefix line"),
            }
        }
        applied
    }

    /// Namespace for a prefix name.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Expand `prefix:local` to a full URI.
    ///
    /// Values already in angle brackets, and values whose prefix is unknown,
    /// are returned unchanged.
    pub fn expand(&self, value: &str) -> String {
        if value.starts_with('<') && value.ends_with('>') {
            return value.to_string();
        }
        match value.split_once(':') {
            Some((prefix, local)) if !local.is_empty() => match self.get(prefix) {
                Some(ns) => format!("{}{}", ns, local),
                None => value.to_string(),
            },
            _ => value.to_string(),
        }
    }

    /// Shorten a full URI using the longest matching namespace.
    pub fn compact(&self, uri: &str) -> String {
        self.entries
            .iter()
            .filter(|(_, ns)| uri.len() > ns.len() && uri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(p, ns)| format!("{}:{}", p, &uri[ns.len()..]))
            .unwrap_or_else(|| uri.to_string())
    }

    /// Compact all three parts of a triple.
    pub fn compact_triple(&self, triple: &Triple) -> Triple {
        Triple::new(
            self.compact(&triple.subject),
            self.compact(&triple.predicate),
            self.compact(&triple.object),
        )
    }

    /// `PREFIX name: <namespace>` lines for a SPARQL query header.
    pub fn sparql_header(&self) -> String {
        self.entries
            .iter()
            .map(|(p, ns)| format!("PREFIX {}: <{}>", p, ns))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Text after the last `/`, or the whole value if there is none.
pub fn local_name(uri: &str) -> &str {
    uri.rsplit('/').next().unwrap_or(uri)
}

/// Reduce every part of a triple to its [`local_name`].
pub fn prune_triple(triple: &Triple) -> Triple {
    Triple::new(
        local_name(&triple.subject),
        local_name(&triple.predicate),
        local_name(&triple.object),
    )
}
