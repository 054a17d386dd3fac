//! Predicate blocklist filtering.
//!
//! A triple is dropped when its predicate, lowercased, contains any blocklist
//! entry (also lowercased) as a substring. The same blocklist is pushed down
//! into the remote neighborhood query, so this pass is the second of two.

use tracing::warn;

use crate::error::{GraphError, Result};
use crate::triple::Triple;

/// Predicates excluded by default: literal-valued, bookkeeping, or
/// hub-forming relations that add noise to evidence subgraphs.
pub const DEFAULT_EXCLUDED_PREDICATES: &[&str] = &[
    "knowsLanguage",
    "location",
    "image",
    "about",
    "comment",
    "gtin",
    "url",
    "label",
    "postalCode",
    "isbn",
    "sameAs",
    "mainEntityOfPage",
    "leiCode",
    "type",
    "dateCreated",
    "unemploymentRate",
    "length",
    "description",
    "iswcCode",
    "iataCode",
    "logo",
    "alternateName",
    "geo",
    "subclassOf",
    "icaoCode",
    "humanDevelopmentIndex",
    "startDate",
    "endDate",
    "follows",
    "superEvent",
];

/// Case-insensitive substring blocklist for predicates.
///
/// Entries are validated and case-folded once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateBlocklist {
    entries: Vec<String>,
}

impl PredicateBlocklist {
    /// Build a blocklist, rejecting empty entries.
    ///
    /// An empty entry would match every predicate, which is never intended.
    /// Duplicates (after case folding) are collapsed.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut folded: Vec<String> = Vec::new();
        for (index, entry) in entries.into_iter().enumerate() {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                return Err(GraphError::EmptyBlocklistEntry { index });
            }
            let lower = entry.to_lowercase();
            if !folded.contains(&lower) {
                folded.push(lower);
            }
        }
        Ok(Self { entries: folded })
    }

    /// A blocklist that excludes nothing.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check whether a predicate is excluded.
    pub fn is_blocked(&self, predicate: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        let predicate = predicate.to_lowercase();
        self.entries.iter().any(|e| predicate.contains(e.as_str()))
    }

    /// Case-folded entries, in first-seen order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PredicateBlocklist {
    fn default() -> Self {
        Self {
            entries: DEFAULT_EXCLUDED_PREDICATES
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }
}

/// Remove triples whose predicate is blocked, preserving input order.
///
/// Malformed triples (an empty part) are skipped one at a time with a
/// warning; the rest of the list is still processed.
pub fn filter_triples(triples: &[Triple], blocklist: &PredicateBlocklist) -> Vec<Triple> {
    let mut kept = Vec::with_capacity(triples.len());
    for triple in triples {
        if !triple.is_well_formed() {
            warn!(triple = %triple, "Skipping malformed triple during filtering");
            continue;
        }
        if blocklist.is_blocked(&triple.predicate) {
            continue;
        }
        kept.push(triple.clone());
    }
    kept
}
