//! The triple: unit of interchange between every pipeline stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(subject, predicate, object)` relation from the knowledge graph.
///
/// Serialized as a three-element JSON array so checkpoint artifacts stay
/// readable by tooling that expects `[s, p, o]` lists.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// A triple is well formed when none of its parts is empty.
    ///
    /// Missing binding fields decode to empty strings, so this is the check
    /// every stage uses to skip malformed data.
    pub fn is_well_formed(&self) -> bool {
        !self.subject.is_empty() && !self.predicate.is_empty() && !self.object.is_empty()
    }
}

impl From<(String, String, String)> for Triple {
    fn from((subject, predicate, object): (String, String, String)) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl From<Triple> for (String, String, String) {
    fn from(t: Triple) -> Self {
        (t.subject, t.predicate, t.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.subject, self.predicate, self.object)
    }
}
