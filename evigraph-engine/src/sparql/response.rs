//! `application/sparql-results+json` decoding.

use serde::Deserialize;
use std::collections::HashMap;

use crate::error::FetchError;

/// One bound variable in a result row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingValue {
    /// `uri`, `literal`, `bnode` or `typed-literal`.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub datatype: Option<String>,
}

/// A result row: variable name to value. Unbound variables are absent.
pub type Binding = HashMap<String, BindingValue>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Decoded SPARQL JSON result: `results` for SELECT, `boolean` for ASK.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: Head,
    #[serde(default)]
    pub results: Option<ResultSet>,
    #[serde(default)]
    pub boolean: Option<bool>,
}

impl SparqlResults {
    /// Decode a response body.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|e| FetchError::Malformed {
            message: format!("invalid SPARQL JSON: {}", e),
        })
    }

    /// Rows of a SELECT result.
    pub fn bindings(&self) -> Result<&[Binding], FetchError> {
        self.results
            .as_ref()
            .map(|r| r.bindings.as_slice())
            .ok_or_else(|| FetchError::Malformed {
                message: "response has no results section".to_string(),
            })
    }

    /// Answer of an ASK query.
    pub fn ask(&self) -> Result<bool, FetchError> {
        self.boolean.ok_or_else(|| FetchError::Malformed {
            message: "response has no boolean answer".to_string(),
        })
    }
}

/// Value of `var` in a row, if bound.
pub fn value<'a>(binding: &'a Binding, var: &str) -> Option<&'a str> {
    binding.get(var).map(|v| v.value.as_str())
}
