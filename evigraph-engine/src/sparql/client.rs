//! HTTP client for a SPARQL 1.1 query endpoint.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use super::queries::ask_query;
use super::response::SparqlResults;
use crate::config::EndpointConfig;
use crate::error::{EngineError, FetchError};

const SPARQL_QUERY_CONTENT_TYPE: &str = "application/sparql-query; charset=utf-8";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Longest slice of an error body kept in [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Shared SPARQL client.
///
/// Holds one `reqwest::Client` (and therefore one connection pool); wrap it in
/// an `Arc` and hand it to every store and resolver of a run.
#[derive(Debug, Clone)]
pub struct SparqlClient {
    http: Client,
    endpoint: String,
}

impl SparqlClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &EndpointConfig) -> Result<Self, EngineError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(EngineError::Client)?;

        Ok(Self {
            http,
            endpoint: config.url.trim().to_string(),
        })
    }

    /// Get the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST a query and decode the JSON result.
    pub async fn query(&self, sparql: &str) -> Result<SparqlResults, FetchError> {
        debug!(endpoint = %self.endpoint, bytes = sparql.len(), "Sending SPARQL query");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SPARQL_QUERY_CONTENT_TYPE)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .body(sparql.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        SparqlResults::from_json(&body)
    }

    /// Check that the endpoint answers a trivial ASK query.
    pub async fn ping(&self) -> Result<bool, FetchError> {
        self.query(ask_query()).await?.ask()
    }
}
