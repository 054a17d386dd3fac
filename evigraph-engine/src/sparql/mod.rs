//! SPARQL 1.1 protocol plumbing: HTTP client, query rendering, JSON results.

pub mod client;
pub mod queries;
pub mod response;

pub use client::SparqlClient;
pub use queries::{ask_query, neighborhood_query, same_as_query};
pub use response::{Binding, BindingValue, SparqlResults};
