//! SPARQL query text.

use evigraph_core::{PredicateBlocklist, PrefixMap};

/// Variable bound to the graph-native entity in [`same_as_query`].
pub const ENTITY_VAR: &str = "entity";

/// Render an identifier as a SPARQL term.
///
/// Always an IRI in angle brackets. `prefix:local` names with a declared
/// prefix are expanded first, so locals with characters a prefixed name
/// cannot carry still form a valid query.
pub fn term(prefixes: &PrefixMap, id: &str) -> String {
    let id = id.trim();
    if id.starts_with('<') && id.ends_with('>') {
        return id.to_string();
    }
    if id.contains("://") {
        return format!("<{}>", id);
    }
    format!("<{}>", prefixes.expand(id))
}

fn string_literal(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Triples touching `id` as subject or object, excluding blocked predicates.
///
/// The blocklist is applied remotely with the same case-insensitive substring
/// semantics as the local filter.
pub fn neighborhood_query(
    prefixes: &PrefixMap,
    id: &str,
    blocklist: &PredicateBlocklist,
    limit: usize,
) -> String {
    let entity = term(prefixes, id);
    let mut query = String::new();

    if !prefixes.is_empty() {
        query.push_str(&prefixes.sparql_header());
        query.push_str("\n\n");
    }
    query.push_str("SELECT DISTINCT ?sub ?pred ?obj WHERE {\n");
    query.push_str(&format!("  {{ {} ?pred ?obj . }}\n", entity));
    query.push_str("  UNION\n");
    query.push_str(&format!("  {{ ?sub ?pred {} . }}\n", entity));
    for entry in blocklist.entries() {
        query.push_str(&format!(
            "  FILTER(!CONTAINS(LCASE(STR(?pred)), {}))\n",
            string_literal(entry)
        ));
    }
    query.push_str("}\n");
    query.push_str(&format!("LIMIT {}\n", limit));
    query
}

/// Graph-native entities declared `owl:sameAs` the Wikidata entity `qid`.
pub fn same_as_query(qid: &str) -> String {
    format!(
        "PREFIX owl: <http://www.w3.org/2002/07/owl#>\n\
         PREFIX wd: <http://www.wikidata.org/entity/>\n\n\
         SELECT ?{var} WHERE {{\n  ?{var} owl:sameAs wd:{qid} .\n}}\n",
        var = ENTITY_VAR,
        qid = qid
    )
}

/// Trivial query used to check that the endpoint answers.
pub fn ask_query() -> &'static str {
    "ASK {}"
}
