//! SPARQL store and resolver against a scripted local HTTP endpoint.

use std::sync::{Arc, Mutex};

use evigraph_core::{PredicateBlocklist, PrefixMap, Triple};
use evigraph_engine::config::EndpointConfig;
use evigraph_engine::{
    FetchError, GraphStore, IdentifierResolver, NeighborFetcher, Resolution, SparqlClient,
    SparqlGraphStore, SparqlResolver,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A captured request: headers (lowercased) and body.
#[derive(Debug, Clone)]
struct Captured {
    head: String,
    body: String,
}

/// Serve `responses` in order, one per connection, recording each request.
async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/sparql", listener.local_addr().unwrap());
    let captured = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&captured);

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let length: usize = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            while buf.len() < header_end + length {
                let n = socket.read(&mut chunk).await.unwrap();
                buf.extend_from_slice(&chunk[..n]);
            }
            let request_body = String::from_utf8_lossy(&buf[header_end..]).to_string();
            log.lock().unwrap().push(Captured {
                head,
                body: request_body,
            });

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/sparql-results+json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (url, captured)
}

fn client(url: &str) -> Arc<SparqlClient> {
    let config = EndpointConfig {
        url: url.to_string(),
        timeout_secs: 5,
    };
    Arc::new(SparqlClient::new(&config).unwrap())
}

const NEIGHBORS: &str = r#"{
  "head": {"vars": ["sub", "pred", "obj"]},
  "results": {"bindings": [
    {"pred": {"type": "uri", "value": "http://schema.org/memberOf"},
     "obj": {"type": "uri", "value": "http://yago-knowledge.org/resource/EU"}},
    {"sub": {"type": "uri", "value": "http://yago-knowledge.org/resource/Rome"},
     "pred": {"type": "uri", "value": "http://schema.org/containedInPlace"}},
    {"obj": {"type": "uri", "value": "http://yago-knowledge.org/resource/Orphan"}}
  ]}
}"#;

#[tokio::test]
async fn test_neighborhood_over_http() {
    let (url, captured) = serve(vec![(200, NEIGHBORS)]).await;
    let store = SparqlGraphStore::new(client(&url), Arc::new(PrefixMap::default()));
    let blocklist = Arc::new(PredicateBlocklist::new(["label"]).unwrap());
    let fetcher = NeighborFetcher::new(Arc::new(store), blocklist, 1000);

    let italy = "http://yago-knowledge.org/resource/Italy";
    let triples = fetcher.fetch(italy).await.unwrap();
    assert_eq!(
        triples,
        vec![
            Triple::new(italy, "http://schema.org/memberOf", "http://yago-knowledge.org/resource/EU"),
            Triple::new(
                "http://yago-knowledge.org/resource/Rome",
                "http://schema.org/containedInPlace",
                italy
            ),
        ]
    );

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].head.starts_with("post /sparql"));
    assert!(requests[0]
        .head
        .contains("content-type: application/sparql-query; charset=utf-8"));
    assert!(requests[0].head.contains("accept: application/sparql-results+json"));
    assert!(requests[0].body.contains("<http://yago-knowledge.org/resource/Italy> ?pred ?obj"));
    assert!(requests[0].body.contains(r#"FILTER(!CONTAINS(LCASE(STR(?pred)), "label"))"#));
    assert!(requests[0].body.contains("LIMIT 1000"));
}

#[tokio::test]
async fn test_http_error_status() {
    let (url, _) = serve(vec![(503, "overloaded")]).await;
    let store = SparqlGraphStore::new(client(&url), Arc::new(PrefixMap::default()));
    let err = store
        .neighborhood("yago:Rome", &PredicateBlocklist::empty(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[tokio::test]
async fn test_malformed_body() {
    let (url, _) = serve(vec![(200, "<html>not json</html>")]).await;
    let store = SparqlGraphStore::new(client(&url), Arc::new(PrefixMap::default()));
    let err = store
        .neighborhood("yago:Rome", &PredicateBlocklist::empty(), 10)
        .await
        .unwrap_err();
    assert!(err.is_malformed());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/sparql", listener.local_addr().unwrap());
    drop(listener);

    let store = SparqlGraphStore::new(client(&url), Arc::new(PrefixMap::default()));
    let err = store
        .neighborhood("yago:Rome", &PredicateBlocklist::empty(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Transport(_)));
}

#[tokio::test]
async fn test_resolver_unique_match_only() {
    let one = r#"{"head": {"vars": ["entity"]}, "results": {"bindings": [
        {"entity": {"type": "uri", "value": "http://yago-knowledge.org/resource/Douglas_Adams"}}
    ]}}"#;
    let two = r#"{"head": {"vars": ["entity"]}, "results": {"bindings": [
        {"entity": {"type": "uri", "value": "http://yago-knowledge.org/resource/A"}},
        {"entity": {"type": "uri", "value": "http://yago-knowledge.org/resource/B"}}
    ]}}"#;
    let none = r#"{"head": {"vars": ["entity"]}, "results": {"bindings": []}}"#;
    let (url, captured) = serve(vec![(200, one), (200, two), (200, none)]).await;
    let resolver = SparqlResolver::new(client(&url));

    assert_eq!(
        resolver.resolve("Q42").await.unwrap(),
        Resolution::Found("http://yago-knowledge.org/resource/Douglas_Adams".to_string())
    );
    assert_eq!(resolver.resolve("Q1").await.unwrap(), Resolution::NotFound);
    assert_eq!(resolver.resolve("Q2").await.unwrap(), Resolution::NotFound);
    // not a QID: answered without a request
    assert_eq!(resolver.resolve("yago:X").await.unwrap(), Resolution::NotFound);

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].body.contains("?entity owl:sameAs wd:Q42 ."));
}

#[tokio::test]
async fn test_resolver_transport_error() {
    let (url, _) = serve(vec![(500, "oops")]).await;
    let resolver = SparqlResolver::new(client(&url));
    assert!(resolver.resolve("Q42").await.is_err());
}

#[tokio::test]
async fn test_ping() {
    let (url, captured) = serve(vec![(200, r#"{"head": {}, "boolean": true}"#)]).await;
    assert!(client(&url).ping().await.unwrap());
    assert_eq!(captured.lock().unwrap()[0].body, "ASK {}");
}
