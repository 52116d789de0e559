use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use search_core::{CorpusFormat, Document, InMemoryCorpus, Ranking, SearchEngine};
use serde_json::Value;
use server::{build_app, router, AppState, ServerConfig};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

fn tiny_app() -> Router {
    let corpus = InMemoryCorpus::from_documents(vec![
        Document::new("doc1", "Cats", "The Cat Sat."),
        Document::new("doc2", "More cats", "The cat ran."),
        Document::new("doc3", "Dogs", "A dog barked."),
        Document::new("doc4", "Rust", "Rust is great. rust systems programming."),
        Document::new("doc5", "Learning", "Learning rust."),
    ]);
    let engine = SearchEngine::build(Box::new(corpus)).unwrap();
    router(AppState { engine: Arc::new(engine), ranking: Ranking::FirstTerm })
}

async fn call(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn ids(json: &Value) -> Vec<String> {
    json["results"].as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap().to_string()).collect()
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (status, json) = call(tiny_app(), "/search?q=rust&k=2").await;
    assert_eq!(status, StatusCode::OK);
    // doc4 has two occurrences, so it outranks doc5.
    assert_eq!(ids(&json), vec!["doc4", "doc5"]);
    assert_eq!(json["total_hits"], 2);
    let snippet = json["results"][0]["snippet"].as_str().unwrap();
    assert!(snippet.contains("<em>Rust</em> is great"));
}

#[tokio::test]
async fn conjunctive_queries_and_empty_results() {
    let (status, json) = call(tiny_app(), "/search?q=cat").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["doc1", "doc2"]);

    let (status, json) = call(tiny_app(), "/search?q=cat%20dog").await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&json).is_empty());
    assert_eq!(json["total_hits"], 0);

    let (status, json) = call(tiny_app(), "/search?q=%21%21").await;
    assert_eq!(status, StatusCode::OK);
    assert!(ids(&json).is_empty());
}

#[tokio::test]
async fn limit_is_clamped_but_total_is_reported() {
    let (_, json) = call(tiny_app(), "/search?q=the&k=1").await;
    assert_eq!(ids(&json).len(), 1);
    assert_eq!(json["total_hits"], 2);

    let (_, json) = call(tiny_app(), "/search?q=the&k=0").await;
    assert_eq!(ids(&json).len(), 1);
}

#[tokio::test]
async fn missing_query_or_bad_ranking_is_rejected() {
    let (status, _) = call(tiny_app(), "/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(tiny_app(), "/search?q=cat&ranking=bm25").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = call(tiny_app(), "/search?q=cat%20the&ranking=combined").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["doc1", "doc2"]);
}

#[tokio::test]
async fn doc_lookup() {
    let (status, json) = call(tiny_app(), "/doc/doc3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Dogs");
    assert_eq!(json["body"], "A dog barked.");

    let (status, json) = call(tiny_app(), "/doc/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "not found");
}

#[tokio::test]
async fn builds_from_a_jsonl_corpus() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("docs.jsonl");
    fs::write(&path, "{\"id\":\"1\",\"title\":\"Oil\",\"body\":\"crude oil\"}\n{\"id\":\"2\",\"title\":\"Gold\",\"body\":\"gold bullion\"}\n").unwrap();
    let config = ServerConfig { corpus: path.to_string_lossy().to_string(), format: CorpusFormat::Auto, ranking: Ranking::FirstTerm, cache: false };
    let app = build_app(&config).unwrap();

    let (status, body) = call(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (_, json) = call(app.clone(), "/search?q=oil").await;
    assert_eq!(ids(&json), vec!["1"]);
    assert_eq!(json["results"][0]["title"], "Oil");

    let (status, json) = call(app.clone(), "/doc/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Gold");

    let (status, _) = call(app, "/doc/9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
