use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use search_core::{CorpusFormat, Highlighter, Ranking, SearchEngine, SearchOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const SNIPPET_CHARS: usize = 300;
const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    pub ranking: Option<String>,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub body: String,
    pub score: f64,
    pub snippet: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub ranking: Ranking,
}

/// Where the server's documents come from and how they are ranked by default.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub corpus: String,
    pub format: CorpusFormat,
    pub ranking: Ranking,
    pub cache: bool,
}

/// Index the configured corpus, then assemble the router over it.
pub fn build_app(config: &ServerConfig) -> Result<Router> {
    let engine = SearchEngine::open(&config.corpus, config.format, config.cache)?;
    tracing::info!(num_docs = engine.index().num_docs(), num_terms = engine.index().num_terms(), "index ready");
    Ok(router(AppState { engine: Arc::new(engine), ranking: config.ranking }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:id", get(doc_handler))
        .with_state(state)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let ranking = match params.ranking.as_deref() {
        Some(name) => name.parse::<Ranking>().map_err(|e| (StatusCode::BAD_REQUEST, e))?,
        None => state.ranking,
    };
    let options = SearchOptions { ranking, limit: Some(params.k.clamp(1, MAX_K)) };
    // Direct readers re-scan files on fetch; keep that off the async workers.
    let engine = state.engine.clone();
    let query = params.q.clone();
    let found = tokio::task::spawn_blocking(move || engine.search_with(&query, &options))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let highlighter = Highlighter::new(&params.q);
    let results = found
        .hits
        .into_iter()
        .map(|hit| {
            let snippet = highlighter.highlight(&highlighter.snippet(&hit.document.body, SNIPPET_CHARS), "<em>", "</em>");
            SearchHit { id: hit.document.id, title: hit.document.title, body: hit.document.body, score: hit.score, snippet }
        })
        .collect();

    Ok(Json(SearchResponse { query: params.q, took_ms: start.elapsed().as_millis(), total_hits: found.total_hits, results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
    let engine = state.engine.clone();
    let doc_id = id.clone();
    let fetched = match tokio::task::spawn_blocking(move || engine.document(&doc_id)).await {
        Ok(fetched) => fetched,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": e.to_string() }))),
    };
    match fetched {
        Ok(doc) => (StatusCode::OK, Json(serde_json::json!(doc))),
        Err(e) if e.is_not_found() => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))),
        Err(e) => {
            tracing::error!(error = %e, doc_id = %id, "document fetch failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": e.to_string() })))
        }
    }
}
