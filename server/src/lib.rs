use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer, AllowOrigin};
use tower_http::trace::TraceLayer;
use triage_core::{Dataset, IndexBuilder, IndexMeta, IndexStore, RetrievalError, Retriever, VectorizerConfig, DEFAULT_TOP_K};

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_TOP_K }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_records: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub row: usize,
    pub score: f32,
    pub description: String,
}

#[derive(Serialize)]
pub struct ContextResponse {
    pub query: String,
    pub context: String,
}

pub struct ServerOptions {
    /// Required in `X-ADMIN-TOKEN` to upload a dataset. Uploads are refused when unset.
    pub admin_token: Option<String>,
    pub vectorizer: VectorizerConfig,
    /// Allowed CORS origins; empty allows any.
    pub cors_origins: Vec<String>,
}

impl ServerOptions {
    /// Read ADMIN_TOKEN and CORS_ALLOW_ORIGIN (comma-separated).
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ALLOW_ORIGIN")
            .map(|val| val.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        Self {
            admin_token: std::env::var("ADMIN_TOKEN").ok(),
            vectorizer: VectorizerConfig::default(),
            cors_origins,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn IndexStore>,
    pub builder: IndexBuilder,
    pub admin_token: Option<String>,
}

pub fn build_app(store: Arc<dyn IndexStore>, options: ServerOptions) -> Router {
    let app_state = AppState { store, builder: IndexBuilder::new(options.vectorizer), admin_token: options.admin_token };

    let origins: Vec<_> = options.cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/context", get(context_handler))
        .route("/index", post(index_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn error_response(e: RetrievalError) -> (StatusCode, String) {
    let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, e.to_string())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let retriever = Retriever::load(state.store.as_ref()).map_err(error_response)?;
    let k = params.k.clamp(1, 100);
    let results = retriever
        .query_scored(&params.q, k)
        .into_iter()
        .map(|r| SearchHit { row: r.row, score: r.score, description: r.description })
        .collect();
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_records: retriever.len(), results }))
}

/// Concatenated top descriptions, the input for the downstream generation step.
pub async fn context_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<ContextResponse>, (StatusCode, String)> {
    let retriever = Retriever::load(state.store.as_ref()).map_err(error_response)?;
    match retriever.relevant_context(&params.q) {
        Some(context) => Ok(Json(ContextResponse { query: params.q, context })),
        None => Err((StatusCode::NOT_FOUND, "no matching descriptions".into())),
    }
}

/// Replace the index with one built from the CSV request body.
pub async fn index_handler(State(state): State<AppState>, headers: HeaderMap, body: String) -> Result<Json<IndexMeta>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let dataset = Dataset::from_reader(body.as_bytes()).map_err(error_response)?;
    let meta = state.builder.build_dataset(dataset, state.store.as_ref()).map_err(error_response)?;
    Ok(Json(meta))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
