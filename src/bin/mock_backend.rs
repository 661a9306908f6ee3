//! peup-mock-backend - local stand-in for the PEUP search service
//!
//! Answers `POST /api/search` by scoring a bundled project catalog against the
//! query terms. For local development only.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use peup_chat::protocol::{
    decode_request, IntentRequest, IntentResponse, Project, ProjectSearchResult,
    ResponseMetadata, ResponsePayload,
};
use peup_chat::transport::SEARCH_PATH;
use serde_json::json;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const CATALOG_JSON: &str = include_str!("../../fixtures/catalog.json");
const SOURCE: &str = "peup-mock-backend";
const RESULT_TTL_SECS: u64 = 60;

#[derive(Clone)]
struct AppState {
    catalog: Arc<Vec<Project>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peup_mock_backend=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let port: u16 = std::env::var("PEUP_MOCK_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let catalog: Vec<Project> = serde_json::from_str(CATALOG_JSON)?;
    tracing::info!(projects = catalog.len(), "Catalog loaded");

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://127.0.0.1:5173"),
        ]))
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState {
        catalog: Arc::new(catalog),
    })
    .layer(cors)
    .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("PEUP mock backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route(SEARCH_PATH, post(search))
        .with_state(state)
}

async fn welcome() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to PEUP, the ProtoAi universal entry point" }))
}

async fn search(State(state): State<AppState>, body: Bytes) -> Result<Json<IntentResponse>, AppError> {
    let request = decode_request(&body).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let request_id = uuid::Uuid::new_v4().to_string();

    if !request.action.is_search() {
        tracing::info!(action = %request.action, "Rejecting unsupported action");
        return Ok(Json(IntentResponse::new(
            request_id,
            ResponsePayload::Error(format!(
                "Action {} is not supported by this backend",
                request.action
            )),
            metadata(0, BTreeMap::new()),
        )));
    }

    let hits = rank(&state.catalog, &request);
    tracing::info!(
        request_id = %request_id,
        query = request.query().unwrap_or_default(),
        hits = hits.len(),
        "Search served"
    );

    let extra = BTreeMap::from([("catalog_size".to_string(), state.catalog.len().to_string())]);
    Ok(Json(IntentResponse::new(
        request_id,
        ResponsePayload::Results(hits),
        metadata(RESULT_TTL_SECS, extra),
    )))
}

fn metadata(ttl: u64, extra: BTreeMap<String, String>) -> ResponseMetadata {
    ResponseMetadata {
        source: SOURCE.to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        ttl,
        extra,
    }
}

// ============================================================================
// Scoring
// ============================================================================

/// Lowercased alphanumeric words of at least two characters
fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

fn passes_filters(project: &Project, parameters: &BTreeMap<String, String>) -> bool {
    if parameters.get("tipo").is_some_and(|kind| *kind != project.kind) {
        return false;
    }
    if let Some(level) = parameters.get("level").and_then(|l| l.parse::<u32>().ok()) {
        if project.level != level {
            return false;
        }
    }
    !(parameters.get("only_featured").is_some_and(|f| f == "true") && !project.featured)
}

/// Score every catalog entry by the share of query terms it contains.
/// A query term matches any project word it prefixes.
fn rank(catalog: &[Project], request: &IntentRequest) -> Vec<ProjectSearchResult> {
    let query_terms = terms(request.query().unwrap_or_default());
    let Ok(total) = u32::try_from(query_terms.len()) else {
        return Vec::new();
    };
    if total == 0 {
        return Vec::new();
    }

    let mut hits: Vec<ProjectSearchResult> = catalog
        .iter()
        .filter(|project| passes_filters(project, &request.parameters))
        .filter_map(|project| {
            let words = terms(&format!("{} {} {}", project.name, project.description, project.kind));
            let matching: Vec<String> = query_terms
                .iter()
                .filter(|term| words.iter().any(|w| w.starts_with(term.as_str())))
                .cloned()
                .collect();
            let matched = u32::try_from(matching.len()).ok().filter(|n| *n > 0)?;

            Some(ProjectSearchResult {
                project: project.clone(),
                relevance_score: f64::from(matched) / f64::from(total),
                highlighted_snippet: Some(project.description.clone()),
                matching_features: matching,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.project.id.cmp(&b.project.id))
    });
    hits
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
