use axum::extract::{Path, State};
use axum::routing::get;
use axum::Router;
use filescout::{search_with_cancel, ServerConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Body returned for every failed search, whatever the cause
pub const SEARCH_ERROR_BODY: &str = "search error";

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

/// Builds the application router.
///
/// - `GET /search/{term}/{term}/...` runs a content search under the root
/// - `GET /static/{path}` serves raw file bytes from the root
pub fn router(config: ServerConfig) -> Router {
    let static_files = ServeDir::new(&config.root);
    Router::new()
        .route("/search", get(search_all))
        .route("/search/", get(search_all))
        .route("/search/*terms", get(search_terms))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(config))
}

async fn search_terms(State(state): State<AppState>, Path(terms): Path<String>) -> String {
    run_search(&state, &terms).await
}

async fn search_all(State(state): State<AppState>) -> String {
    run_search(&state, "").await
}

async fn run_search(state: &AppState, segments: &str) -> String {
    let request = state.config.search_request(segments);
    debug!("Search request for {:?}", request.terms);

    // Dropping the handler (client gone) cancels the search
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let output = search_with_cancel(&request, &cancel).await;
    match output.error {
        Some(e) => {
            warn!(
                "Search for {:?} failed after {} matches: {}",
                request.terms,
                output.matches.len(),
                e
            );
            SEARCH_ERROR_BODY.to_string()
        }
        None => output.matches.join("\n"),
    }
}
