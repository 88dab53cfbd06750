//! HTTP server implementation using axum.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use futures_util::stream::Stream;
use gauge_core::CounterStore;
use gauge_telemetry::Metrics;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::WebConfig;
use crate::control::ShutdownHook;
use crate::error::{WebError, WebResult};
use crate::stream::{counter_events, SubscriberTracker};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Shared application state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    store: CounterStore,
    subscribers: Arc<SubscriberTracker>,
    shutdown: Arc<dyn ShutdownHook>,
    config: WebConfig,
}

impl AppState {
    pub fn new(store: CounterStore, shutdown: Arc<dyn ShutdownHook>, config: WebConfig) -> Self {
        Self {
            store,
            subscribers: Arc::new(SubscriberTracker::new()),
            shutdown,
            config,
        }
    }

    /// Number of open `/stream` connections.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.current_count()
    }
}

/// Create the axum router.
pub fn create_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(serve_index))
        .route("/stream", get(stream_counter))
        .route("/reset", post(reset_counter))
        .route("/shutdown", post(shutdown_process))
        .route("/metrics", get(serve_metrics))
        .nest_service("/static", static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the gauge page.
async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Server-sent counter updates for one subscriber.
async fn stream_counter(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let guard = state.subscribers.acquire();
    Sse::new(counter_events(
        state.store.clone(),
        state.config.poll_interval(),
        Some(guard),
    ))
}

/// Set the counter back to zero.
async fn reset_counter(State(state): State<AppState>) -> StatusCode {
    let previous = state.store.reset();
    Metrics::counter_reset();
    info!(previous, "Counter reset");
    StatusCode::NO_CONTENT
}

/// Terminate the process.
///
/// With the production hook this never returns a response.
async fn shutdown_process(State(state): State<AppState>) -> StatusCode {
    state.shutdown.trigger();
    StatusCode::ACCEPTED
}

/// Prometheus text exposition.
async fn serve_metrics() -> Result<impl IntoResponse, WebError> {
    let body = Metrics::render()?;
    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}

/// Run the web server until it fails.
pub async fn run_server(
    store: CounterStore,
    config: WebConfig,
    shutdown: Arc<dyn ShutdownHook>,
) -> WebResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| WebError::Bind { addr, source })?;

    serve(listener, AppState::new(store, shutdown, config)).await
}

/// Serve on an already bound listener.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> WebResult<()> {
    info!(
        addr = %listener.local_addr()?,
        static_dir = %state.config.static_dir.display(),
        "Starting web server"
    );
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
