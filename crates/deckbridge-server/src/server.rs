use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::broadcast::Broadcaster;
use crate::handlers;
use crate::stream;
use crate::subscriber::SubscriberRegistry;

/// Server configuration.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Filesystem path of the game page served at `/`.
    pub page_path: PathBuf,
    /// Per-subscriber pending-event queue capacity.
    pub max_pending_events: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
            page_path: PathBuf::from("index.html"),
            max_pending_events: 32,
        }
    }
}

/// Errors that can abort server startup. Anything past startup is handled
/// per connection and never surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be bound (e.g. port already in use).
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared application state passed to Axum handlers. The registry is owned
/// here and injected; handlers never reach for process-wide state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SubscriberRegistry>,
    pub broadcaster: Arc<Broadcaster>,
    pub page_path: Arc<PathBuf>,
}

/// Build the Axum router with all routes. Unmatched paths fall back to the
/// router's not-found response.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::game_page))
        .route("/events", get(stream::subscribe))
        .route("/trigger", get(handlers::trigger))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Create and start the server. Returns a handle exposing the bound port.
pub async fn start(config: ServerConfig) -> Result<ServerHandle, ServerError> {
    let registry = Arc::new(SubscriberRegistry::new(config.max_pending_events));
    let broadcaster = Arc::new(Broadcaster::new(Arc::clone(&registry)));

    let state = AppState {
        registry: Arc::clone(&registry),
        broadcaster,
        page_path: Arc::new(config.page_path),
    };

    let router = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    tracing::info!(addr = %local_addr, "Bridge listening");

    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        registry,
        _server: server,
    })
}

/// Handle returned by `start()` — keeps the serve task alive and exposes
/// the registry for inspection.
pub struct ServerHandle {
    pub port: u16,
    pub registry: Arc<SubscriberRegistry>,
    _server: tokio::task::JoinHandle<()>,
}
