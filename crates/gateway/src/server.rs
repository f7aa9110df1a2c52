use std::net::SocketAddr;

use {
    axum::{Router, extract::State, response::IntoResponse, routing::get},
    ely_common::{Localizer, MessageKey},
    tokio::{net::TcpListener, task::JoinHandle},
    tokio_util::sync::CancellationToken,
    tracing::{info, warn},
};

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct AppState {
    messages: Localizer,
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the health router (shared between production startup and tests).
pub fn build_health_app(messages: Localizer) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(AppState { messages })
}

/// A health server running on a background task.
pub struct HealthServer {
    pub local_addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl HealthServer {
    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "health server task failed");
        }
    }
}

/// Bind `bind:port` and serve the health router until [`HealthServer::shutdown`].
///
/// Binding happens before this returns, so an unusable address is a startup
/// error rather than a background failure.
pub async fn start_health_server(bind: &str, port: u16, messages: Localizer) -> anyhow::Result<HealthServer> {
    let listener = TcpListener::bind((bind, port))
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind health server on {bind}:{port}: {e}"))?;
    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        "{}",
        messages.format(MessageKey::HttpServerStart, &[&local_addr])
    );

    let app = build_health_app(messages);
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { signal.cancelled().await })
            .await
        {
            warn!(error = %e, "health server stopped with error");
        }
    });

    Ok(HealthServer {
        local_addr,
        shutdown,
        task,
    })
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.messages.text(MessageKey::HealthResponse)
}
