//! HTTP server setup and lifecycle.
//!
//! # Responsibilities
//! - Own the route registry
//! - Bind the listener and hand it to the transport (axum over hyper)
//! - Aggregate request bodies up to the configured cap
//! - Forward every complete request to the dispatcher
//! - Start and shut down, tracking the server state
//!
//! # States
//! ```text
//! Created → Starting → Listening → ShuttingDown → Stopped
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use axum::{extract::State, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ListenerConfig, ServerConfig};
use crate::http::dispatcher::{Dispatcher, WireResponse};
use crate::http::Handler;
use crate::lifecycle::{signals, Shutdown};
use crate::net::{self, ListenerError};
use crate::routing::RouteRegistry;

/// Where a server is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Starting,
    Listening,
    ShuttingDown,
    Stopped,
}

/// Errors surfaced by [`HttpServer::start`].
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server cannot start from state {0:?}")]
    InvalidState(ServerState),
}

/// Build the transport-side router: every request goes to the dispatcher.
pub fn build_router(dispatcher: Dispatcher, max_body_size: usize) -> Router {
    Router::new()
        .fallback(dispatch_handler)
        .with_state(dispatcher)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(max_body_size)),
        )
}

async fn open_listener(
    config: &ListenerConfig,
) -> Result<(TcpListener, SocketAddr), ListenerError> {
    let listener = net::bind(config).await?;
    let addr = listener.local_addr().map_err(ListenerError::Bind)?;
    Ok((listener, addr))
}

async fn dispatch_handler(
    State(dispatcher): State<Dispatcher>,
    request: axum::extract::Request,
) -> WireResponse {
    dispatcher.dispatch(request).await
}

/// The dispatcher server.
pub struct HttpServer {
    config: ServerConfig,
    registry: Arc<RouteRegistry>,
    shutdown: Shutdown,
    state: Arc<watch::Sender<ServerState>>,
    local_addr: OnceLock<SocketAddr>,
    serve_task: Mutex<Option<JoinHandle<()>>>,
}

impl HttpServer {
    /// Create a server with an empty registry.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, RouteRegistry::new())
    }

    pub fn with_registry(config: ServerConfig, registry: RouteRegistry) -> Self {
        let (state, _) = watch::channel(ServerState::Created);
        Self {
            config,
            registry: Arc::new(registry),
            shutdown: Shutdown::new(),
            state: Arc::new(state),
            local_addr: OnceLock::new(),
            serve_task: Mutex::new(None),
        }
    }

    /// Register `handler` for `method` and `path`, replacing any earlier one.
    pub fn register(&self, method: impl Into<String>, path: impl AsRef<str>, handler: Handler) {
        self.registry.register(method, path, handler);
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// The bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// A router over this server's registry, for serving or in-process use.
    pub fn router(&self) -> Router {
        let dispatcher = Dispatcher::new(self.registry.clone(), self.config.listener.max_body_size);
        build_router(dispatcher, self.config.listener.max_body_size)
    }

    /// Bind and begin serving in the background.
    ///
    /// Returns once the listener is bound. Can only be called once.
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == ServerState::Created {
                *state = ServerState::Starting;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(ServerError::InvalidState(self.state()));
        }
        tracing::info!("HTTP server starting");

        let (listener, addr) = match open_listener(&self.config.listener).await {
            Ok(bound) => bound,
            Err(e) => {
                self.state.send_replace(ServerState::Stopped);
                return Err(e.into());
            }
        };
        let _ = self.local_addr.set(addr);

        if self.config.lifecycle.handle_signals {
            signals::install_exit_hook(self.shutdown.clone());
        }

        let router = self.router();
        let signal = self.shutdown.subscribe();
        let state = self.state.clone();
        let graceful = {
            let state = state.clone();
            async move {
                signal.wait().await;
                state.send_replace(ServerState::ShuttingDown);
                tracing::info!("HTTP server draining connections");
            }
        };

        self.state.send_replace(ServerState::Listening);
        tracing::info!(address = %addr, "HTTP server listening");

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(graceful)
                .await
            {
                tracing::error!(error = %e, "HTTP server error");
            }
            state.send_replace(ServerState::Stopped);
            tracing::info!("HTTP server stopped");
        });
        *self.serve_task.lock().await = Some(task);

        Ok(addr)
    }

    /// Stop accepting, drain open connections and wait until closed.
    ///
    /// Does nothing on a server that was never started.
    pub async fn shutdown(&self) {
        if self.state() == ServerState::Created {
            return;
        }
        self.shutdown.trigger();

        let task = self.serve_task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "Server task did not finish cleanly");
            }
        }
        self.stopped().await;
    }

    /// Resolve once the server has reached [`ServerState::Stopped`].
    pub async fn stopped(&self) {
        let mut rx = self.state.subscribe();
        let _ = rx.wait_for(|state| *state == ServerState::Stopped).await;
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("config", &self.config)
            .field("routes", &self.registry.len())
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}
