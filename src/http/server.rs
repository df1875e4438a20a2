//! HTTP server setup and the relay handler.
//!
//! # Responsibilities
//! - Create the Axum router (relay route, form page, fallback)
//! - Wire up middleware (tracing)
//! - Recover the target from the `/pages/` path segment
//! - Forward through the executor and transcribe the outcome
//! - Serve until the shutdown signal fires
//!
//! # Design Decisions
//! - The router decodes the segment once and `normalize` decodes it again,
//!   so a target may carry its own escapes (such as `%253F`) through the path

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::HeaderMap,
    response::Response,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::http::response;
use crate::relay::{
    normalize, DefaultScheme, Executor, ForwardOutcome, Identity, ReqwestTransport, Transport,
};

const OPERATION: &str = "relay_page";

/// Application state injected into handlers.
pub struct AppState<T> {
    pub executor: Arc<Executor<T>>,
    pub default_scheme: DefaultScheme,
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            default_scheme: self.default_scheme,
        }
    }
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Production server: reqwest transport, crawler identity, `https` default.
    pub fn new() -> Result<Self, reqwest::Error> {
        let executor = Executor::new(ReqwestTransport::new()?, Identity::googlebot());
        Ok(Self::from_executor(executor, DefaultScheme::Https))
    }

    /// Server around a caller-built executor and default scheme.
    ///
    /// Test and bench harnesses use this to reach plain-HTTP upstreams.
    pub fn from_executor<T: Transport>(
        executor: Executor<T>,
        default_scheme: DefaultScheme,
    ) -> Self {
        let state = AppState {
            executor: Arc::new(executor),
            default_scheme,
        };
        let router = Self::build_router(state);
        Self { router }
    }

    fn build_router<T: Transport>(state: AppState<T>) -> Router {
        Router::new()
            .route("/pages/{*page}", any(relay_page::<T>))
            .route("/pages/", any(relay_empty::<T>))
            .route("/pages", any(relay_empty::<T>))
            .route("/", get(response::index_page))
            .fallback(response::index_page)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Consume the server, returning its router for in-process use.
    pub fn into_router(self) -> Router {
        self.router
    }
}

/// Relay handler for `/pages/<target>`.
async fn relay_page<T: Transport>(
    State(state): State<AppState<T>>,
    page: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Response {
    match page {
        Ok(Path(page)) => relay(&state, &page, &headers).await,
        Err(e) => {
            tracing::error!(operation = OPERATION, error = %e, "Invalid target URL");
            response::invalid_target()
        }
    }
}

/// `/pages` and `/pages/` carry no target at all.
async fn relay_empty<T: Transport>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
) -> Response {
    relay(&state, "", &headers).await
}

async fn relay<T: Transport>(state: &AppState<T>, page: &str, headers: &HeaderMap) -> Response {
    let target = match normalize(page, state.default_scheme) {
        Ok(target) => target,
        Err(e) => {
            tracing::error!(operation = OPERATION, error = %e, "Invalid target URL");
            return response::invalid_target();
        }
    };

    tracing::debug!(target = %target, "Proxied request");

    match state.executor.forward(target, headers).await {
        Ok(ForwardOutcome::Relay(upstream)) => response::relay(upstream),
        Ok(ForwardOutcome::Partial(upstream)) => response::relay_partial(upstream),
        Ok(ForwardOutcome::Aborted) => response::aborted(),
        Err(e) => {
            tracing::error!(operation = OPERATION, error = %e, "Cannot build upstream request");
            response::internal_error()
        }
    }
}
