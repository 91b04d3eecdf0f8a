//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the axum Router with the guard middleware in front
//! - Wire up middleware (tracing, timeout)
//! - Spawn the background sweep for expired rate-limit windows
//! - Bind the server to a listener with graceful shutdown
//!
//! The default handler stands in for the application layer; library users
//! mount [`guard_middleware`](crate::http::middleware::guard_middleware) on
//! their own router instead.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, response::IntoResponse, routing::any, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GuardConfig;
use crate::guard::Guard;
use crate::http::middleware::guard_middleware;

/// HTTP server hosting the guard in front of an application handler.
pub struct GuardServer {
    router: Router,
    config: GuardConfig,
    guard: Arc<Guard>,
}

impl GuardServer {
    /// Create a server guarding the default placeholder handler.
    pub fn new(config: GuardConfig) -> Self {
        let app = Router::new()
            .route("/{*path}", any(app_handler))
            .route("/", any(app_handler));
        Self::with_app(config, app)
    }

    /// Create a server guarding a caller-supplied application router.
    pub fn with_app(config: GuardConfig, app: Router) -> Self {
        let guard = Arc::new(Guard::new(&config));
        let router = Self::build_router(&config, guard.clone(), app);
        Self {
            router,
            config,
            guard,
        }
    }

    /// Wrap the application router with all middleware layers.
    fn build_router(config: &GuardConfig, guard: Arc<Guard>, app: Router) -> Router {
        app.layer(middleware::from_fn_with_state(guard, guard_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "guard server starting");

        // Background sweep of expired rate-limit windows.
        let sweep_guard = self.guard.clone();
        let sweep_interval =
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(sweep_interval);
            interval.tick().await;
            loop {
                interval.tick().await;
                sweep_guard.sweep_expired();
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("guard server stopped");
        Ok(())
    }

    pub fn guard(&self) -> Arc<Guard> {
        self.guard.clone()
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}

/// Placeholder application handler; requests that reach it were admitted.
async fn app_handler() -> impl IntoResponse {
    "OK"
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
