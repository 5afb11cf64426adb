//! SkillMatch API Gateway
//!
//! The HTTP entry point for assessment recommendations.
//! Handles:
//! - Background construction of the recommendation engine
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics)

mod handlers;
mod middleware;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use middleware::rate_limit::{rate_limit_middleware, RateLimit};
use skillmatch_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics::{self, LATENCY_BUCKETS},
};
use skillmatch_search::RecommendationEngine;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::{Notify, Semaphore};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Filled exactly once when the background build finishes
    pub engine: Arc<OnceLock<RecommendationEngine>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load().context("failed to load configuration")?);

    // Initialize tracing
    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting SkillMatch API Gateway v{}",
        skillmatch_common::VERSION
    );

    // Initialize metrics
    init_metrics(config.observability.metrics_port)?;

    let state = AppState {
        config: config.clone(),
        engine: Arc::new(OnceLock::new()),
    };

    // Embedding the catalog is CPU-bound; keep it off the async workers
    let init = {
        let config = config.clone();
        let slot = state.engine.clone();
        tokio::task::spawn_blocking(move || {
            let engine = RecommendationEngine::from_config(&config)?;
            let _ = slot.set(engine);
            Ok::<_, skillmatch_common::AppError>(())
        })
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    let server = run_server(listener, app, config.shutdown_timeout());
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        joined = init => {
            match joined {
                Ok(Ok(())) => info!("Recommendation engine ready"),
                Ok(Err(e)) => {
                    error!(error = %e, "Failed to initialize recommendation engine");
                    return Err(e.into());
                }
                Err(e) => {
                    error!(error = %e, "Engine initialization task panicked");
                    return Err(e.into());
                }
            }
            server.await?;
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Serve until a shutdown signal, then allow in-flight requests
/// `drain_timeout` to finish
async fn run_server(listener: TcpListener, app: Router, drain_timeout: Duration) -> std::io::Result<()> {
    let draining = Arc::new(Notify::new());

    let signal = {
        let draining = draining.clone();
        async move {
            shutdown_signal().await;
            draining.notify_one();
        }
    };
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .into_future();

    let deadline = async {
        draining.notified().await;
        tokio::time::sleep(drain_timeout).await;
    };

    tokio::select! {
        result = server => result,
        _ = deadline => {
            warn!(timeout_secs = drain_timeout.as_secs(), "Graceful shutdown timed out, dropping open connections");
            Ok(())
        }
    }
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

fn init_metrics(port: u16) -> anyhow::Result<()> {
    if port == 0 {
        info!("Prometheus exporter disabled");
        return Ok(());
    }

    PrometheusBuilder::new()
        .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
        .set_buckets(LATENCY_BUCKETS)?
        .install()
        .context("failed to install Prometheus exporter")?;

    metrics::register_metrics();
    info!(port, "Prometheus exporter listening");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Probes stay outside the rate limit
    let recommend = if state.config.rate_limit.enabled {
        let limit = RateLimit::from_config(&state.config.rate_limit);
        post(handlers::recommend::recommend)
            .layer(axum::middleware::from_fn_with_state(limit, rate_limit_middleware))
    } else {
        post(handlers::recommend::recommend)
    };

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/recommend", recommend)
        .layer(axum::middleware::from_fn(middleware::metrics::track_metrics))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(axum::middleware::from_fn_with_state(
            Arc::new(Semaphore::new(state.config.server.max_concurrent_requests)),
            middleware::concurrency::limit_concurrency,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
