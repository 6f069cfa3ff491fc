//! Exoplanet Vetting API Server
//!
//! Serves per-criterion explanations of the KOI classifier to the vetting UI.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  EXOPLANET VETTING API                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────────┐  ┌────────────────────┐ │
//! │  │  API      │  │  Explainer     │  │  Feedback Log      │ │
//! │  │  (Axum)   │─▶│  Handle        │  │  (JSONL, rotated)  │ │
//! │  └───────────┘  └───────┬────────┘  └────────────────────┘ │
//! │                         ▼                                   │
//! │          classifier · explainer · KOI dataset               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod handlers;
mod error;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::{header, HeaderValue, Method},
    routing::{get, post},
};
use exoplanet_core::logic::dataset::FeedbackWriter;
use exoplanet_core::ExplainerHandle;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exoplanet_api=debug,exoplanet_core=info,tower_http=debug".into());
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Exoplanet Vetting API starting...");
    tracing::info!(
        "Model: {} ({}), dataset: {}",
        config.engine.model_path.display(),
        config.engine.model_format,
        config.engine.dataset_path.display()
    );

    // Build the explainer once; artifacts are read-only afterwards
    let engine = config.engine.clone();
    let explainer = tokio::task::spawn_blocking(move || engine.build())
        .await?
        .context("Failed to build explainer")?;

    let feedback = FeedbackWriter::from_path(config.feedback_dir.clone())
        .context("Failed to open feedback log")?;
    tracing::info!("Feedback log: {}", feedback.base_dir().display());

    // Build application state
    let state = AppState {
        handle: Arc::new(ExplainerHandle::new(explainer)),
        feedback: Arc::new(feedback),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub handle: Arc<ExplainerHandle>,
    pub feedback: Arc<FeedbackWriter>,
    pub config: Arc<config::Config>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/api/health", get(handlers::health::check))
        .route("/api/layout", get(handlers::admin::layout))
        .route("/api/explain_sample", get(handlers::explain::explain_sample))
        .route("/api/retrain", post(handlers::feedback::retrain))
        .route("/api/feedback/stats", get(handlers::feedback::stats))
        .route("/api/reload", post(handlers::admin::reload))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
