use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use papercheck_core::{Config, ServerConfig};
use papercheck_pdf_mupdf::MupdfBackend;
use papercheck_scoring::HostedModelCorrector;

mod handlers;
mod models;
mod state;
mod upload;


use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::load();
    tracing::debug!(?config, "configuration loaded");

    let http = reqwest::Client::new();
    let state = Arc::new(AppState::new(
        Arc::new(MupdfBackend::new()),
        Arc::new(HostedModelCorrector::from_config(http, &config.scoring)),
        config.storage.clone(),
    ));

    let app = router(state, &config.server);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutting down");
    }
}

pub(crate) fn router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let body_limit = DefaultBodyLimit::max(server.max_upload_mb * 1024 * 1024);

    Router::new()
        .route("/validate", post(handlers::validate::validate))
        .route("/sign-s3", get(handlers::sign::sign_s3))
        .route("/correct", post(handlers::correct::correct))
        .layer(body_limit)
        .layer(cors_layer(&server.cors_origins))
        .with_state(state)
}

/// Any origin unless `origins` names some.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
