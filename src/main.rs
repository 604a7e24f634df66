//! Wedding Gallery Backend
//!
//! A small REST gateway that moderates the wedding photo gallery on top of an
//! external media store, and serves the built front end.

mod api;
mod auth;
mod config;
mod errors;
mod media;
mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use errors::AppError;
use media::MediaStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` when media store credentials are unset; every media operation
    /// then reports a config error.
    pub media: Option<Arc<MediaStore>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let media = MediaStore::from_config(&config).map(Arc::new);
        Self {
            config: Arc::new(config),
            media,
        }
    }

    /// Media store handle, or the config error surfaced when credentials
    /// are missing.
    pub fn media(&self) -> Result<&MediaStore, AppError> {
        self.media
            .as_deref()
            .ok_or_else(|| AppError::Config("Media store configuration is missing.".into()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting wedding gallery backend");
    tracing::info!("Gallery tag: {}", config.gallery_tag);
    tracing::info!("Pending tag: {}", config.pending_tag);
    tracing::info!("Static dir: {:?}", config.static_dir);

    // Warn on incomplete deployment config; requests will surface the errors
    if config.admin_key.is_none() {
        tracing::warn!("No admin key configured (PHOTOS_ADMIN_KEY). Admin operations will fail!");
    }
    if config.cloud_name.is_none() || config.api_key.is_none() || config.api_secret.is_none() {
        tracing::warn!("Media store credentials incomplete. Photo operations will fail!");
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(config);
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes; admin handlers enforce the shared secret themselves
    let api_routes = Router::new()
        .route(
            "/photos",
            get(api::list_photos).delete(api::delete_photo),
        )
        .route("/photos/pending", get(api::list_pending_photos))
        .route("/photos/approve", post(api::approve_photo))
        .route("/photos/unapprove", post(api::unapprove_photo))
        .route("/photos/caption", post(api::set_caption))
        .route("/photos/reorder", post(api::reorder_photos));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    // Built front end with SPA index fallback
    let index_file = state.config.static_dir.join("index.html");
    let static_files =
        ServeDir::new(&state.config.static_dir).fallback(ServeFile::new(index_file));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
