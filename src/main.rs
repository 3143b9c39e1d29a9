//! Dragon Ball Browser
//!
//! A headless browsing engine for the public Dragon Ball API: paginated
//! fetching, an in-memory collection cache, and client-side search and
//! filtering, served to a rendering layer over a local REST API.

mod api;
mod cache;
mod client;
mod config;
mod errors;
mod models;
mod pagination;
mod search;
mod session;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use client::DragonBallClient;
use config::Config;
use models::Resource;
use session::{BrowseSession, SessionOptions};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<BrowseSession>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Dragon Ball Browser");
    tracing::info!("Remote API: {}", config.api_base_url);
    tracing::info!(
        "Page limit: {}, fetch timeout: {:?}",
        config.page_limit,
        config.fetch_timeout
    );
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize remote client and session
    let client = DragonBallClient::new(&config.api_base_url, config.fetch_timeout)?;
    let session = Arc::new(BrowseSession::new(
        Arc::new(client),
        SessionOptions::from(&config),
    ));

    if config.preload {
        tracing::info!("Preloading first pages...");
        let (characters, planets) = tokio::join!(
            session.load_more(Resource::Characters, None),
            session.load_more(Resource::Planets, None),
        );
        tracing::info!(?characters, ?planets, "Preload finished");
    }

    // Create application state
    let state = AppState { session };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

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

    // API routes
    let api_routes = Router::new()
        // Characters
        .route("/characters", get(api::list_characters))
        .route("/characters/view", post(api::view_characters))
        .route("/characters/{id}", get(api::get_character))
        // Planets
        .route("/planets", get(api::list_planets))
        .route("/planets/{id}", get(api::get_planet))
        // Transformations
        .route("/transformations", get(api::list_transformations))
        .route("/transformations/{id}", get(api::get_transformation))
        // Criteria
        .route(
            "/criteria",
            get(api::get_criteria)
                .put(api::replace_criteria)
                .delete(api::clear_criteria),
        )
        .route("/criteria/search", put(api::set_search))
        .route("/criteria/planet", put(api::set_planet))
        .route("/criteria/filters", put(api::set_filters))
        // Pagination
        .route("/pages/{resource}/more", post(api::load_more))
        .route("/pages/{resource}/reload", post(api::reload))
        .route("/status", get(api::get_status))
        .route("/retry", post(api::retry));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
