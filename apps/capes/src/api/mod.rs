//! # Capes HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET|POST /api/characters` - List (filtered, ordered, paginated) / create
//! - `GET|PUT|PATCH|DELETE /api/characters/{id}` - Read / update / delete
//! - `GET /api/characters/stats` - Aggregate statistics
//! - `GET /api/characters/by_universe?universe=` - One universe
//! - `GET /api/characters/top?limit=` - Strongest non-villains
//! - `GET /api/characters/villains` - Villains only
//! - `POST /api/characters/{id}/toggle_villain` - Flip villain status
//! - `POST /api/characters/{id}/toggle_active` - Flip active status
//!
//! ## Security Configuration
//!
//! CORS origins and the rate limit come from [`Settings`]
//! (`CAPES_CORS_ORIGINS`, `CAPES_RATE_LIMIT`).

mod error;
mod handlers;
mod middleware;
mod types;

pub use error::{AppError, AppResult};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{ErrorResponse, HealthResponse, LimitQuery, UniverseQuery, ValidationErrorResponse};

use crate::config::Settings;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use capes_core::{Catalogue, CatalogueError, StorageBackend, primitives::DEFAULT_PAGE_SIZE};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted request body (2 MiB).
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state containing the catalogue.
#[derive(Clone)]
pub struct AppState {
    /// The catalogue; mutations take the write lock.
    pub catalogue: Arc<RwLock<Catalogue<StorageBackend>>>,
    /// Page size used when a listing does not ask for one.
    pub page_size: usize,
}

impl AppState {
    /// Create new app state around a catalogue.
    #[must_use]
    pub fn new(catalogue: Catalogue<StorageBackend>) -> Self {
        Self {
            catalogue: Arc::new(RwLock::new(catalogue)),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Build the CORS layer from the configured origins.
///
/// - `"*"`: allows all origins (development only)
/// - unset: localhost only
/// - otherwise: the comma-separated list of origins
fn build_cors_layer(origins: Option<&str>) -> CorsLayer {
    match origins {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins. This is insecure for production!");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!("CORS: No valid origins configured, defaulting to localhost only");
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods(CORS_METHODS)
                    .allow_headers([header::CONTENT_TYPE])
            }
        }
        None => {
            tracing::info!("CORS: No origins configured, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting - protects against floods (if enabled)
pub fn create_router(state: AppState, settings: &Settings) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route(
            "/api/characters",
            get(handlers::list_handler).post(handlers::create_handler),
        )
        .route("/api/characters/stats", get(handlers::stats_handler))
        .route(
            "/api/characters/by_universe",
            get(handlers::by_universe_handler),
        )
        .route("/api/characters/top", get(handlers::top_handler))
        .route("/api/characters/villains", get(handlers::villains_handler))
        .route(
            "/api/characters/{id}",
            get(handlers::get_handler)
                .put(handlers::replace_handler)
                .patch(handlers::patch_handler)
                .delete(handlers::delete_handler),
        )
        .route(
            "/api/characters/{id}/toggle_villain",
            post(handlers::toggle_villain_handler),
        )
        .route(
            "/api/characters/{id}/toggle_active",
            post(handlers::toggle_active_handler),
        );

    if settings.rate_limit > 0 {
        tracing::info!(
            "Rate limiting enabled: {} requests/second",
            settings.rate_limit
        );
        router = router.layer(axum_middleware::from_fn_with_state(
            create_rate_limiter(settings.rate_limit),
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Rate limiting disabled");
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(settings.cors_origins.as_deref()))
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Resolves when the process receives Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

/// Start the HTTP server.
pub async fn run_server(
    settings: &Settings,
    catalogue: Catalogue<StorageBackend>,
) -> Result<(), CatalogueError> {
    let state = AppState::new(catalogue).with_page_size(settings.page_size);
    let router = create_router(state, settings);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CatalogueError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Capes HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CatalogueError::IoError(format!("Server error: {}", e)))
}
