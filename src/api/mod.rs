mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::db::Database;
use crate::pipeline::BlueprintService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub blueprints: Arc<BlueprintService>,
}

impl AppState {
    pub fn new(db: Database, blueprints: BlueprintService) -> Self {
        Self {
            db,
            blueprints: Arc::new(blueprints),
        }
    }
}

pub fn create_router(state: AppState, security: &SecurityConfig) -> Router {
    let api = Router::new()
        // Generation
        .route("/generate", post(handlers::generate))
        // Saved ideas
        .route("/ideas", get(handlers::list_ideas).post(handlers::create_idea))
        .route(
            "/ideas/{id}",
            get(handlers::get_idea).delete(handlers::delete_idea),
        )
        .route("/ideas/{id}/download", get(handlers::download_idea))
        // Health
        .route("/health", get(handlers::health))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::identify,
        ));

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(security)),
        )
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    match &security.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        }
        None => CorsLayer::permissive(),
    }
}
