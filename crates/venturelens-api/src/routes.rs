use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))

        // Analysis flows
        .route("/api/validate", post(handlers::validate))
        .route("/api/pivot", post(handlers::pivot))
        .route("/api/roadmap", post(handlers::roadmap))
        .route("/api/competitors", post(handlers::competitors))
        .route("/api/market-size", post(handlers::market_size))
        .route("/api/tech-stack", post(handlers::tech_stack))

        // Generative flows with fallbacks
        .route("/api/roast", post(handlers::roast))
        .route("/api/brand-vibe", post(handlers::brand_vibe))
        .route("/api/domain-check", post(handlers::domain_check))

        .fallback(handlers::not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}
