pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::thumbnail::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/thumbnails",
            post(handlers::handle_generate_thumbnail)
                .fallback(handlers::handle_method_not_allowed),
        )
        .with_state(state)
}
