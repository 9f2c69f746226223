pub mod handlers;

pub use handlers::*;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;

/// 路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/orders/normalize", post(normalize_orders))
        .route("/api/orders/extract", post(run_extraction))
        .with_state(state)
        .layer(ServiceBuilder::new())
}
