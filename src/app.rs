use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::routes::{analyze, health};
use crate::state::AppState;

pub fn create_app(state: AppState, cors_allow_origin: &str) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/analyze", analyze::router())
        .nest("/analyze", analyze::router())
        .layer(cors_layer(cors_allow_origin))
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origin == "*" {
        return layer.allow_origin(Any);
    }

    match HeaderValue::from_str(origin) {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS_ALLOW_ORIGIN '{}', allowing any origin", origin);
            layer.allow_origin(Any)
        }
    }
}
