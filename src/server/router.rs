use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{any, get};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, health};
use crate::state::AppState;

/// Builds the application router.
///
/// CORS is open to all origins: the widget is embedded on arbitrary
/// storefront pages. `/chat` accepts any method so non-POST requests get a
/// graceful reply instead of a 405; preflight is answered by the CORS
/// layer.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/chat", any(chat::chat))
        .with_state(state)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}
