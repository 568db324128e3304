use crate::{SignalingService, ws_handler};
use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};

/// HTTP surface: health text on `/` and the signaling websocket on `/ws`.
pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(service)
}

async fn health() -> &'static str {
    "huddle signaling server is running"
}
