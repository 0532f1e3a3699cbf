//! API endpoints
//!
//! Este módulo contiene los endpoints del servidor de desarrollo.

pub mod fleet;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_middleware;
use crate::routes::dev_proxy::create_dev_proxy_router;
use crate::state::AppState;

/// Crear el router principal: vista de flota + passthrough a la API remota
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(fleet::create_fleet_router())
        .merge(create_dev_proxy_router(&state.config.dev_proxy_prefix))
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware())
        .with_state(state)
}
