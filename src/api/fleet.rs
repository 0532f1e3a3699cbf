//! Endpoints de la vista de flota
//!
//! Exponen en JSON la misma vista que pinta la terminal y permiten mandar
//! las señales de refresco y de página siguiente.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::controllers::fleet_controller::{VehicleCategory, ViewSnapshot};
use crate::state::AppState;
use crate::widgets::map_widget::markers_to_geojson;

#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub filter: Option<String>,
    pub category: Option<VehicleCategory>,
}

pub fn create_fleet_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/fleet/vehicles", get(get_vehicles))
        .route("/api/fleet/markers", get(get_markers))
        .route("/api/fleet/refresh", post(refresh))
        .route("/api/fleet/next-page", post(next_page))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "fleet_tracker",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Vista actual; `filter` y `category` en la query cambian el estado como en la terminal
async fn get_vehicles(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> Json<ViewSnapshot> {
    let mut controller = state.controller.write().await;
    if let Some(filter) = query.filter {
        controller.set_filter(&filter).await;
    }
    if let Some(category) = query.category {
        controller.set_category(category).await;
    }
    Json(controller.snapshot().await)
}

async fn get_markers(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.controller.write().await.snapshot().await;
    Json(json!({
        "center": snapshot.center,
        "markers": markers_to_geojson(&snapshot.markers),
    }))
}

async fn refresh(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut controller = state.controller.write().await;
    controller.refresh().await;
    Json(json!({
        "accepted": true,
        "fetchTrigger": controller.fetch_trigger(),
    }))
}

async fn next_page(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut controller = state.controller.write().await;
    let accepted = controller.on_last_row_visible().await;
    Json(json!({
        "accepted": accepted,
        "page": controller.page(),
    }))
}
