use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::Request as AxumRequest,
    http::{Request, StatusCode},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use fleet_tracker::api::create_app;
use fleet_tracker::client::VehicleSource;
use fleet_tracker::config::environment::EnvironmentConfig;
use fleet_tracker::controllers::fleet_controller::FleetController;
use fleet_tracker::dto::vehicle_dto::VehicleQuery;
use fleet_tracker::models::vehicle::{ApiContent, LocationRecord, VehicleRecord, VehicleStatus};
use fleet_tracker::state::AppState;
use fleet_tracker::utils::errors::AppResult;

struct TwoVehicles;

fn record(id: &str, plate: &str) -> VehicleRecord {
    VehicleRecord {
        id: id.to_string(),
        plate: plate.to_string(),
        fleet: None,
        vehicle_type: "vehicle".to_string(),
        model: "Model".to_string(),
        name_owner: "Owner".to_string(),
        status: VehicleStatus::Active,
        created_at: None,
    }
}

#[async_trait]
impl VehicleSource for TwoVehicles {
    async fn list_with_paginate(&self, _query: &VehicleQuery) -> AppResult<ApiContent> {
        Ok(ApiContent {
            vehicles: vec![record("1", "AAA1234"), record("2", "BBB5678")],
            location_vehicles: vec![LocationRecord {
                id: None,
                fleet: None,
                equipment_id: None,
                name: None,
                plate: Some("AAA1234".to_string()),
                ignition: None,
                lat: Some(-23.5),
                lng: Some(-46.6),
                speed: None,
                created_at: None,
            }],
            total_pages: Some(1),
            page: Some(1),
            per_page: Some(20),
        })
    }
}

fn config(api_base_url: &str) -> EnvironmentConfig {
    let base = api_base_url.to_string();
    EnvironmentConfig::from_lookup(move |key: &str| match key {
        "API_BASE_URL" => Some(base.clone()),
        "AUTH_TOKEN" => Some("t".to_string()),
        _ => None,
    })
    .unwrap()
}

fn create_test_app(api_base_url: &str) -> (Router, Arc<RwLock<FleetController>>) {
    let controller = Arc::new(RwLock::new(FleetController::new(Arc::new(TwoVehicles), 20)));
    let state = AppState::new(config(api_base_url), Arc::clone(&controller)).unwrap();
    (create_app(state), controller)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn wait_idle(controller: &Arc<RwLock<FleetController>>) {
    let fetcher = Arc::clone(controller.read().await.fetcher());
    fetcher.wait_idle().await;
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app("http://127.0.0.1:1");
    let (status, body) = send(&app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fleet_tracker");
}

#[tokio::test]
async fn test_fleet_view_endpoints() {
    let (app, controller) = create_test_app("http://127.0.0.1:1");

    let (status, body) = send(&app, "POST", "/api/fleet/refresh").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fetchTrigger"], 1);
    wait_idle(&controller).await;

    let (_, body) = send(&app, "GET", "/api/fleet/vehicles").await;
    assert_eq!(body["category"], "tracked");
    assert_eq!(body["totalLoaded"], 2);
    assert_eq!(body["vehicles"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["vehicles"][0]["plate"], "AAA1234");
    assert_eq!(body["hasMore"], false);

    let (_, body) = send(&app, "GET", "/api/fleet/markers").await;
    assert_eq!(body["markers"]["type"], "FeatureCollection");
    assert_eq!(
        body["markers"]["features"][0]["geometry"]["coordinates"],
        json!([-46.6, -23.5])
    );
    assert_eq!(body["center"]["lat"], -23.5);

    // sin más páginas la señal se ignora
    let (_, body) = send(&app, "POST", "/api/fleet/next-page").await;
    assert_eq!(body["accepted"], false);
    assert_eq!(body["page"], 1);

    send(&app, "GET", "/api/fleet/vehicles?category=others").await;
    wait_idle(&controller).await;
    let (_, body) = send(&app, "GET", "/api/fleet/vehicles").await;
    assert_eq!(body["category"], "others");
    assert_eq!(body["vehicles"][0]["plate"], "BBB5678");
}

#[tokio::test]
async fn test_passthrough_strips_prefix() {
    async fn echo(request: AxumRequest) -> Json<Value> {
        Json(json!({
            "method": request.method().as_str(),
            "uri": request.uri().to_string(),
            "authorization": request
                .headers()
                .get("authorization")
                .and_then(|v| v.to_str().ok()),
        }))
    }

    let upstream = Router::new().route("/*path", any(echo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, upstream).await.unwrap();
    });

    let (app, _) = create_test_app(&format!("http://{}", addr));
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/recruitment/vehicles/list-with-paginate?page=2&perPage=20")
                .header("authorization", "Bearer abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["method"], "GET");
    assert_eq!(body["uri"], "/vehicles/list-with-paginate?page=2&perPage=20");
    assert_eq!(body["authorization"], "Bearer abc");
}

#[tokio::test]
async fn test_passthrough_upstream_down_is_bad_gateway() {
    let (app, _) = create_test_app("http://127.0.0.1:1");
    let (status, _) = send(&app, "GET", "/recruitment/vehicles").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
