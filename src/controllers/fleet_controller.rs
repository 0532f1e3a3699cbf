//! Contenedor de la vista de flota
//!
//! Mantiene filtro, categoría y paginación, lanza las peticiones a través del
//! `VehicleFetcher` y deriva la lista filtrada y los marcadores del mapa.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::VehicleSource;
use crate::dto::vehicle_dto::FetchParams;
use crate::models::geo::GeoPoint;
use crate::models::vehicle::{EnrichedVehicle, PageMeta};
use crate::services::vehicle_fetcher::VehicleFetcher;
use crate::widgets::map_widget::MapMarker;

/// Tipo que se envía siempre al servidor; la separación por categoría es local
pub const SERVER_VEHICLE_TYPE: &str = "tracked";

/// Partición de la lista según haya coordenadas o no
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Tracked,
    Others,
}

impl VehicleCategory {
    pub fn matches(&self, vehicle: &EnrichedVehicle) -> bool {
        match self {
            VehicleCategory::Tracked => vehicle.is_tracked(),
            VehicleCategory::Others => !vehicle.is_tracked(),
        }
    }
}

impl FromStr for VehicleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tracked" | "rastreados" => Ok(VehicleCategory::Tracked),
            "others" | "outros" => Ok(VehicleCategory::Others),
            other => Err(format!("categoría desconocida: {}", other)),
        }
    }
}

/// Foto consistente de la vista para los renderizadores y la API JSON
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub filter: String,
    pub category: VehicleCategory,
    pub page: u32,
    pub per_page: u32,
    pub vehicles: Vec<EnrichedVehicle>,
    pub markers: Vec<MapMarker>,
    pub center: GeoPoint,
    pub total_loaded: usize,
    pub meta: Option<PageMeta>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub selected: Option<EnrichedVehicle>,
}

pub struct FleetController {
    fetcher: Arc<VehicleFetcher>,
    filter: String,
    category: VehicleCategory,
    page: u32,
    per_page: u32,
    fetch_trigger: u64,
    selected: Option<EnrichedVehicle>,
    map_center: GeoPoint,
    in_flight: Option<JoinHandle<bool>>,
    refresh_token: Option<CancellationToken>,
}

impl FleetController {
    pub fn new(source: Arc<dyn VehicleSource>, per_page: u32) -> Self {
        Self {
            fetcher: Arc::new(VehicleFetcher::new(source)),
            filter: String::new(),
            category: VehicleCategory::Tracked,
            page: 1,
            per_page,
            fetch_trigger: 0,
            selected: None,
            map_center: GeoPoint::default(),
            in_flight: None,
            refresh_token: None,
        }
    }

    pub fn params(&self) -> FetchParams {
        FetchParams {
            filter: self.filter.clone(),
            vehicle_type: SERVER_VEHICLE_TYPE.to_string(),
            page: self.page,
            per_page: self.per_page,
            fetch_trigger: self.fetch_trigger,
        }
    }

    pub fn fetcher(&self) -> &Arc<VehicleFetcher> {
        &self.fetcher
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn category(&self) -> VehicleCategory {
        self.category
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn fetch_trigger(&self) -> u64 {
        self.fetch_trigger
    }

    /// Emite la petición con los parámetros actuales. `is_loading` cambia antes
    /// de volver; la respuesta llega en una tarea aparte.
    async fn dispatch(&mut self) {
        let ticket = self.fetcher.begin(self.params()).await;

        if let Some(previous) = self.in_flight.take() {
            if !previous.is_finished() {
                debug!("petición #{} reemplaza a una en curso", ticket.id);
                previous.abort();
            }
        }

        let fetcher = Arc::clone(&self.fetcher);
        self.in_flight = Some(tokio::spawn(async move { fetcher.run(ticket).await }));
    }

    /// Espera a que termine la petición en curso. Devuelve si se aplicó.
    pub async fn settle(&mut self) -> bool {
        match self.in_flight.take() {
            Some(handle) => handle.await.unwrap_or(false),
            None => false,
        }
    }

    /// Vuelve a la página 1 y descarta lo acumulado
    pub async fn refresh(&mut self) {
        self.page = 1;
        self.fetch_trigger += 1;
        info!(
            "🔄 Refrescando lista (trigger={}, filtro='{}')",
            self.fetch_trigger, self.filter
        );
        self.dispatch().await;
    }

    /// Cambia el filtro (sin espacios a los lados); igual al actual no hace nada
    pub async fn set_filter(&mut self, filter: &str) -> bool {
        let filter = filter.trim();
        if self.filter == filter {
            return false;
        }
        self.filter = filter.to_string();
        self.refresh().await;
        true
    }

    pub async fn set_category(&mut self, category: VehicleCategory) -> bool {
        if self.category == category {
            return false;
        }
        self.category = category;
        self.refresh().await;
        true
    }

    /// Señal externa de "la última fila es visible": pide la página siguiente
    /// si hay más y no hay una carga en curso
    pub async fn on_last_row_visible(&mut self) -> bool {
        let state = self.fetcher.state().await;
        if state.is_loading || !state.has_more {
            debug!(
                "paginación ignorada (loading={}, has_more={})",
                state.is_loading, state.has_more
            );
            return false;
        }
        self.page += 1;
        info!("⏬ Cargando página {}", self.page);
        self.dispatch().await;
        true
    }

    /// Abre el detalle de un vehículo de la lista acumulada
    pub async fn select_vehicle(&mut self, id: &str) -> Option<&EnrichedVehicle> {
        let state = self.fetcher.state().await;
        self.selected = state.data.into_iter().find(|v| v.vehicle.id == id);
        self.selected.as_ref()
    }

    pub fn close_details(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&EnrichedVehicle> {
        self.selected.as_ref()
    }

    pub async fn filtered_vehicles(&self) -> Vec<EnrichedVehicle> {
        let state = self.fetcher.state().await;
        filter_by_category(&state.data, self.category)
    }

    /// Marcadores de la vista filtrada
    pub async fn map_markers(&self) -> Vec<MapMarker> {
        build_markers(&self.filtered_vehicles().await)
    }

    pub fn map_center(&self) -> GeoPoint {
        self.map_center
    }

    /// Recentra en el primer marcador si difiere del centro actual
    pub fn sync_map_center(&mut self, markers: &[MapMarker]) -> bool {
        match markers.first() {
            Some(first) if first.position != self.map_center => {
                self.map_center = first.position;
                true
            }
            _ => false,
        }
    }

    pub async fn snapshot(&mut self) -> ViewSnapshot {
        let state = self.fetcher.state().await;
        let vehicles = filter_by_category(&state.data, self.category);
        let markers = build_markers(&vehicles);
        self.sync_map_center(&markers);

        ViewSnapshot {
            filter: self.filter.clone(),
            category: self.category,
            page: self.page,
            per_page: self.per_page,
            total_loaded: state.data.len(),
            vehicles,
            markers,
            center: self.map_center,
            meta: state.meta,
            is_loading: state.is_loading,
            is_error: state.is_error,
            error: state.error,
            has_more: state.has_more,
            selected: self.selected.clone(),
        }
    }

    /// Asocia la tarea de refresco automático; cancela la anterior si la hubiera
    pub fn attach_refresh(&mut self, token: CancellationToken) {
        if let Some(previous) = self.refresh_token.replace(token) {
            previous.cancel();
        }
    }

    /// Cancela el refresco automático y la petición en curso
    pub fn teardown(&mut self) {
        if let Some(token) = self.refresh_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for FleetController {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Rastreados: latitud y longitud presentes. Otros: falta alguna.
pub fn filter_by_category(
    vehicles: &[EnrichedVehicle],
    category: VehicleCategory,
) -> Vec<EnrichedVehicle> {
    vehicles
        .iter()
        .filter(|v| category.matches(v))
        .cloned()
        .collect()
}

pub fn build_markers(vehicles: &[EnrichedVehicle]) -> Vec<MapMarker> {
    vehicles
        .iter()
        .filter_map(|v| {
            let position = v.position()?;
            Some(MapMarker {
                id: v.vehicle.id.clone(),
                position,
                info_content: Some(marker_label(v)),
            })
        })
        .collect()
}

pub fn marker_label(vehicle: &EnrichedVehicle) -> String {
    format!(
        "Placa: {}\nFrota: {}\nStatus: {}",
        vehicle.vehicle.plate,
        vehicle.vehicle.fleet_label(),
        vehicle.vehicle.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::vehicle_dto::VehicleQuery;
    use crate::models::vehicle::{ApiContent, LocationRecord, VehicleRecord, VehicleStatus};
    use crate::utils::errors::AppResult;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Devuelve dos vehículos por página (uno con ubicación), tres páginas.
    /// El filtro "lento" tarda 10 s en responder.
    struct PagedSource {
        queries: Mutex<Vec<VehicleQuery>>,
    }

    impl PagedSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                queries: Mutex::new(vec![]),
            })
        }

        fn query_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VehicleSource for PagedSource {
        async fn list_with_paginate(&self, query: &VehicleQuery) -> AppResult<ApiContent> {
            self.queries.lock().unwrap().push(query.clone());
            let prefix = query.filter.clone().unwrap_or_else(|| "V".to_string());
            if prefix == "lento" {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }

            let tracked = format!("{}{}T", prefix, query.page);
            let untracked = format!("{}{}U", prefix, query.page);
            Ok(ApiContent {
                vehicles: vec![record(&tracked), record(&untracked)],
                location_vehicles: vec![LocationRecord {
                    id: None,
                    fleet: None,
                    equipment_id: None,
                    name: None,
                    plate: Some(tracked.clone()),
                    ignition: None,
                    lat: Some(-20.0 - f64::from(query.page)),
                    lng: Some(-40.0),
                    speed: None,
                    created_at: None,
                }],
                total_pages: Some(3),
                page: Some(query.page),
                per_page: Some(query.per_page),
            })
        }
    }

    fn record(plate: &str) -> VehicleRecord {
        VehicleRecord {
            id: plate.to_string(),
            plate: plate.to_string(),
            fleet: None,
            vehicle_type: "vehicle".to_string(),
            model: "Model".to_string(),
            name_owner: "Owner".to_string(),
            status: VehicleStatus::Active,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_refresh_and_infinite_scroll() {
        let source = PagedSource::new();
        let mut controller = FleetController::new(source.clone(), 2);
        controller.refresh().await;
        controller.settle().await;

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.total_loaded, 2);
        assert_eq!(snapshot.vehicles.len(), 1);
        assert!(snapshot.has_more);

        assert!(controller.on_last_row_visible().await);
        // la carga en curso bloquea una segunda señal
        assert!(!controller.on_last_row_visible().await);
        controller.settle().await;
        assert_eq!(controller.page(), 2);
        assert_eq!(controller.snapshot().await.total_loaded, 4);

        controller.on_last_row_visible().await;
        controller.settle().await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.total_loaded, 6);
        assert!(!snapshot.has_more);

        // sin más páginas la señal no hace nada
        assert!(!controller.on_last_row_visible().await);
        assert_eq!(source.query_count(), 3);

        controller.refresh().await;
        controller.settle().await;
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.snapshot().await.total_loaded, 2);
    }

    #[tokio::test]
    async fn test_category_partition() {
        let source = PagedSource::new();
        let mut controller = FleetController::new(source, 2);
        controller.refresh().await;
        controller.settle().await;
        controller.on_last_row_visible().await;
        controller.settle().await;

        let all = controller.fetcher().state().await.data;
        let tracked = controller.filtered_vehicles().await;
        controller.set_category(VehicleCategory::Others).await;
        assert_eq!(controller.category(), VehicleCategory::Others);
        controller.settle().await;
        let others_after_reset = controller.filtered_vehicles().await;

        assert!(tracked.iter().all(|v| v.latitude.is_some() && v.longitude.is_some()));
        assert!(others_after_reset.iter().all(|v| !v.is_tracked()));

        let tracked_part = filter_by_category(&all, VehicleCategory::Tracked);
        let others_part = filter_by_category(&all, VehicleCategory::Others);
        assert_eq!(tracked_part.len() + others_part.len(), all.len());
        assert!(tracked_part
            .iter()
            .all(|t| !others_part.iter().any(|o| o.vehicle.id == t.vehicle.id)));
    }

    #[tokio::test]
    async fn test_filter_change_resets_page_and_is_idempotent() {
        let source = PagedSource::new();
        let mut controller = FleetController::new(source.clone(), 2);
        controller.refresh().await;
        controller.settle().await;
        controller.on_last_row_visible().await;
        controller.settle().await;
        let trigger = controller.fetch_trigger();

        assert!(controller.set_filter("ABC").await);
        assert_eq!(controller.filter(), "ABC");
        assert_eq!(controller.page(), 1);
        assert_eq!(controller.fetch_trigger(), trigger + 1);
        controller.settle().await;

        assert!(!controller.set_filter("ABC").await);
        assert!(!controller.set_filter("  ABC ").await);
        assert_eq!(controller.fetch_trigger(), trigger + 1);
        assert_eq!(source.query_count(), 3);

        let last = source.queries.lock().unwrap().last().cloned().unwrap();
        assert_eq!(last.filter.as_deref(), Some("ABC"));
        assert_eq!(last.vehicle_type.as_deref(), Some(SERVER_VEHICLE_TYPE));
        assert_eq!(controller.snapshot().await.total_loaded, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_request_never_lands() {
        let source = PagedSource::new();
        let mut controller = FleetController::new(source, 2);
        controller.set_filter("lento").await;
        controller.set_filter("rapido").await;
        controller.settle().await;

        tokio::time::sleep(Duration::from_secs(30)).await;
        let state = controller.fetcher().state().await;
        assert_eq!(state.data.len(), 2);
        assert!(state.data.iter().all(|v| v.vehicle.plate.starts_with("rapido")));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_markers_and_center() {
        let source = PagedSource::new();
        let mut controller = FleetController::new(source, 2);
        assert_eq!(controller.map_center(), GeoPoint::default());

        controller.refresh().await;
        controller.settle().await;
        let snapshot = controller.snapshot().await;

        assert_eq!(snapshot.markers.len(), 1);
        assert_eq!(controller.map_markers().await, snapshot.markers);
        let marker = &snapshot.markers[0];
        assert_eq!(
            marker.info_content.as_deref(),
            Some("Placa: V1T\nFrota: N/A\nStatus: active")
        );
        assert_eq!(snapshot.center, GeoPoint::new(-21.0, -40.0));
        assert!(!controller.sync_map_center(&snapshot.markers));
        assert!(!controller.sync_map_center(&[]));
    }

    #[tokio::test]
    async fn test_detail_overlay() {
        let source = PagedSource::new();
        let mut controller = FleetController::new(source.clone(), 2);
        controller.refresh().await;
        controller.settle().await;
        let before = source.query_count();

        let selected = controller.select_vehicle("V1U").await.cloned();
        assert_eq!(selected.unwrap().vehicle.plate, "V1U");
        assert!(controller.select_vehicle("missing").await.is_none());

        controller.select_vehicle("V1T").await;
        controller.close_details();
        assert!(controller.selected().is_none());
        assert_eq!(source.query_count(), before);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("tracked".parse::<VehicleCategory>(), Ok(VehicleCategory::Tracked));
        assert_eq!("Outros".parse::<VehicleCategory>(), Ok(VehicleCategory::Others));
        assert!("todos".parse::<VehicleCategory>().is_err());
    }
}
