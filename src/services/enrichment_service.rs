//! Enriquecimiento y paginación de vehículos
//!
//! Funciones puras que cruzan vehículos y ubicaciones por placa y deciden
//! cómo se acumula cada página nueva sobre el estado anterior.

use serde::Serialize;
use std::collections::HashMap;

use crate::dto::vehicle_dto::FetchParams;
use crate::models::vehicle::{ApiContent, EnrichedVehicle, LocationRecord, PageMeta, VehicleRecord};

/// Estado observable de la carga de vehículos
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchState {
    pub data: Vec<EnrichedVehicle>,
    pub meta: Option<PageMeta>,
    pub is_loading: bool,
    pub is_error: bool,
    pub error: Option<String>,
    pub has_more: bool,
    /// `fetch_trigger` de la última respuesta aplicada
    #[serde(skip)]
    pub applied_trigger: Option<u64>,
}

/// Índice placa → ubicación. Si una placa se repite gana la última.
pub fn build_location_index(locations: &[LocationRecord]) -> HashMap<&str, &LocationRecord> {
    let mut index = HashMap::with_capacity(locations.len());
    for location in locations {
        match location.plate.as_deref() {
            Some(plate) if !plate.is_empty() => {
                index.insert(plate, location);
            }
            _ => {}
        }
    }
    index
}

/// Un vehículo enriquecido por cada vehículo recibido, en el mismo orden
pub fn enrich_vehicles(
    vehicles: Vec<VehicleRecord>,
    locations: &[LocationRecord],
) -> Vec<EnrichedVehicle> {
    let index = build_location_index(locations);
    vehicles
        .into_iter()
        .map(|vehicle| {
            let location = index.get(vehicle.plate.as_str()).copied();
            EnrichedVehicle::from_parts(vehicle, location)
        })
        .collect()
}

/// Se reinicia lo acumulado en la página 1 o cuando cambió el trigger
pub fn should_reset(params: &FetchParams, prior: &FetchState) -> bool {
    params.page == 1 || prior.applied_trigger != Some(params.fetch_trigger)
}

/// Calcula el estado nuevo a partir de la respuesta cruda y el estado previo
pub fn compute_enriched_page(
    params: &FetchParams,
    raw: ApiContent,
    prior: &FetchState,
) -> FetchState {
    let meta = PageMeta::new(
        raw.page.unwrap_or(params.page),
        raw.per_page.unwrap_or(params.per_page),
        raw.total_pages.unwrap_or(0),
    );

    let enriched = enrich_vehicles(raw.vehicles, &raw.location_vehicles);
    let tracked = enriched.iter().filter(|v| v.is_tracked()).count();

    let data = if should_reset(params, prior) {
        log::debug!("🔄 Reiniciando lista con {} vehículos", enriched.len());
        enriched
    } else {
        log::debug!(
            "➕ Agregando {} vehículos a {} existentes",
            enriched.len(),
            prior.data.len()
        );
        let mut data = Vec::with_capacity(prior.data.len() + enriched.len());
        data.extend(prior.data.iter().cloned());
        data.extend(enriched);
        data
    };

    log::info!(
        "📍 Página {}/{}: {} vehículos en lista, {} rastreados en esta página",
        meta.page,
        meta.total_pages,
        data.len(),
        tracked
    );

    FetchState {
        data,
        has_more: meta.has_more(),
        meta: Some(meta),
        is_loading: false,
        is_error: false,
        error: None,
        applied_trigger: Some(params.fetch_trigger),
    }
}

/// Estado tras un fallo: conserva los datos, marca el error y corta la paginación
pub fn failed_page(prior: &FetchState, message: String) -> FetchState {
    FetchState {
        data: prior.data.clone(),
        meta: prior.meta.clone(),
        is_loading: false,
        is_error: true,
        error: Some(message),
        has_more: false,
        applied_trigger: prior.applied_trigger,
    }
}
