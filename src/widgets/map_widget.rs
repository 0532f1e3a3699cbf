//! Widget de mapa
//!
//! Estado presentacional del mapa: carga del SDK de mapas, marcadores y el
//! único popup de información abierto. No hace peticiones de datos.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use crate::models::geo::GeoPoint;
use crate::utils::errors::{AppError, AppResult};

pub const DEFAULT_ZOOM: u8 = 12;
pub const SDK_LIBRARIES: &[&str] = &["places", "geometry"];
pub const GOOGLE_MAPS_JS_URL: &str = "https://maps.googleapis.com/maps/api/js";

/// Marcador con su etiqueta multilínea
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: String,
    pub position: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapLoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Cargador asíncrono del SDK de mapas
#[async_trait]
pub trait MapSdkLoader: Send + Sync {
    async fn load(&self, api_key: &str) -> AppResult<()>;
}

/// Cargador del SDK JavaScript de Google Maps
pub struct GoogleMapsLoader {
    client: Client,
    base_url: String,
}

impl GoogleMapsLoader {
    pub fn new(timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(GOOGLE_MAPS_JS_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl MapSdkLoader for GoogleMapsLoader {
    async fn load(&self, api_key: &str) -> AppResult<()> {
        log::info!("🗺️ Cargando SDK de mapas");

        let libraries = SDK_LIBRARIES.join(",");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("key", api_key), ("libraries", libraries.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::error!("❌ SDK de mapas respondió {}", status);
            return Err(AppError::MapSdk(format!("SDK load failed with HTTP {}", status.as_u16())));
        }

        log::info!("✅ SDK de mapas cargado");
        Ok(())
    }
}

/// Lo que hay que pintar en el contenedor del mapa
#[derive(Debug, PartialEq)]
pub enum MapView<'a> {
    Loading,
    Failed(&'a str),
    Ready {
        center: GeoPoint,
        zoom: u8,
        markers: &'a [MapMarker],
        popup: Option<&'a MapMarker>,
    },
}

impl MapView<'_> {
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            MapView::Loading => Some("Carregando Mapa..."),
            MapView::Failed(_) => {
                Some("Erro ao carregar o mapa. Verifique sua chave de API ou conexão.")
            }
            MapView::Ready { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapWidget {
    api_key: Option<String>,
    status: MapLoadStatus,
    center: GeoPoint,
    zoom: u8,
    markers: Vec<MapMarker>,
    active_marker: Option<String>,
}

impl MapWidget {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            status: MapLoadStatus::Loading,
            center: GeoPoint::default(),
            zoom: DEFAULT_ZOOM,
            markers: Vec::new(),
            active_marker: None,
        }
    }

    /// Carga el SDK. Sin clave falla sin hacer ninguna petición.
    pub async fn load(&mut self, loader: &dyn MapSdkLoader) -> &MapLoadStatus {
        self.status = match self.api_key.as_deref() {
            None => {
                log::warn!("⚠️ MAPS_API_KEY no configurada, el mapa no se cargará");
                MapLoadStatus::Failed("missing maps API key".to_string())
            }
            Some(key) => match loader.load(key).await {
                Ok(()) => MapLoadStatus::Ready,
                Err(e) => MapLoadStatus::Failed(e.to_string()),
            },
        };
        &self.status
    }

    pub fn status(&self) -> &MapLoadStatus {
        &self.status
    }

    pub fn set_center(&mut self, center: GeoPoint) {
        self.center = center;
    }

    /// Reemplaza los marcadores; si el abierto desaparece se cierra su popup
    pub fn set_markers(&mut self, markers: Vec<MapMarker>) {
        self.markers = markers;
        if let Some(active) = &self.active_marker {
            if !self.markers.iter().any(|m| &m.id == active) {
                self.active_marker = None;
            }
        }
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    /// Abre el popup de un marcador (cierra el que estuviera abierto)
    pub fn click_marker(&mut self, id: &str) -> bool {
        if self.markers.iter().any(|m| m.id == id) {
            self.active_marker = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn close_info(&mut self) {
        self.active_marker = None;
    }

    pub fn active_marker(&self) -> Option<&MapMarker> {
        let active = self.active_marker.as_deref()?;
        self.markers.iter().find(|m| m.id == active)
    }

    pub fn render(&self) -> MapView<'_> {
        match &self.status {
            MapLoadStatus::Loading => MapView::Loading,
            MapLoadStatus::Failed(reason) => MapView::Failed(reason),
            MapLoadStatus::Ready => MapView::Ready {
                center: self.center,
                zoom: self.zoom,
                markers: &self.markers,
                popup: self.active_marker().filter(|m| m.info_content.is_some()),
            },
        }
    }

    pub fn to_geojson(&self) -> serde_json::Value {
        markers_to_geojson(&self.markers)
    }
}

/// FeatureCollection con un Point por marcador (GeoJSON usa [lng, lat])
pub fn markers_to_geojson(markers: &[MapMarker]) -> serde_json::Value {
    let features: Vec<serde_json::Value> = markers
        .iter()
        .map(|marker| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [marker.position.lng, marker.position.lat],
                },
                "properties": {
                    "id": marker.id,
                    "label": marker.info_content,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
