use serde::{Deserialize, Serialize};

/// Centro por defecto del mapa (São Paulo)
pub const DEFAULT_CENTER: GeoPoint = GeoPoint {
    lat: -23.550520,
    lng: -46.633308,
};

/// Coordenadas geográficas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Enlace de búsqueda en Google Maps para estas coordenadas
    pub fn google_maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={},{}",
            self.lat, self.lng
        )
    }
}

impl Default for GeoPoint {
    fn default() -> Self {
        DEFAULT_CENTER
    }
}
