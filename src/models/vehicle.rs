//! Modelo de Vehicle
//!
//! Este módulo contiene los registros que devuelve la API de flota
//! (vehículos y ubicaciones) y el vehículo enriquecido con telemetría.
//! Los nombres de campo en JSON siguen el camelCase de la API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::geo::GeoPoint;

/// Estado del vehículo tal como lo envía la API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VehicleStatus {
    Active,
    Inactive,
    Other(String),
}

impl VehicleStatus {
    pub fn as_str(&self) -> &str {
        match self {
            VehicleStatus::Active => "active",
            VehicleStatus::Inactive => "inactive",
            VehicleStatus::Other(raw) => raw,
        }
    }

    /// Etiqueta mostrada al usuario
    pub fn label(&self) -> &'static str {
        match self {
            VehicleStatus::Active => "Em Viagem",
            VehicleStatus::Inactive => "Parado",
            VehicleStatus::Other(_) => "Outro",
        }
    }
}

impl From<String> for VehicleStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "active" => VehicleStatus::Active,
            "inactive" => VehicleStatus::Inactive,
            _ => VehicleStatus::Other(raw),
        }
    }
}

impl From<VehicleStatus> for String {
    fn from(status: VehicleStatus) -> Self {
        status.as_str().to_string()
    }
}

impl Default for VehicleStatus {
    fn default() -> Self {
        VehicleStatus::Other(String::new())
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vehículo tal como llega en `content.vehicles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub plate: String,
    #[serde(default)]
    pub fleet: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub vehicle_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub model: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name_owner: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: VehicleStatus,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

impl VehicleRecord {
    /// Flota o "N/A" si no tiene
    pub fn fleet_label(&self) -> &str {
        match self.fleet.as_deref() {
            Some(fleet) if !fleet.is_empty() => fleet,
            _ => "N/A",
        }
    }
}

/// Ubicación tal como llega en `content.locationVehicles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub fleet: Option<String>,
    #[serde(default)]
    pub equipment_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plate: Option<String>,
    #[serde(default)]
    pub ignition: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Vehículo con la telemetría de su ubicación (si la hay)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedVehicle {
    #[serde(flatten)]
    pub vehicle: VehicleRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl EnrichedVehicle {
    /// Adjunta la ubicación encontrada por placa; sin ubicación el vehículo queda sin rastrear
    pub fn from_parts(vehicle: VehicleRecord, location: Option<&LocationRecord>) -> Self {
        match location {
            Some(loc) => Self {
                vehicle,
                latitude: loc.lat,
                longitude: loc.lng,
                equipment_id: loc.equipment_id.clone(),
                ignition: loc.ignition.clone(),
                speed: loc.speed,
            },
            None => Self {
                vehicle,
                latitude: None,
                longitude: None,
                equipment_id: None,
                ignition: None,
                speed: None,
            },
        }
    }

    /// Rastreado = latitud y longitud presentes
    pub fn is_tracked(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

/// Metadatos de paginación derivados de la respuesta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    /// Estimación: per_page × total_pages, no es un conteo exacto
    pub total_items: u64,
}

impl PageMeta {
    pub fn new(page: u32, per_page: u32, total_pages: u32) -> Self {
        Self {
            page,
            per_page,
            total_pages,
            total_items: u64::from(per_page) * u64::from(total_pages),
        }
    }

    pub fn has_more(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Contenido de `list-with-paginate`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContent {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vehicles: Vec<VehicleRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location_vehicles: Vec<LocationRecord>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub total_pages: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub per_page: Option<u32>,
}

/// Envoltorio de respuesta de la API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub content: Option<ApiContent>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Texto tal cual; números se pasan a texto, `null` y otros tipos quedan vacíos
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

/// RFC 3339 o `YYYY-MM-DD HH:MM:SS` (UTC); cualquier otra cosa queda en `None`
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(serde_json::Value::String(raw)) = Option::<serde_json::Value>::deserialize(deserializer)?
    else {
        return Ok(None);
    };
    let raw = raw.trim();
    Ok(DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        }))
}

/// La API manda `perPage` a veces como número y a veces como string.
/// Un string no numérico cuenta como 0.
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().map(|v| v.min(u64::from(u32::MAX)) as u32),
        Some(serde_json::Value::String(s)) => Some(s.trim().parse().unwrap_or(0)),
        _ => None,
    })
}
