use serde::{Deserialize, Serialize};
use validator::Validate;

// Parámetros de una petición de página
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct FetchParams {
    pub filter: String,
    pub vehicle_type: String,
    #[validate(range(min = 1))]
    pub page: u32,
    #[validate(range(min = 1))]
    pub per_page: u32,
    /// Señal monótona: cuando cambia se descarta lo acumulado
    pub fetch_trigger: u64,
}

impl FetchParams {
    pub fn to_query(&self) -> VehicleQuery {
        VehicleQuery {
            filter: non_empty(&self.filter),
            vehicle_type: non_empty(&self.vehicle_type),
            page: self.page,
            per_page: self.per_page,
        }
    }
}

// Query string de list-with-paginate; filter y type se omiten si están vacíos
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

// Cuerpo de error que la API puede devolver en respuestas no 2xx
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: Option<serde_json::Value>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
