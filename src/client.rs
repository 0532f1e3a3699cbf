//! Cliente HTTP para la API de flota
//!
//! Este módulo contiene el cliente del endpoint paginado
//! `recruitment/vehicles/list-with-paginate` y el trait `VehicleSource`
//! con el que el resto de la aplicación consume páginas de vehículos.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::environment::EnvironmentConfig;
use crate::dto::vehicle_dto::{ApiErrorBody, VehicleQuery};
use crate::models::vehicle::{ApiContent, ApiResponse};
use crate::utils::errors::{AppError, AppResult};

pub const LIST_WITH_PAGINATE_PATH: &str = "/recruitment/vehicles/list-with-paginate";

/// Fuente de páginas de vehículos
#[async_trait]
pub trait VehicleSource: Send + Sync {
    async fn list_with_paginate(&self, query: &VehicleQuery) -> AppResult<ApiContent>;
}

/// Cliente HTTP para la API de flota
#[derive(Clone)]
pub struct FleetApiClient {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl FleetApiClient {
    /// Crear nuevo cliente HTTP con URL base configurable
    pub fn new(base_url: &str, auth_token: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
        })
    }

    pub fn from_config(config: &EnvironmentConfig) -> AppResult<Self> {
        Self::new(&config.api_base_url, &config.auth_token, config.http_timeout())
    }

    pub fn list_url(&self) -> String {
        format!("{}{}", self.base_url, LIST_WITH_PAGINATE_PATH)
    }
}

#[async_trait]
impl VehicleSource for FleetApiClient {
    async fn list_with_paginate(&self, query: &VehicleQuery) -> AppResult<ApiContent> {
        let url = self.list_url();
        log::debug!("🌐 GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.auth_token)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📡 Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ Error en la API ({}): {}", status.as_u16(), error_text);
            let message = extract_error_message(&error_text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(AppError::ExternalApi {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ApiResponse = serde_json::from_str(&body)?;
        let content = parsed.content.unwrap_or_default();

        log::info!(
            "✅ Página {:?}/{:?}: {} vehículos, {} ubicaciones",
            content.page,
            content.total_pages,
            content.vehicles.len(),
            content.location_vehicles.len()
        );
        Ok(content)
    }
}

/// Mensaje legible de un cuerpo de error: `message` del JSON, el JSON completo
/// o el texto tal cual. `None` si el cuerpo está vacío.
pub fn extract_error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => {
            let message = serde_json::from_value::<ApiErrorBody>(value.clone())
                .ok()
                .and_then(|b| b.message);
            Some(match message {
                Some(serde_json::Value::String(text)) => text,
                Some(serde_json::Value::Null) | None => value.to_string(),
                Some(other) => other.to_string(),
            })
        }
        Err(_) => Some(trimmed.to_string()),
    }
}
