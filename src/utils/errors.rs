//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP para el servidor de desarrollo.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("External API error ({status}): {message}")]
    ExternalApi { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(#[from] validator::ValidationErrors),

    #[error("Map SDK error: {0}")]
    MapSdk(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código HTTP con el que el servidor de desarrollo expone el error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Network(_) | AppError::ExternalApi { .. } | AppError::Decode(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            AppError::MapSdk(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_response = match &self {
            AppError::Network(e) => {
                log::error!("Network error: {}", e);
                ErrorResponse {
                    error: "Bad Gateway".to_string(),
                    message: "Could not reach the upstream API".to_string(),
                    details: Some(json!({ "network_error": e.to_string() })),
                    code: Some("NETWORK_ERROR".to_string()),
                }
            }

            AppError::ExternalApi { status, message } => {
                log::error!("External API error ({}): {}", status, message);
                ErrorResponse {
                    error: "External API Error".to_string(),
                    message: "The upstream API answered with an error".to_string(),
                    details: Some(json!({ "upstream_status": status, "upstream_message": message })),
                    code: Some("EXTERNAL_API_ERROR".to_string()),
                }
            }

            AppError::Decode(e) => {
                log::error!("Decode error: {}", e);
                ErrorResponse {
                    error: "Bad Gateway".to_string(),
                    message: "The upstream API answered with an unexpected body".to_string(),
                    details: Some(json!({ "decode_error": e.to_string() })),
                    code: Some("DECODE_ERROR".to_string()),
                }
            }

            AppError::InvalidParams(e) => {
                log::warn!("Invalid parameters: {}", e);
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: "The provided parameters are invalid".to_string(),
                    details: Some(json!(e)),
                    code: Some("INVALID_PARAMS".to_string()),
                }
            }

            AppError::MapSdk(msg) => ErrorResponse {
                error: "Service Unavailable".to_string(),
                message: msg.clone(),
                details: None,
                code: Some("MAP_SDK_ERROR".to_string()),
            },

            AppError::Config(msg) | AppError::Internal(msg) => {
                log::error!("Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    details: Some(json!({ "internal_error": msg })),
                    code: Some("INTERNAL_ERROR".to_string()),
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de configuración
pub fn config_error(variable: &str, reason: &str) -> AppError {
    AppError::Config(format!("{}: {}", variable, reason))
}

/// Función helper para crear errores internos
pub fn internal_error(message: &str) -> AppError {
    AppError::Internal(message.to_string())
}
