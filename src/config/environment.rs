//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno: URL base de la API,
//! credencial bearer, clave del SDK de mapas y parámetros de refresco.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::errors::{config_error, AppResult};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 120;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROXY_PREFIX: &str = "/recruitment";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub api_base_url: String,
    pub auth_token: String,
    pub maps_api_key: Option<String>,
    pub per_page: u32,
    pub refresh_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub dev_server_port: Option<u16>,
    pub dev_proxy_prefix: String,
}

impl EnvironmentConfig {
    /// Leer la configuración de las variables de entorno del proceso
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Leer la configuración desde una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| config_error("API_BASE_URL", "must be set"))?;

        let auth_token = lookup("AUTH_TOKEN").unwrap_or_default();
        if auth_token.is_empty() {
            log::warn!("⚠️ AUTH_TOKEN vacío, las peticiones irán sin credencial válida");
        }

        let maps_api_key = lookup("MAPS_API_KEY").filter(|v| !v.trim().is_empty());

        let per_page = parse_or(&lookup, "PER_PAGE", DEFAULT_PER_PAGE)?;
        if per_page == 0 {
            return Err(config_error("PER_PAGE", "must be greater than zero"));
        }

        let refresh_interval_secs =
            parse_or(&lookup, "REFRESH_INTERVAL_SECS", DEFAULT_REFRESH_INTERVAL_SECS)?;
        if refresh_interval_secs == 0 {
            return Err(config_error("REFRESH_INTERVAL_SECS", "must be greater than zero"));
        }

        let dev_server_port: Option<u16> = match lookup("DEV_SERVER_PORT") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|_| config_error("DEV_SERVER_PORT", "must be a valid port"))?,
            ),
            _ => None,
        };

        let dev_proxy_prefix = normalize_prefix(
            &lookup("DEV_PROXY_PREFIX").unwrap_or_else(|| DEFAULT_PROXY_PREFIX.to_string()),
        );

        Ok(Self {
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            api_base_url,
            auth_token,
            maps_api_key,
            per_page,
            refresh_interval_secs,
            http_timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            dev_server_port,
            dev_proxy_prefix,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| config_error(key, "must be a valid number")),
        _ => Ok(default),
    }
}

/// "/recruitment/" y "recruitment" quedan como "/recruitment"
/// `recruitment/` -> `/recruitment`; un prefijo vacío vuelve al de por defecto
fn normalize_prefix(raw: &str) -> String {
    match raw.trim().trim_matches('/') {
        "" => DEFAULT_PROXY_PREFIX.to_string(),
        trimmed => format!("/{}", trimmed),
    }
}
