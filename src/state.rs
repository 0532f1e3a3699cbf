//! Shared application state
//!
//! Este módulo define el estado compartido que se pasa a través del router
//! de Axum del servidor de desarrollo.

use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::controllers::fleet_controller::FleetController;
use crate::utils::errors::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub http_client: Client,
    pub controller: Arc<RwLock<FleetController>>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, controller: Arc<RwLock<FleetController>>) -> AppResult<Self> {
        let http_client = Client::builder().timeout(config.http_timeout()).build()?;
        Ok(Self {
            config,
            http_client,
            controller,
        })
    }
}
