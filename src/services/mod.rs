//! Services module
//!
//! Este módulo contiene la lógica de negocio: el cruce de vehículos con sus
//! ubicaciones, la planificación de peticiones y el refresco automático.

pub mod enrichment_service;
pub mod refresh_task;
pub mod vehicle_fetcher;

pub use enrichment_service::*;
pub use vehicle_fetcher::*;
