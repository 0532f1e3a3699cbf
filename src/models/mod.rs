//! Modelos de datos
//!
//! Registros de la API de flota y tipos geográficos compartidos.

pub mod geo;
pub mod vehicle;

pub use geo::*;
pub use vehicle::*;
