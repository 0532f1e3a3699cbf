//! Controladores
//!
//! Contenedores de estado de vista que orquestan servicios y widgets.

pub mod fleet_controller;

pub use fleet_controller::*;
