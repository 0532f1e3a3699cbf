//! Fleet Tracker
//!
//! Cliente de la API de flota: busca vehículos paginados, los cruza con sus
//! ubicaciones por placa y mantiene la vista (filtro, categoría, scroll
//! infinito, marcadores del mapa) con refresco automático.

pub mod api;
pub mod client;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod ui;
pub mod utils;
pub mod widgets;
