//! Middleware
//!
//! Este módulo contiene el middleware HTTP del servidor de desarrollo.

pub mod cors;

pub use cors::cors_middleware;
