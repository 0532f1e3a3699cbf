//! Interfaz de terminal
//!
//! Renderizadores en texto de la lista, el mapa y el detalle, más la consola
//! que los conecta con el controlador.

pub mod commands;
pub mod console;
pub mod details;
pub mod map;
pub mod table;

pub use console::Console;
