//! Widgets presentacionales

pub mod map_widget;

pub use map_widget::*;
