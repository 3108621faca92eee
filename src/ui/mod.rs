//! Presentation layer: egui widgets that read `AppState`.

pub mod dashboard;
pub mod format;
pub mod panels;
pub mod plot;
