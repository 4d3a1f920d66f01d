//! GUI module using egui/eframe
//!
//! Provides the graphical user interface for the Poke Artwork Viewer.

mod app;

pub use app::App;
