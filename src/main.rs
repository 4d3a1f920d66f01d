//! Poke Artwork Viewer
//!
//! A cross-platform GUI application that browses the PokeAPI catalog,
//! caches Pokémon artwork locally, and can set it as the desktop background.

use eframe::egui;

use poke_artwork_viewer::gui;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 640.0])
            .with_min_inner_size([500.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Poke Artwork Viewer",
        options,
        Box::new(|cc| Ok(Box::new(gui::App::new(cc)))),
    )
}
