//! Main application state and UI implementation

use eframe::egui;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::api::{CatalogClient, CatalogQuery};
use crate::cache::{ArtworkAsset, ArtworkCache};
use crate::config::AppConfig;
use crate::desktop;

/// Main application state
pub struct App {
    /// Catalog client; None if construction failed at startup
    client: Option<CatalogClient>,
    /// Artwork cache; None if the cache directory could not be opened
    cache: Option<ArtworkCache>,
    /// Sorted entry names for the selection control
    names: Vec<String>,
    /// Receiver for the name index load
    names_receiver: Option<Receiver<Result<Vec<String>, String>>>,
    /// Is the name index loading?
    names_loading: bool,
    /// Currently selected entry name
    selected_name: Option<String>,
    /// Receiver for the artwork lookup
    artwork_receiver: Option<Receiver<Result<ArtworkAsset, String>>>,
    /// Is an artwork lookup in progress?
    artwork_loading: bool,
    /// Texture for the artwork pane
    artwork_texture: Option<egui::TextureHandle>,
    /// The asset currently on display
    current_asset: Option<ArtworkAsset>,
    /// Status/log messages
    log_messages: Vec<LogMessage>,
}

/// A log message with severity level
#[derive(Clone)]
struct LogMessage {
    text: String,
    level: LogLevel,
}

#[derive(Clone, Copy, PartialEq)]
enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Default for App {
    fn default() -> Self {
        Self {
            client: None,
            cache: None,
            names: Vec::new(),
            names_receiver: None,
            names_loading: false,
            selected_name: None,
            artwork_receiver: None,
            artwork_loading: false,
            artwork_texture: None,
            current_asset: None,
            log_messages: Vec::new(),
        }
    }
}

impl App {
    /// Create a new App instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self::default();
        let config = AppConfig::load();

        match CatalogClient::new(&config.api) {
            Ok(client) => app.client = Some(client),
            Err(e) => app.log(LogLevel::Error, format!("Failed to create catalog client: {}", e)),
        }

        match ArtworkCache::open(&config.cache.directory) {
            Ok(cache) => app.cache = Some(cache),
            Err(e) => app.log(
                LogLevel::Error,
                format!(
                    "Failed to open artwork cache at {}: {}",
                    config.cache.directory.display(),
                    e
                ),
            ),
        }

        app.start_name_load();
        app
    }

    /// Add a log message
    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_messages.push(LogMessage {
            text: message.into(),
            level,
        });
        // Keep only last 100 messages
        if self.log_messages.len() > 100 {
            self.log_messages.remove(0);
        }
    }

    /// Start loading the name index on a worker thread
    fn start_name_load(&mut self) {
        let client = match self.client.clone() {
            Some(client) => client,
            None => return,
        };

        let (tx, rx) = mpsc::channel();
        self.names_loading = true;
        self.names_receiver = Some(rx);
        self.log(LogLevel::Info, "Loading Pokémon name index...");

        thread::spawn(move || {
            let result = client.load_all_names().map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    }

    /// Poll for the name index
    fn poll_names(&mut self) {
        if let Some(ref receiver) = self.names_receiver {
            match receiver.try_recv() {
                Ok(Ok(mut names)) => {
                    self.names_loading = false;
                    self.names_receiver = None;
                    // The index arrives in server order; sort it for the combo box
                    names.sort();
                    self.log(LogLevel::Success, format!("Loaded {} names", names.len()));
                    self.names = names;
                }
                Ok(Err(e)) => {
                    self.names_loading = false;
                    self.names_receiver = None;
                    self.log(LogLevel::Error, format!("Failed to load names: {}", e));
                }
                Err(TryRecvError::Empty) => {
                    // Still loading
                }
                Err(TryRecvError::Disconnected) => {
                    self.names_loading = false;
                    self.names_receiver = None;
                    self.log(LogLevel::Error, "Name load thread terminated unexpectedly");
                }
            }
        }
    }

    /// Handle a new selection from the combo box
    fn select_entry(&mut self, name: String) {
        if self.artwork_loading {
            self.log(LogLevel::Warning, "Still fetching the previous selection");
            return;
        }
        self.selected_name = Some(name.clone());
        self.start_artwork_fetch(&name);
    }

    /// Start an artwork lookup on a worker thread
    fn start_artwork_fetch(&mut self, name: &str) {
        let (client, cache) = match (self.client.clone(), self.cache.clone()) {
            (Some(client), Some(cache)) => (client, cache),
            _ => {
                self.log(
                    LogLevel::Error,
                    "Catalog client or cache unavailable, see startup errors",
                );
                return;
            }
        };

        let query = match CatalogQuery::new(name) {
            Ok(query) => query,
            Err(e) => {
                self.log(LogLevel::Error, format!("Invalid selection: {}", e));
                return;
            }
        };

        let (tx, rx) = mpsc::channel();
        self.artwork_loading = true;
        self.artwork_receiver = Some(rx);
        self.artwork_texture = None;
        self.current_asset = None;
        self.log(LogLevel::Info, format!("Fetching artwork for {}", query));

        thread::spawn(move || {
            let result = cache.get_artwork(&client, &query).map_err(|e| e.to_string());
            let _ = tx.send(result);
        });
    }

    /// Poll for artwork lookup results
    fn poll_artwork(&mut self, ctx: &egui::Context) {
        if let Some(ref receiver) = self.artwork_receiver {
            match receiver.try_recv() {
                Ok(Ok(asset)) => {
                    self.artwork_loading = false;
                    self.artwork_receiver = None;

                    match std::fs::read(&asset.path) {
                        Ok(bytes) => match load_image_from_bytes(&bytes) {
                            Ok(color_image) => {
                                let texture = ctx.load_texture(
                                    "artwork",
                                    color_image,
                                    egui::TextureOptions::LINEAR,
                                );
                                self.artwork_texture = Some(texture);
                                self.log(
                                    LogLevel::Success,
                                    format!("Artwork ready: {}", asset.path.display()),
                                );
                            }
                            Err(e) => {
                                self.log(LogLevel::Error, format!("Failed to decode artwork: {}", e))
                            }
                        },
                        Err(e) => self.log(
                            LogLevel::Error,
                            format!("Failed to read cached artwork: {}", e),
                        ),
                    }

                    self.current_asset = Some(asset);
                }
                Ok(Err(e)) => {
                    self.artwork_loading = false;
                    self.artwork_receiver = None;
                    self.log(LogLevel::Error, format!("Artwork lookup failed: {}", e));
                }
                Err(TryRecvError::Empty) => {
                    // Still fetching
                }
                Err(TryRecvError::Disconnected) => {
                    self.artwork_loading = false;
                    self.artwork_receiver = None;
                    self.log(LogLevel::Error, "Artwork thread terminated unexpectedly");
                }
            }
        }
    }
}

/// Load image from bytes into egui ColorImage
fn load_image_from_bytes(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    let size = [image.width() as usize, image.height() as usize];
    let image_buffer = image.to_rgba8();
    let pixels = image_buffer.as_flat_samples();

    Ok(egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Poll for name index and artwork results
        self.poll_names();
        self.poll_artwork(ctx);

        // Request repaint while loading
        if self.names_loading || self.artwork_loading {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::TopBottomPanel::bottom("status_log").show(ctx, |ui| {
            ui.add_space(4.0);
            egui::ScrollArea::vertical()
                .id_salt("status_log_scroll")
                .stick_to_bottom(true)
                .max_height(90.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for message in &self.log_messages {
                        let color = match message.level {
                            LogLevel::Info => egui::Color32::GRAY,
                            LogLevel::Success => egui::Color32::GREEN,
                            LogLevel::Warning => egui::Color32::YELLOW,
                            LogLevel::Error => egui::Color32::RED,
                        };
                        ui.colored_label(color, &message.text);
                    }
                });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Poke Artwork Viewer");
            ui.add_space(8.0);

            // --- Selection row ---
            let mut clicked_name = None;
            ui.horizontal(|ui| {
                ui.label("Pokémon:");
                egui::ComboBox::new("entry_select", "")
                    .selected_text(self.selected_name.as_deref().unwrap_or("Select a Pokémon"))
                    .width(220.0)
                    .show_ui(ui, |ui| {
                        for name in &self.names {
                            let is_selected = self.selected_name.as_deref() == Some(name.as_str());
                            if ui.selectable_label(is_selected, name).clicked() {
                                clicked_name = Some(name.clone());
                            }
                        }
                    });

                if self.names_loading {
                    ui.spinner();
                    ui.label("Loading names...");
                } else if self.names.is_empty() && ui.button("Reload names").clicked() {
                    self.start_name_load();
                }
            });
            if let Some(name) = clicked_name {
                self.select_entry(name);
            }

            ui.add_space(8.0);

            // --- Action row ---
            let mut set_background_clicked = false;
            let mut pick_folder_clicked = false;
            ui.horizontal(|ui| {
                let can_set = self.current_asset.is_some() && !self.artwork_loading;
                if ui
                    .add_enabled(can_set, egui::Button::new("Set as Desktop Background"))
                    .clicked()
                {
                    set_background_clicked = true;
                }
                if ui.button("Cache Folder...").clicked() {
                    pick_folder_clicked = true;
                }
                if self.artwork_loading {
                    ui.spinner();
                    ui.label("Fetching artwork...");
                }
            });

            if set_background_clicked {
                if let Some(path) = self.current_asset.as_ref().map(|a| a.path.clone()) {
                    match desktop::set_background_image(&path) {
                        Ok(()) => self.log(
                            LogLevel::Success,
                            format!("Desktop background set to {}", path.display()),
                        ),
                        Err(e) => self.log(LogLevel::Error, e),
                    }
                }
            }

            if pick_folder_clicked {
                if let Some(dir) = rfd::FileDialog::new()
                    .set_title("Choose artwork cache folder")
                    .pick_folder()
                {
                    match ArtworkCache::open(&dir) {
                        Ok(cache) => {
                            self.log(
                                LogLevel::Info,
                                format!("Artwork cache moved to {}", dir.display()),
                            );
                            self.cache = Some(cache);
                        }
                        Err(e) => self.log(
                            LogLevel::Error,
                            format!("Cannot open cache folder: {}", e),
                        ),
                    }
                }
            }

            if let Some(ref cache) = self.cache {
                ui.label(
                    egui::RichText::new(format!("Cache: {}", cache.dir().display()))
                        .small()
                        .color(egui::Color32::GRAY),
                );
            }

            ui.separator();

            // --- Artwork pane ---
            if let Some(ref texture) = self.artwork_texture {
                let size = texture.size_vec2();
                let available = ui.available_size();
                let scale = (available.x / size.x).min(available.y / size.y).min(1.0);
                let display_size = size * scale.max(0.01);
                ui.centered_and_justified(|ui| {
                    ui.image((texture.id(), display_size));
                });
            } else if self.artwork_loading {
                ui.centered_and_justified(|ui| {
                    ui.spinner();
                });
            } else {
                ui.centered_and_justified(|ui| {
                    ui.colored_label(
                        egui::Color32::GRAY,
                        "Select a Pokémon to display its artwork",
                    );
                });
            }
        });
    }
}
