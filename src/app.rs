use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

use gantt_lanes::board::Board;
use gantt_lanes::config::Settings;
use gantt_lanes::error::Result;
use gantt_lanes::io;
use gantt_lanes::model::{Item, TimelineViewport};

use crate::ui;
use crate::ui::timeline_chart::{LaneGeometry, ZoomRequest};

/// Main application state.
pub struct TimelineApp {
    pub board: Board,
    pub viewport: TimelineViewport,
    pub settings: Settings,
    settings_path: PathBuf,
    pub file_path: Option<PathBuf>,

    // Dialog state
    pub show_about: bool,
    pub load_error: Option<String>,

    // Status message
    pub status_message: String,
}

impl TimelineApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Result<Self> {
        let settings_path = Settings::default_path();
        let settings = Settings::load(&settings_path);
        let ppd = settings.pixels_per_day;

        let mut app = Self {
            board: Board::new(Self::sample_items(), ppd)?,
            viewport: TimelineViewport::fit(&[], ppd),
            settings,
            settings_path,
            file_path: None,
            show_about: false,
            load_error: None,
            status_message: "Ready".to_string(),
        };

        match app.settings.last_items_file.clone() {
            Some(path) if path.exists() => app.load_from(&path, io::load_items),
            _ => app.refit_viewport(),
        }
        Ok(app)
    }

    /// Generate sample items for demonstration.
    fn sample_items() -> Vec<Item> {
        let today = chrono::Local::now().date_naive();
        let day = |offset: u64| today.checked_add_days(Days::new(offset)).unwrap_or(today);
        let sample: [(&str, NaiveDate, NaiveDate); 8] = [
            ("Kickoff", day(0), day(1)),
            ("Requirements", day(1), day(6)),
            ("UX research", day(2), day(5)),
            ("Architecture", day(5), day(9)),
            ("Backend", day(7), day(20)),
            ("Frontend", day(10), day(21)),
            ("Testing", day(18), day(25)),
            ("Launch", day(26), day(26)),
        ];
        sample
            .iter()
            .enumerate()
            .map(|(i, (name, start, end))| Item::new(i as u64 + 1, *name, *start, *end))
            .collect()
    }

    // --- Loading ---

    pub fn open_items(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Timeline items", &["json"])
            .pick_file()
        {
            self.load_from(&path, io::load_items);
        }
    }

    pub fn import_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        {
            self.load_from(&path, io::import_csv);
        }
    }

    pub fn load_sample(&mut self) {
        match Board::new(Self::sample_items(), self.settings.pixels_per_day) {
            Ok(board) => self.board = board,
            Err(e) => {
                tracing::warn!("Sample items rejected: {}", e);
                self.status_message = format!("Error: {}", e);
                return;
            }
        }
        self.file_path = None;
        self.settings.last_items_file = None;
        self.save_settings();
        self.refit_viewport();
        self.status_message = "Sample items loaded".to_string();
    }

    /// Read items with `loader` and swap in a new board. On failure the
    /// current board stays and the error is shown.
    fn load_from(&mut self, path: &Path, loader: fn(&Path) -> Result<Vec<Item>>) {
        let loaded =
            loader(path).and_then(|items| Board::new(items, self.settings.pixels_per_day));
        match loaded {
            Ok(board) => {
                let count = board.items().len();
                let lanes = board.packing().lane_count;
                self.board = board;
                self.file_path = Some(path.to_path_buf());
                self.settings.last_items_file = Some(path.to_path_buf());
                self.save_settings();
                self.refit_viewport();
                self.status_message = format!("Loaded {} items in {} lanes", count, lanes);
            }
            Err(e) => {
                tracing::warn!("Failed to load {:?}: {}", path, e);
                self.status_message = format!("Error loading: {}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    // --- View ---

    pub fn refit_viewport(&mut self) {
        self.viewport = TimelineViewport::fit(self.board.items(), self.settings.pixels_per_day);
    }

    pub fn zoom_in(&mut self) {
        if self.board.is_dragging() {
            return;
        }
        self.viewport.zoom_in();
        self.apply_zoom();
    }

    pub fn zoom_out(&mut self) {
        if self.board.is_dragging() {
            return;
        }
        self.viewport.zoom_out();
        self.apply_zoom();
    }

    fn apply_zoom(&mut self) {
        let ppd = self.viewport.pixels_per_day;
        if let Err(e) = self.board.set_pixels_per_day(ppd) {
            tracing::warn!("Zoom rejected: {}", e);
            return;
        }
        self.settings.pixels_per_day = ppd;
        self.save_settings();
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            tracing::warn!("Failed to save settings {:?}: {}", self.settings_path, e);
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::O)) {
            self.open_items();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Items: {} · Lanes: {} · {:.0} px/day",
                                self.board.items().len(),
                                self.board.packing().lane_count,
                                self.viewport.pixels_per_day,
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Central panel: timeline chart
        let geometry = LaneGeometry {
            row_height: self.settings.row_height,
            row_gap: self.settings.row_gap,
        };
        let chart_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::timeline_chart::show_timeline_chart(
                    &mut self.board,
                    &self.viewport,
                    geometry,
                    ui,
                )
            })
            .inner;

        if let Some(item) = interaction.committed {
            self.refit_viewport();
            self.status_message = format!(
                "Updated '{}' ({} → {})",
                item.name, item.start, item.end
            );
        }
        if let Some(e) = interaction.error {
            tracing::warn!("Gesture failed: {}", e);
            self.status_message = format!("Error: {}", e);
        }
        match interaction.zoom {
            Some(ZoomRequest::In) => self.zoom_in(),
            Some(ZoomRequest::Out) => self.zoom_out(),
            None => {}
        }

        // Dialogs
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.load_error.is_some() {
            ui::dialogs::show_error_dialog(self, ctx);
        }
    }
}
