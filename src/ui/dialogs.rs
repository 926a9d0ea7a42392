use crate::app::TimelineApp;
use crate::ui::theme;
use egui::{Context, RichText, Window};

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 220.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Gantt Lanes").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag a bar to move it, drag an edge to resize,");
                ui.label("double-click a label to rename.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render a blocking error dialog for load failures.
pub fn show_error_dialog(app: &mut TimelineApp, ctx: &Context) {
    let Some(message) = app.load_error.clone() else {
        return;
    };
    let mut should_close = false;
    Window::new(RichText::new("Could not load items").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(380.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(RichText::new(message).color(theme::TEXT_SECONDARY));
            ui.add_space(8.0);
            ui.label(
                RichText::new("Dates must be calendar days such as 2024-01-31.")
                    .small()
                    .color(theme::TEXT_DIM),
            );
            ui.add_space(6.0);
            ui.separator();
            if ui.add_sized([80.0, 28.0], egui::Button::new("OK")).clicked() {
                should_close = true;
            }
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.load_error = None;
    }
}
