//! UI helper components

use eframe::egui;

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(35, 247, 221);
pub const WARNING: egui::Color32 = egui::Color32::from_rgb(220, 180, 50);
pub const DANGER: egui::Color32 = egui::Color32::from_rgb(230, 80, 80);

/// Open URL in the system browser
pub fn open_url_new_tab(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!(error = %e, "failed to open browser");
    }
}

pub fn copy_to_clipboard(text: &str) {
    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        let _ = clipboard.set_text(text);
    }
}

/// Section header with separator
pub fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.add_space(10.0);
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(text).strong().size(14.0));
    });
    ui.separator();
}

pub fn copyable_value(ui: &mut egui::Ui, value: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(value).monospace());
        if ui
            .small_button("📋")
            .on_hover_text("Copy to clipboard")
            .clicked()
        {
            copy_to_clipboard(value);
        }
    });
}

pub fn text_input(ui: &mut egui::Ui, value: &mut String, hint: &str, width: f32) -> egui::Response {
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(width)
            .font(egui::TextStyle::Monospace),
    )
}

pub fn error_text(ui: &mut egui::Ui, message: &str) {
    ui.label(egui::RichText::new(message).color(DANGER));
}

pub fn info_text(ui: &mut egui::Ui, message: &str) {
    ui.label(egui::RichText::new(message).color(ACCENT));
}
