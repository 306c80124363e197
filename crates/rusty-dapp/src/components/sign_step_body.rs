use eframe::egui;

use rusty_dapp_signing_core::{DataView, TransactionSummary};

use crate::ui;

/// One transaction on a confirmation screen, followed by the modal error.
pub fn show(
    ui: &mut egui::Ui,
    id_salt: usize,
    summary: &TransactionSummary,
    egld_label: &str,
) {
    egui::Grid::new(("sign_step_body", id_salt))
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label(egui::RichText::new("Receiver").strong());
            ui::copyable_value(ui, &summary.receiver.to_string());
            ui.end_row();

            if let Some(scam) = &summary.receiver_scam {
                ui.label("");
                ui.label(egui::RichText::new(format!("⚠️ {}", scam.info)).color(ui::WARNING));
                ui.end_row();
            }

            if let Some(amount) = &summary.amount {
                ui.label(egui::RichText::new("Amount").strong());
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(amount).monospace());
                    ui.label(&summary.token_label);
                    if let Some(avatar) = &summary.avatar {
                        ui.hyperlink_to("🖼", avatar).on_hover_text("Token avatar");
                    }
                });
                ui.end_row();

                ui.label(egui::RichText::new("Type").strong());
                ui.label(egui::RichText::new(&summary.token_type_label).weak());
                ui.end_row();
            }

            ui.label(egui::RichText::new("Fee").strong());
            ui.label(egui::RichText::new(format!("{} {egld_label}", summary.fee)).monospace());
            ui.end_row();
        });

    if let Some(data) = &summary.data {
        ui.add_space(6.0);
        let label = if summary.is_sc_call { "Smart contract call" } else { "Data" };
        ui.label(egui::RichText::new(label).strong());
        match data {
            DataView::Plain(text) => {
                ui.label(egui::RichText::new(text).monospace());
            }
            DataView::Highlighted {
                before,
                highlight,
                after,
            } => {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing.x = 0.0;
                    ui.label(egui::RichText::new(before).monospace());
                    ui.label(egui::RichText::new(highlight).monospace().color(ui::ACCENT));
                    ui.label(egui::RichText::new(after).monospace());
                });
            }
        }
    }
}

pub fn show_error(ui: &mut egui::Ui, error: Option<&str>) {
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        ui.add_space(6.0);
        ui::error_text(ui, error);
    }
}
