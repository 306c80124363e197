use eframe::egui;

use rusty_dapp_signing_core::ScamPhishingAlert;

use crate::ui;

pub fn show(ui: &mut egui::Ui, alert: &ScamPhishingAlert) {
    let view = alert.view();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal_wrapped(|ui| {
            ui.label("🔒");
            ui.label("Scam/Phishing verification:");
            ui.label(egui::RichText::new("https://").strong().color(ui::ACCENT));
            ui.label(egui::RichText::new(&view.verification_url).monospace());
        });
    });

    if let Some(panel) = view.confirmation {
        ui.add_space(6.0);
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label("Please confirm that you are indeed connecting to");
                ui.label(egui::RichText::new("https://").strong().color(ui::ACCENT));
                ui.label(egui::RichText::new(&panel.authorized_url).monospace());
                ui.label("for");
                ui.label(egui::RichText::new(&panel.duration).strong());
                ui.label("and that you trust this site.");
            });
            ui.label("You might be sharing sensitive data.");
            ui.hyperlink_to("Learn more", panel.help_link);
        });
    }
}
